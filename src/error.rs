//! Service error taxonomy and its HTTP mapping.
//!
//! Validation and not-found failures are recovered at the service boundary
//! and surfaced as structured responses; database faults propagate as
//! generic server errors and are logged. Nothing here retries automatically.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(String),

    /// Order placement aborts naming the line item that failed to resolve.
    #[error("product {0} not found")]
    MissingProduct(Uuid),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("caller is not allowed to perform this operation")]
    Forbidden,

    /// The generated order number hit the unique index. Retryable with a
    /// fresh number; the service does not retry on its own.
    #[error("order number already in use, retry the order")]
    OrderNumberCollision,

    #[error("payment provider error: {0}")]
    PaymentProvider(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Error {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) | Self::MissingProduct(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::OrderNumberCollision => StatusCode::CONFLICT,
            Self::PaymentProvider(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(serde_json::json!({ "Error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_product_names_the_product() {
        let id = Uuid::now_v7();
        let message = Error::MissingProduct(id).to_string();
        assert!(message.contains(&id.to_string()));
    }
}
