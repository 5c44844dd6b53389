//! HTTP surface: axum router, shared state, and caller extraction.

mod addresses;
mod carts;
mod checkout;
mod orders;
mod products;

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::services::{Caller, PaymentProvider};
use crate::store::UnitOfWork;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub payments: Arc<dyn PaymentProvider>,
    pub nats: Option<async_nats::Client>,
    pub config: Config,
}

impl AppState {
    pub(crate) fn uow(&self) -> UnitOfWork {
        UnitOfWork::new(self.db.clone())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/:id",
            get(products::get_one)
                .put(products::update)
                .delete(products::remove),
        )
        .route(
            "/api/categories",
            get(products::list_categories).post(products::create_category),
        )
        .route("/api/categories/:id", get(products::get_category))
        .route("/api/orders", get(orders::list).post(orders::create))
        .route("/api/orders/:id", get(orders::get_one))
        .route("/api/orders/user/:user_id", get(orders::list_for_user))
        .route("/api/orders/:id/status", put(orders::set_status))
        .route(
            "/api/orders/:id/payment-status",
            put(orders::set_payment_status),
        )
        .route("/api/checkout", post(checkout::create_session))
        .route("/api/checkout/success", get(checkout::success))
        .route("/api/cart", get(carts::list).delete(carts::clear))
        .route("/api/cart/items", post(carts::add_item))
        .route(
            "/api/cart/items/:id",
            put(carts::update_item).delete(carts::remove_item),
        )
        .route(
            "/api/addresses",
            get(addresses::list).post(addresses::create),
        )
        .route(
            "/api/addresses/:id",
            get(addresses::get_one)
                .put(addresses::update)
                .delete(addresses::remove),
        )
        .route("/api/addresses/:id/default", put(addresses::set_default))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy", "service": "storefront"}))
}

/// Identity headers are stamped by the auth gateway; the service trusts them
/// and never sees the underlying token.
#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let Some(raw) = parts.headers.get("x-user-id") else {
            return Ok(Caller::Anonymous);
        };
        let user_id = raw
            .to_str()
            .ok()
            .and_then(|value| Uuid::parse_str(value).ok())
            .ok_or_else(|| Error::Validation("invalid x-user-id header".into()))?;
        let is_admin = parts
            .headers
            .get("x-user-role")
            .and_then(|value| value.to_str().ok())
            .map(|role| role.eq_ignore_ascii_case("admin"))
            .unwrap_or(false);
        Ok(if is_admin {
            Caller::Admin(user_id)
        } else {
            Caller::User(user_id)
        })
    }
}

pub(crate) fn require_user(caller: Caller) -> Result<Uuid> {
    caller.user_id().ok_or(Error::Forbidden)
}

pub(crate) fn require_admin(caller: Caller) -> Result<()> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(Error::Forbidden)
    }
}

/// Best-effort event publication; the request never fails on broker trouble.
pub(crate) async fn publish_event(state: &AppState, event: &crate::domain::OrderEvent) {
    let Some(client) = &state.nats else { return };
    match serde_json::to_vec(event) {
        Ok(payload) => {
            if let Err(err) = client.publish(event.subject().to_string(), payload.into()).await {
                tracing::warn!(error = %err, subject = event.subject(), "failed to publish event");
            }
        }
        Err(err) => tracing::warn!(error = %err, "failed to serialize event"),
    }
}

/// Wraps a serializable payload so every list endpoint shares one shape.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Collection<T: Serialize> {
    pub data: Vec<T>,
    pub total: usize,
}

impl<T: Serialize> Collection<T> {
    pub(crate) fn new(data: Vec<T>) -> Self {
        let total = data.len();
        Self { data, total }
    }
}
