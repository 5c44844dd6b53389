//! Hosted checkout endpoints: session creation and the success redirect.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::{publish_event, AppState};
use crate::domain::{OrderEvent, PaymentStatus};
use crate::error::Result;
use crate::services::{Caller, CheckoutService, OrderService, ReconciliationOutcome};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct CheckoutRequest {
    pub order_id: Uuid,
    #[validate(email)]
    pub customer_email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    pub redirect_url: String,
}

pub async fn create_session(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    request.validate()?;
    let mut service = CheckoutService::new(OrderService::new(state.uow()), state.payments.clone());
    let session = service
        .create_session(caller, request.order_id, request.customer_email.as_deref())
        .await?;
    Ok(Json(CheckoutResponse {
        session_id: session.session_id,
        redirect_url: session.redirect_url,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SuccessParams {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SuccessResponse {
    pub status: &'static str,
}

/// The provider redirects the customer here after the hosted page. The
/// payment already happened from their perspective, so even a failed local
/// update answers success; the gap is logged for manual resolution.
pub async fn success(
    State(state): State<AppState>,
    Query(params): Query<SuccessParams>,
) -> Result<Json<SuccessResponse>> {
    let mut service = CheckoutService::new(OrderService::new(state.uow()), state.payments.clone());
    let outcome = service.confirm(&params.session_id).await?;

    if outcome == ReconciliationOutcome::Paid {
        if let Ok(session) = state.payments.get_session(&params.session_id).await {
            if let Some(order_id) = session
                .metadata
                .get(crate::services::payments::ORDER_ID_METADATA_KEY)
                .and_then(|raw| Uuid::parse_str(raw).ok())
            {
                publish_event(
                    &state,
                    &OrderEvent::PaymentStatusChanged {
                        order_id,
                        payment_status: PaymentStatus::Paid,
                    },
                )
                .await;
            }
        }
    }

    Ok(Json(SuccessResponse {
        status: match outcome {
            ReconciliationOutcome::Paid => "Paid",
            ReconciliationOutcome::AwaitingPayment => "AwaitingPayment",
            ReconciliationOutcome::Gap => "PendingReconciliation",
        },
    }))
}
