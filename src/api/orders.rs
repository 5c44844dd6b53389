//! Order endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::{publish_event, require_user, AppState, Collection};
use crate::domain::{Order, OrderDetail, OrderEvent, OrderStatus, PaymentMethod, PaymentStatus};
use crate::error::Result;
use crate::services::{Caller, NewOrder, OrderLine, OrderService, PlacedOrder};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct PlaceOrderRequest {
    pub shipping_address_id: Uuid,
    pub billing_address_id: Option<Uuid>,
    pub payment_method: Option<PaymentMethod>,
    #[validate(range(min = 0))]
    pub shipping_cost: i64,
    #[validate(range(min = 0))]
    pub tax_amount: i64,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "at least one line item is required"))]
    pub items: Vec<OrderLineRequest>,
}

// Serialize is required so validator can echo the offending items back in
// the error params.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: Order,
    pub details: Vec<OrderDetail>,
}

impl From<PlacedOrder> for OrderResponse {
    fn from(placed: PlacedOrder) -> Self {
        Self {
            order: placed.order,
            details: placed.details,
        }
    }
}

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>)> {
    let user_id = require_user(caller)?;
    request.validate()?;

    let mut service = OrderService::new(state.uow());
    let placed = service
        .place_order(NewOrder {
            user_id,
            shipping_address_id: request.shipping_address_id,
            billing_address_id: request.billing_address_id,
            payment_method: request.payment_method,
            shipping_cost: request.shipping_cost,
            tax_amount: request.tax_amount,
            notes: request.notes,
            lines: request
                .items
                .iter()
                .map(|item| OrderLine {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect(),
        })
        .await?;

    publish_event(
        &state,
        &OrderEvent::Created {
            order_id: placed.order.id,
            order_number: placed.order.order_number.clone(),
            user_id: placed.order.user_id,
            total_amount: placed.order.total_amount,
            currency: placed.order.currency.clone(),
        },
    )
    .await;

    Ok((StatusCode::CREATED, Json(placed.into())))
}

pub async fn get_one(
    State(state): State<AppState>,
    caller: Caller,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>> {
    let mut service = OrderService::new(state.uow());
    let placed = service.get_order(caller, order_id).await?;
    Ok(Json(placed.into()))
}

pub async fn list_for_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Collection<Order>>> {
    let mut service = OrderService::new(state.uow());
    let orders = service.orders_for_user(caller, user_id).await?;
    Ok(Json(Collection::new(orders)))
}

pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Collection<Order>>> {
    let mut service = OrderService::new(state.uow());
    let orders = service.all_orders(caller).await?;
    Ok(Json(Collection::new(orders)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusRequest {
    pub status: OrderStatus,
}

pub async fn set_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(order_id): Path<Uuid>,
    Json(request): Json<StatusRequest>,
) -> Result<StatusCode> {
    let mut service = OrderService::new(state.uow());
    let order = service.set_status(caller, order_id, request.status).await?;
    publish_event(
        &state,
        &OrderEvent::StatusChanged {
            order_id: order.id,
            status: order.status,
        },
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentStatusRequest {
    pub payment_status: PaymentStatus,
}

/// Conditionally anonymous: the provider's callback arrives without a user
/// session and may only set Paid; the service enforces the rule.
pub async fn set_payment_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(order_id): Path<Uuid>,
    Json(request): Json<PaymentStatusRequest>,
) -> Result<StatusCode> {
    let mut service = OrderService::new(state.uow());
    let order = service
        .set_payment_status(caller, order_id, request.payment_status)
        .await?;
    publish_event(
        &state,
        &OrderEvent::PaymentStatusChanged {
            order_id: order.id,
            payment_status: order.payment_status,
        },
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}
