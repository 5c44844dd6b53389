//! Cart endpoints; every route acts on the authenticated user's own cart.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::{require_user, AppState, Collection};
use crate::domain::CartItem;
use crate::error::Result;
use crate::services::{Caller, CartService};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Collection<CartItem>>> {
    let user_id = require_user(caller)?;
    let mut service = CartService::new(state.uow());
    Ok(Json(Collection::new(service.items(user_id).await?)))
}

pub async fn add_item(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartItem>)> {
    let user_id = require_user(caller)?;
    request.validate()?;
    let mut service = CartService::new(state.uow());
    let item = service
        .add_item(user_id, request.product_id, request.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_item(
    State(state): State<AppState>,
    caller: Caller,
    Path(item_id): Path<Uuid>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<Option<CartItem>>> {
    let user_id = require_user(caller)?;
    let mut service = CartService::new(state.uow());
    let item = service
        .update_quantity(user_id, item_id, request.quantity)
        .await?;
    Ok(Json(item))
}

pub async fn remove_item(
    State(state): State<AppState>,
    caller: Caller,
    Path(item_id): Path<Uuid>,
) -> Result<StatusCode> {
    let user_id = require_user(caller)?;
    let mut service = CartService::new(state.uow());
    service.remove_item(user_id, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear(State(state): State<AppState>, caller: Caller) -> Result<StatusCode> {
    let user_id = require_user(caller)?;
    let mut service = CartService::new(state.uow());
    service.clear(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
