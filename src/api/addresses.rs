//! Address book endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::{require_user, AppState, Collection};
use crate::domain::Address;
use crate::error::Result;
use crate::services::addresses::AddressInput;
use crate::services::{AddressService, Caller};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct AddressRequest {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub line1: String,
    pub line2: Option<String>,
    #[validate(length(min = 1))]
    pub city: String,
    pub district: Option<String>,
    #[validate(length(min = 1))]
    pub postal_code: String,
    #[validate(length(min = 1))]
    pub country: String,
    pub address_type: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

impl From<AddressRequest> for AddressInput {
    fn from(request: AddressRequest) -> Self {
        Self {
            title: request.title,
            line1: request.line1,
            line2: request.line2,
            city: request.city,
            district: request.district,
            postal_code: request.postal_code,
            country: request.country,
            address_type: request.address_type,
            is_default: request.is_default,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Collection<Address>>> {
    let user_id = require_user(caller)?;
    let mut service = AddressService::new(state.uow());
    Ok(Json(Collection::new(service.list(user_id).await?)))
}

pub async fn get_one(
    State(state): State<AppState>,
    caller: Caller,
    Path(address_id): Path<Uuid>,
) -> Result<Json<Address>> {
    let user_id = require_user(caller)?;
    let mut service = AddressService::new(state.uow());
    Ok(Json(service.get(user_id, address_id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<AddressRequest>,
) -> Result<(StatusCode, Json<Address>)> {
    let user_id = require_user(caller)?;
    request.validate()?;
    let mut service = AddressService::new(state.uow());
    let address = service.create(user_id, request.into()).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path(address_id): Path<Uuid>,
    Json(request): Json<AddressRequest>,
) -> Result<Json<Address>> {
    let user_id = require_user(caller)?;
    request.validate()?;
    let mut service = AddressService::new(state.uow());
    let address = service.update(user_id, address_id, request.into()).await?;
    Ok(Json(address))
}

pub async fn set_default(
    State(state): State<AppState>,
    caller: Caller,
    Path(address_id): Path<Uuid>,
) -> Result<Json<Address>> {
    let user_id = require_user(caller)?;
    let mut service = AddressService::new(state.uow());
    let address = service.set_default(user_id, address_id).await?;
    Ok(Json(address))
}

pub async fn remove(
    State(state): State<AppState>,
    caller: Caller,
    Path(address_id): Path<Uuid>,
) -> Result<StatusCode> {
    let user_id = require_user(caller)?;
    let mut service = AddressService::new(state.uow());
    service.delete(user_id, address_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
