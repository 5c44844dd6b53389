//! Product and category endpoints. Reads are public; writes are admin-only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::{require_admin, AppState, Collection};
use crate::domain::{Category, Product};
use crate::error::Result;
use crate::services::{Caller, ProductService};
use crate::services::products::ProductInput;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct ProductRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub price: i64,
    pub discount_price: Option<i64>,
    pub currency: Option<String>,
    #[validate(range(min = 0))]
    pub stock_quantity: i32,
    pub category_id: Option<Uuid>,
}

impl ProductRequest {
    fn into_input(self, default_currency: &str) -> ProductInput {
        ProductInput {
            name: self.name,
            description: self.description,
            price: self.price,
            discount_price: self.discount_price,
            currency: self
                .currency
                .unwrap_or_else(|| default_currency.to_string()),
            stock_quantity: self.stock_quantity,
            category_id: self.category_id,
        }
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Collection<Product>>> {
    let mut service = ProductService::new(state.uow());
    Ok(Json(Collection::new(service.list().await?)))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<Product>> {
    let mut service = ProductService::new(state.uow());
    Ok(Json(service.get(product_id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    require_admin(caller)?;
    request.validate()?;
    let mut service = ProductService::new(state.uow());
    let product = service
        .create(request.into_input(&state.config.default_currency))
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path(product_id): Path<Uuid>,
    Json(request): Json<ProductRequest>,
) -> Result<Json<Product>> {
    require_admin(caller)?;
    request.validate()?;
    let mut service = ProductService::new(state.uow());
    let product = service
        .update(product_id, request.into_input(&state.config.default_currency))
        .await?;
    Ok(Json(product))
}

pub async fn remove(
    State(state): State<AppState>,
    caller: Caller,
    Path(product_id): Path<Uuid>,
) -> Result<StatusCode> {
    require_admin(caller)?;
    let mut service = ProductService::new(state.uow());
    service.delete(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct CategoryRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Collection<Category>>> {
    let mut service = ProductService::new(state.uow());
    Ok(Json(Collection::new(service.list_categories().await?)))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<Category>> {
    let mut service = ProductService::new(state.uow());
    Ok(Json(service.get_category(category_id).await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    require_admin(caller)?;
    request.validate()?;
    let mut service = ProductService::new(state.uow());
    let category = service
        .create_category(request.name, request.description)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}
