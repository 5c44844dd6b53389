//! Product catalog entities.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::audit::Audit;

/// Catalog product. Prices are minor units (cents) in `currency`.
/// Products are only ever soft-deleted so historical orders keep a valid
/// product reference.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub discount_price: Option<i64>,
    pub currency: String,
    pub stock_quantity: i32,
    pub in_stock: bool,
    pub category_id: Option<Uuid>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}

impl Product {
    /// Price a buyer pays right now: the discount price when one is set,
    /// the list price otherwise.
    pub fn effective_price(&self) -> i64 {
        self.discount_price.unwrap_or(self.price)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}

impl Category {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        let name = name.into();
        let slug = name.to_lowercase().replace(' ', "-");
        Self {
            id: Uuid::now_v7(),
            name,
            slug,
            description,
            audit: Audit::new(),
        }
    }
}
