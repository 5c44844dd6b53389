//! Shopping cart entity.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::audit::Audit;

/// One cart row per (user, product) pair; adding the same product again
/// merges into the existing row instead of inserting a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}

impl CartItem {
    pub fn new(user_id: Uuid, product_id: Uuid, quantity: i32) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            product_id,
            quantity,
            audit: Audit::new(),
        }
    }
}
