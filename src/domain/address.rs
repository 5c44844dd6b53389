//! Customer address entity.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::audit::Audit;

/// Free-form shipping/billing address. At most one address per user carries
/// the default flag; setting a new default clears the others through a
/// service-level loop (last write wins).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub district: Option<String>,
    pub postal_code: String,
    pub country: String,
    pub address_type: Option<String>,
    pub is_default: bool,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}
