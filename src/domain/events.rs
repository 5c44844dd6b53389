//! Integration events published to NATS when a broker is configured.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::order::{OrderStatus, PaymentStatus};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase", tag = "Type")]
pub enum OrderEvent {
    Created {
        order_id: Uuid,
        order_number: String,
        user_id: Uuid,
        total_amount: i64,
        currency: String,
    },
    StatusChanged {
        order_id: Uuid,
        status: OrderStatus,
    },
    PaymentStatusChanged {
        order_id: Uuid,
        payment_status: PaymentStatus,
    },
}

impl OrderEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Created { .. } => "storefront.order.created",
            Self::StatusChanged { .. } => "storefront.order.status",
            Self::PaymentStatusChanged { .. } => "storefront.order.payment",
        }
    }
}
