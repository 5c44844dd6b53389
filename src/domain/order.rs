//! Order and order line entities.
//!
//! Line items snapshot the product name and unit price at order time; they
//! deliberately never resynchronize with the live product, so historical
//! orders stay accurate when a product is repriced or retired.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::audit::Audit;
use crate::domain::product::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    Refunded,
    PartiallyRefunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum PaymentMethod {
    CreditCard,
    BankTransfer,
    CashOnDelivery,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub order_date: DateTime<Utc>,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub total_amount: i64,
    pub shipping_cost: i64,
    pub tax_amount: i64,
    pub currency: String,
    pub shipping_address_id: Uuid,
    pub billing_address_id: Option<Uuid>,
    pub notes: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}

impl Order {
    /// Human-facing order number: `ORD-{yyyyMMdd}-{8 uppercase hex}`.
    /// Uniqueness is enforced by the database index, not here; an insert
    /// collision surfaces as a retryable conflict.
    pub fn generate_number(date: DateTime<Utc>) -> String {
        format!("ORD-{}-{:08X}", date.format("%Y%m%d"), rand::random::<u32>())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct OrderDetail {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: i32,
    pub subtotal: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}

impl OrderDetail {
    /// Freeze the product's current name and effective price into a line.
    pub fn snapshot(order_id: Uuid, product: &Product, quantity: i32) -> Self {
        let unit_price = product.effective_price();
        Self {
            id: Uuid::now_v7(),
            order_id,
            product_id: product.id,
            product_name: product.name.clone(),
            unit_price,
            quantity,
            subtotal: unit_price * i64::from(quantity),
            audit: Audit::new(),
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.quantity >= 1 && self.subtotal == self.unit_price * i64::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn order_number_format() {
        let date = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let number = Order::generate_number(date);
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1], "20240309");
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn snapshot_multiplies_quantity() {
        let product = Product {
            id: Uuid::now_v7(),
            name: "Widget".into(),
            description: None,
            price: 1664,
            discount_price: None,
            currency: "USD".into(),
            stock_quantity: 10,
            in_stock: true,
            category_id: None,
            audit: Audit::new(),
        };
        let detail = OrderDetail::snapshot(Uuid::now_v7(), &product, 2);
        assert_eq!(detail.product_name, "Widget");
        assert_eq!(detail.unit_price, 1664);
        assert_eq!(detail.subtotal, 3328);
        assert!(detail.is_consistent());
    }

    #[test]
    fn status_enums_serialize_as_stable_strings() {
        assert_eq!(serde_json::to_string(&OrderStatus::Pending).unwrap(), "\"Pending\"");
        assert_eq!(serde_json::to_string(&PaymentStatus::Unpaid).unwrap(), "\"Unpaid\"");
        assert_eq!(
            serde_json::to_string(&PaymentStatus::PartiallyRefunded).unwrap(),
            "\"PartiallyRefunded\""
        );
    }
}
