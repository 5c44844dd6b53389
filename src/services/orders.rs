//! Order placement and payment-status transitions.
//!
//! Placement snapshots product names and prices into the line items, totals
//! them without consulting stock, and persists the order row before its line
//! items inside one explicit transaction: the detail rows carry a foreign key
//! to the order, so the order insert must execute first, and the wrapping
//! transaction guarantees no order is ever left without its lines.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Audit, Order, OrderDetail, OrderStatus, PaymentMethod, PaymentStatus};
use crate::error::{Error, Result};
use crate::services::Caller;
use crate::store::UnitOfWork;

/// One requested line: which product, how many.
#[derive(Debug, Clone, Copy)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Checkout input for [`OrderService::place_order`].
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub shipping_address_id: Uuid,
    pub billing_address_id: Option<Uuid>,
    pub payment_method: Option<PaymentMethod>,
    pub shipping_cost: i64,
    pub tax_amount: i64,
    pub notes: Option<String>,
    pub lines: Vec<OrderLine>,
}

/// A persisted order together with its line items.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub details: Vec<OrderDetail>,
}

pub struct OrderService {
    uow: UnitOfWork,
}

impl OrderService {
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }

    /// Place an order. Any missing product aborts the whole request before a
    /// single write happens; the error names the offending product.
    pub async fn place_order(&mut self, new_order: NewOrder) -> Result<PlacedOrder> {
        if new_order.lines.is_empty() {
            return Err(Error::Validation(
                "order must contain at least one line item".into(),
            ));
        }
        if new_order.lines.iter().any(|line| line.quantity < 1) {
            return Err(Error::Validation(
                "line item quantity must be at least 1".into(),
            ));
        }
        if new_order.shipping_cost < 0 || new_order.tax_amount < 0 {
            return Err(Error::Validation(
                "shipping cost and tax amount must not be negative".into(),
            ));
        }

        let shipping = self
            .uow
            .addresses
            .get(new_order.shipping_address_id)
            .await?
            .ok_or_else(|| Error::not_found("address", new_order.shipping_address_id))?;
        if shipping.user_id != new_order.user_id {
            return Err(Error::Forbidden);
        }
        if let Some(billing_id) = new_order.billing_address_id {
            let billing = self
                .uow
                .addresses
                .get(billing_id)
                .await?
                .ok_or_else(|| Error::not_found("address", billing_id))?;
            if billing.user_id != new_order.user_id {
                return Err(Error::Forbidden);
            }
        }

        // Resolve every product up front. Totals are computed from the
        // snapshots, never re-derived later; stock is neither checked nor
        // decremented here.
        let mut resolved = Vec::with_capacity(new_order.lines.len());
        for line in &new_order.lines {
            let product = self
                .uow
                .products
                .get(line.product_id)
                .await?
                .ok_or(Error::MissingProduct(line.product_id))?;
            resolved.push((product, line.quantity));
        }

        // Subtotals are summed as plain minor units, so every line must be
        // priced in the same currency as the order it lands on.
        let currency = resolved[0].0.currency.clone();
        if let Some((odd, _)) = resolved
            .iter()
            .find(|(product, _)| product.currency != currency)
        {
            return Err(Error::Validation(format!(
                "product {} is priced in {}, the other line items in {}",
                odd.id, odd.currency, currency
            )));
        }

        let order_id = Uuid::now_v7();
        let order_date = Utc::now();
        let details: Vec<OrderDetail> = resolved
            .iter()
            .map(|(product, quantity)| OrderDetail::snapshot(order_id, product, *quantity))
            .collect();
        debug_assert!(details.iter().all(OrderDetail::is_consistent));
        let items_total: i64 = details.iter().map(|detail| detail.subtotal).sum();

        let order = Order {
            id: order_id,
            order_number: Order::generate_number(order_date),
            order_date,
            user_id: new_order.user_id,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            payment_method: new_order.payment_method,
            total_amount: items_total + new_order.shipping_cost + new_order.tax_amount,
            shipping_cost: new_order.shipping_cost,
            tax_amount: new_order.tax_amount,
            currency,
            shipping_address_id: new_order.shipping_address_id,
            billing_address_id: new_order.billing_address_id,
            notes: new_order.notes,
            audit: Audit::new(),
        };

        // Order row first so the detail foreign keys resolve, then the lines,
        // all inside one transaction.
        self.uow.begin_transaction().await?;
        self.uow.orders.add(order.clone());
        if let Err(err) = self.uow.save_changes().await {
            self.uow.rollback_transaction().await?;
            return Err(map_order_insert_error(err));
        }
        self.uow.order_details.add_range(details.iter().cloned());
        if let Err(err) = self.uow.save_changes().await {
            self.uow.rollback_transaction().await?;
            return Err(err.into());
        }
        self.uow.commit_transaction().await?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total_amount = order.total_amount,
            lines = details.len(),
            "order placed"
        );
        Ok(PlacedOrder { order, details })
    }

    /// Transition an order's payment status. Authenticated callers must own
    /// the order or be admin; an unauthenticated caller (the payment
    /// provider's redirect callback) may only mark it Paid.
    pub async fn set_payment_status(
        &mut self,
        caller: Caller,
        order_id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<Order> {
        let mut order = self
            .uow
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| Error::not_found("order", order_id))?;

        match caller {
            Caller::Anonymous => {
                if payment_status != PaymentStatus::Paid {
                    return Err(Error::Forbidden);
                }
            }
            Caller::User(user_id) => {
                if user_id != order.user_id {
                    return Err(Error::Forbidden);
                }
            }
            Caller::Admin(_) => {}
        }

        order.payment_status = payment_status;
        self.uow.orders.update(order.clone());
        self.uow.save_changes().await?;
        Ok(order)
    }

    /// Admin-only order status transition (Processing, Shipped, ...).
    pub async fn set_status(
        &mut self,
        caller: Caller,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Order> {
        if !caller.is_admin() {
            return Err(Error::Forbidden);
        }
        let mut order = self
            .uow
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| Error::not_found("order", order_id))?;
        order.status = status;
        self.uow.orders.update(order.clone());
        self.uow.save_changes().await?;
        Ok(order)
    }

    pub async fn get_order(&mut self, caller: Caller, order_id: Uuid) -> Result<PlacedOrder> {
        let order = self
            .uow
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| Error::not_found("order", order_id))?;
        if !caller.can_act_for(order.user_id) {
            return Err(Error::Forbidden);
        }
        let details = self
            .uow
            .order_details
            .find(|detail| detail.order_id == order_id)
            .await?;
        Ok(PlacedOrder { order, details })
    }

    pub async fn orders_for_user(&mut self, caller: Caller, user_id: Uuid) -> Result<Vec<Order>> {
        if !caller.can_act_for(user_id) {
            return Err(Error::Forbidden);
        }
        self.uow
            .orders
            .find(|order| order.user_id == user_id)
            .await
            .map_err(Into::into)
    }

    pub async fn all_orders(&mut self, caller: Caller) -> Result<Vec<Order>> {
        if !caller.is_admin() {
            return Err(Error::Forbidden);
        }
        self.uow.orders.all().await.map_err(Into::into)
    }
}

fn map_order_insert_error(err: sqlx::Error) -> Error {
    match &err {
        sqlx::Error::Database(db)
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            Error::OrderNumberCollision
        }
        _ => err.into(),
    }
}
