//! Business services. One service per entity family; each owns a
//! request-scoped [`crate::store::UnitOfWork`] and enforces the invariants
//! the repositories do not.

pub mod addresses;
pub mod carts;
pub mod orders;
pub mod payments;
pub mod products;

pub use addresses::AddressService;
pub use carts::CartService;
pub use orders::{NewOrder, OrderLine, OrderService, PlacedOrder};
pub use payments::{
    CheckoutService, MockPaymentProvider, PaymentProvider, ReconciliationOutcome,
};
pub use products::ProductService;

use uuid::Uuid;

/// Caller identity as established by the auth gateway in front of this
/// service. Token verification itself happens upstream; we only consume the
/// resolved identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    User(Uuid),
    Admin(Uuid),
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin(_))
    }

    /// Owner-or-admin check used by every per-user resource.
    pub fn can_act_for(&self, user_id: Uuid) -> bool {
        match self {
            Self::Admin(_) => true,
            Self::User(id) => *id == user_id,
            Self::Anonymous => false,
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Self::User(id) | Self::Admin(id) => Some(*id),
            Self::Anonymous => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::UnitOfWork;

    #[test]
    fn admin_acts_for_anyone() {
        let user = Uuid::now_v7();
        assert!(Caller::Admin(Uuid::now_v7()).can_act_for(user));
        assert!(Caller::User(user).can_act_for(user));
        assert!(!Caller::User(Uuid::now_v7()).can_act_for(user));
        assert!(!Caller::Anonymous.can_act_for(user));
    }

    // Handler futures hold a service across awaits, so every service method
    // future must be Send even though the unit of work is not Sync.
    #[tokio::test]
    async fn service_futures_are_send() {
        fn assert_send(_: impl Send) {}

        let pool = sqlx::SqlitePool::connect_lazy(":memory:").unwrap();
        let mut products = ProductService::new(UnitOfWork::new(pool.clone()));
        assert_send(async move { products.list().await });
        let mut orders = OrderService::new(UnitOfWork::new(pool.clone()));
        assert_send(async move { orders.get_order(Caller::Anonymous, Uuid::now_v7()).await });
        let mut carts = CartService::new(UnitOfWork::new(pool.clone()));
        assert_send(async move { carts.items(Uuid::now_v7()).await });
        let mut addresses = AddressService::new(UnitOfWork::new(pool));
        assert_send(async move { addresses.list(Uuid::now_v7()).await });
    }
}
