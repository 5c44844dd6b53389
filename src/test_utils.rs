//! Shared helpers for the unit tests.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::{Address, Audit, Product};
use crate::store::UnitOfWork;

pub(crate) async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePool::connect(":memory:").await.unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();
    pool
}

pub(crate) fn test_product(name: &str, price: i64) -> Product {
    Product {
        id: Uuid::now_v7(),
        name: name.into(),
        description: None,
        price,
        discount_price: None,
        currency: "USD".into(),
        stock_quantity: 10,
        in_stock: true,
        category_id: None,
        audit: Audit::new(),
    }
}

pub(crate) async fn seed_product(pool: &SqlitePool, name: &str, price: i64) -> Product {
    let product = test_product(name, price);
    let mut uow = UnitOfWork::new(pool.clone());
    uow.products.add(product.clone());
    uow.save_changes().await.unwrap();
    product
}

pub(crate) async fn seed_address(pool: &SqlitePool, user_id: Uuid) -> Address {
    let address = Address {
        id: Uuid::now_v7(),
        user_id,
        title: "Home".into(),
        line1: "1 Main St".into(),
        line2: None,
        city: "Springfield".into(),
        district: None,
        postal_code: "12345".into(),
        country: "US".into(),
        address_type: None,
        is_default: true,
        audit: Audit::new(),
    };
    let mut uow = UnitOfWork::new(pool.clone());
    uow.addresses.add(address.clone());
    uow.save_changes().await.unwrap();
    address
}
