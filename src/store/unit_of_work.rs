//! Unit of work: one repository per entity, one commit point, explicit
//! transaction control.

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::domain::{Address, CartItem, Category, Order, OrderDetail, Product};
use crate::store::{apply, Repository};

/// Aggregates the per-entity repositories over a shared pool. Scoped to a
/// single request; never shared across concurrent requests.
///
/// `save_changes` flushes every staged write. When an explicit transaction is
/// open the flush lands inside it, otherwise each flush runs in its own
/// short-lived transaction. `begin_transaction` is idempotent; commit and
/// rollback without an active transaction are no-ops. The caller pairs a
/// begin with exactly one of commit or rollback.
pub struct UnitOfWork {
    pool: SqlitePool,
    tx: Option<Transaction<'static, Sqlite>>,
    pub categories: Repository<Category>,
    pub products: Repository<Product>,
    pub addresses: Repository<Address>,
    pub orders: Repository<Order>,
    pub order_details: Repository<OrderDetail>,
    pub cart_items: Repository<CartItem>,
}

impl UnitOfWork {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            categories: Repository::new(pool.clone()),
            products: Repository::new(pool.clone()),
            addresses: Repository::new(pool.clone()),
            orders: Repository::new(pool.clone()),
            order_details: Repository::new(pool.clone()),
            cart_items: Repository::new(pool.clone()),
            pool,
            tx: None,
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.tx.is_some()
    }

    /// Open an explicit transaction. Calling again while one is active is a
    /// no-op; nested transactions are not supported.
    pub async fn begin_transaction(&mut self) -> Result<(), sqlx::Error> {
        if self.tx.is_none() {
            self.tx = Some(self.pool.begin().await?);
        }
        Ok(())
    }

    pub async fn commit_transaction(&mut self) -> Result<(), sqlx::Error> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
        }
        Ok(())
    }

    /// Abandon the active transaction and discard any writes still staged.
    pub async fn rollback_transaction(&mut self) -> Result<(), sqlx::Error> {
        self.discard_staged();
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
        }
        Ok(())
    }

    /// Flush all staged writes, in foreign-key-safe entity order, and return
    /// the affected row count.
    pub async fn save_changes(&mut self) -> Result<u64, sqlx::Error> {
        let categories = self.categories.take_staged();
        let products = self.products.take_staged();
        let addresses = self.addresses.take_staged();
        let orders = self.orders.take_staged();
        let order_details = self.order_details.take_staged();
        let cart_items = self.cart_items.take_staged();

        let mut affected = 0;
        match self.tx.as_deref_mut() {
            Some(conn) => {
                affected += apply(categories, &mut *conn).await?;
                affected += apply(products, &mut *conn).await?;
                affected += apply(addresses, &mut *conn).await?;
                affected += apply(orders, &mut *conn).await?;
                affected += apply(order_details, &mut *conn).await?;
                affected += apply(cart_items, &mut *conn).await?;
            }
            None => {
                let mut tx = self.pool.begin().await?;
                affected += apply(categories, &mut *tx).await?;
                affected += apply(products, &mut *tx).await?;
                affected += apply(addresses, &mut *tx).await?;
                affected += apply(orders, &mut *tx).await?;
                affected += apply(order_details, &mut *tx).await?;
                affected += apply(cart_items, &mut *tx).await?;
                tx.commit().await?;
            }
        }
        Ok(affected)
    }

    fn discard_staged(&mut self) {
        let _ = self.categories.take_staged();
        let _ = self.products.take_staged();
        let _ = self.addresses.take_staged();
        let _ = self.orders.take_staged();
        let _ = self.order_details.take_staged();
        let _ = self.cart_items.take_staged();
    }
}
