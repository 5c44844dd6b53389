//! Persistence layer: a generic soft-delete-aware repository plus a unit of
//! work that owns one repository per entity and a single commit point.
//!
//! Repositories stage writes in memory; nothing reaches the database until
//! [`UnitOfWork::save_changes`] flushes them. Reads always exclude
//! soft-deleted rows.

mod entities;
mod unit_of_work;

pub use unit_of_work::UnitOfWork;

use chrono::Utc;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Sqlite, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::domain::Audit;

/// A persistable entity: one table, a uuid primary key, and the shared audit
/// columns. `insert_query`/`update_query` carry the per-table SQL; everything
/// else the repository derives from `TABLE`.
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Clone + Send + Sync + Unpin + 'static {
    const TABLE: &'static str;

    fn id(&self) -> Uuid;
    fn audit(&self) -> &Audit;
    fn audit_mut(&mut self) -> &mut Audit;
    fn insert_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>>;
    fn update_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>>;
}

/// A staged write, applied at commit time in staging order.
pub(crate) enum Op<T> {
    Insert(T),
    Update(T),
    SoftDelete(Uuid),
    HardDelete(Uuid),
}

/// Per-entity repository handle. Reads go straight to the pool; writes are
/// staged until the owning unit of work commits.
pub struct Repository<T: Entity> {
    pool: SqlitePool,
    staged: Vec<Op<T>>,
}

impl<T: Entity> Repository<T> {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            staged: Vec::new(),
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<T>, sqlx::Error> {
        let sql = format!("SELECT * FROM {} WHERE id = ?1 AND is_deleted = 0", T::TABLE);
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn all(&self) -> Result<Vec<T>, sqlx::Error> {
        let sql = format!("SELECT * FROM {} WHERE is_deleted = 0", T::TABLE);
        sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await
    }

    /// Filter the non-deleted rows with an in-memory predicate.
    pub async fn find<F>(&self, predicate: F) -> Result<Vec<T>, sqlx::Error>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.all().await?.into_iter().filter(|e| predicate(e)).collect())
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let sql = format!(
            "SELECT COUNT(1) FROM {} WHERE id = ?1 AND is_deleted = 0",
            T::TABLE
        );
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub fn add(&mut self, entity: T) {
        self.staged.push(Op::Insert(entity));
    }

    pub fn add_range(&mut self, entities: impl IntoIterator<Item = T>) {
        for entity in entities {
            self.add(entity);
        }
    }

    pub fn update(&mut self, mut entity: T) {
        entity.audit_mut().touch();
        self.staged.push(Op::Update(entity));
    }

    /// Hard delete; only cart rows and similar throwaway data use this.
    pub fn remove(&mut self, id: Uuid) {
        self.staged.push(Op::HardDelete(id));
    }

    pub fn remove_range(&mut self, ids: impl IntoIterator<Item = Uuid>) {
        for id in ids {
            self.remove(id);
        }
    }

    /// Flag-flip delete. Idempotent: a missing or already-deleted row makes
    /// this a silent no-op at flush time.
    pub fn soft_delete(&mut self, id: Uuid) {
        self.staged.push(Op::SoftDelete(id));
    }

    pub(crate) fn take_staged(&mut self) -> Vec<Op<T>> {
        std::mem::take(&mut self.staged)
    }
}

/// Run staged operations on a connection, returning affected row count.
pub(crate) async fn apply<T: Entity>(
    ops: Vec<Op<T>>,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let mut affected = 0;
    for op in ops {
        affected += match op {
            Op::Insert(entity) => entity.insert_query().execute(&mut *conn).await?.rows_affected(),
            Op::Update(entity) => entity.update_query().execute(&mut *conn).await?.rows_affected(),
            Op::SoftDelete(id) => {
                let sql = format!(
                    "UPDATE {} SET is_deleted = 1, is_active = 0, deleted_at = ?1, updated_at = ?1 \
                     WHERE id = ?2 AND is_deleted = 0",
                    T::TABLE
                );
                sqlx::query(&sql)
                    .bind(Utc::now())
                    .bind(id)
                    .execute(&mut *conn)
                    .await?
                    .rows_affected()
            }
            Op::HardDelete(id) => {
                let sql = format!("DELETE FROM {} WHERE id = ?1", T::TABLE);
                sqlx::query(&sql)
                    .bind(id)
                    .execute(&mut *conn)
                    .await?
                    .rows_affected()
            }
        };
    }
    Ok(affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Product;
    use crate::test_utils::{setup_test_db, test_product};

    #[tokio::test]
    async fn soft_delete_excludes_from_all_reads() {
        let pool = setup_test_db().await;
        let mut uow = UnitOfWork::new(pool);
        let product = test_product("Widget", 1000);
        let id = product.id;
        uow.products.add(product);
        uow.save_changes().await.unwrap();

        assert!(uow.products.exists(id).await.unwrap());

        uow.products.soft_delete(id);
        uow.save_changes().await.unwrap();

        assert!(uow.products.get(id).await.unwrap().is_none());
        assert!(uow.products.all().await.unwrap().is_empty());
        assert!(uow
            .products
            .find(|p: &Product| p.id == id)
            .await
            .unwrap()
            .is_empty());
        assert!(!uow.products.exists(id).await.unwrap());
    }

    #[tokio::test]
    async fn soft_delete_is_idempotent() {
        let pool = setup_test_db().await;
        let mut uow = UnitOfWork::new(pool);
        let product = test_product("Widget", 1000);
        let id = product.id;
        uow.products.add(product);
        uow.save_changes().await.unwrap();

        uow.products.soft_delete(id);
        assert_eq!(uow.save_changes().await.unwrap(), 1);

        // Second delete and a delete of an unknown id both no-op silently.
        uow.products.soft_delete(id);
        uow.products.soft_delete(Uuid::now_v7());
        assert_eq!(uow.save_changes().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn writes_stay_unpersisted_until_save() {
        let pool = setup_test_db().await;
        let mut uow = UnitOfWork::new(pool);
        let product = test_product("Widget", 1000);
        let id = product.id;
        uow.products.add(product);

        assert!(uow.products.get(id).await.unwrap().is_none());

        assert_eq!(uow.save_changes().await.unwrap(), 1);
        assert!(uow.products.get(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_persists_changes_and_touches_audit() {
        let pool = setup_test_db().await;
        let mut uow = UnitOfWork::new(pool);
        let product = test_product("Widget", 1000);
        let id = product.id;
        let created_at = product.audit.created_at;
        uow.products.add(product);
        uow.save_changes().await.unwrap();

        let mut loaded = uow.products.get(id).await.unwrap().unwrap();
        loaded.price = 1250;
        uow.products.update(loaded);
        uow.save_changes().await.unwrap();

        let reloaded = uow.products.get(id).await.unwrap().unwrap();
        assert_eq!(reloaded.price, 1250);
        assert_eq!(reloaded.audit.created_at, created_at);
        assert!(reloaded.audit.updated_at >= created_at);
    }

    #[tokio::test]
    async fn hard_delete_removes_row() {
        let pool = setup_test_db().await;
        let mut uow = UnitOfWork::new(pool);
        let item = crate::domain::CartItem::new(Uuid::now_v7(), Uuid::now_v7(), 2);
        let id = item.id;
        uow.cart_items.add(item);
        uow.save_changes().await.unwrap();

        uow.cart_items.remove(id);
        assert_eq!(uow.save_changes().await.unwrap(), 1);
        assert!(uow.cart_items.get(id).await.unwrap().is_none());
    }
}
