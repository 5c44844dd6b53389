//! Cart operations with merge-on-add semantics.
//!
//! The find-then-update merge is deliberately not wrapped in a transaction;
//! two concurrent adds for the same (user, product) pair can race, matching
//! the relational engine's default isolation and nothing more.

use uuid::Uuid;

use crate::domain::CartItem;
use crate::error::{Error, Result};
use crate::store::UnitOfWork;

pub struct CartService {
    uow: UnitOfWork,
}

impl CartService {
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }

    pub async fn items(&mut self, user_id: Uuid) -> Result<Vec<CartItem>> {
        self.uow
            .cart_items
            .find(|item| item.user_id == user_id)
            .await
            .map_err(Into::into)
    }

    /// Add a product to the cart. An existing non-deleted row for the same
    /// product absorbs the quantity instead of a duplicate row appearing.
    pub async fn add_item(
        &mut self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItem> {
        if quantity < 1 {
            return Err(Error::Validation("quantity must be at least 1".into()));
        }
        if !self.uow.products.exists(product_id).await? {
            return Err(Error::not_found("product", product_id));
        }

        let existing = self
            .uow
            .cart_items
            .find(|item| item.user_id == user_id && item.product_id == product_id)
            .await?
            .into_iter()
            .next();

        let item = match existing {
            Some(mut item) => {
                item.quantity = item.quantity.saturating_add(quantity);
                self.uow.cart_items.update(item.clone());
                item
            }
            None => {
                let item = CartItem::new(user_id, product_id, quantity);
                self.uow.cart_items.add(item.clone());
                item
            }
        };
        self.uow.save_changes().await?;
        Ok(item)
    }

    /// Set a row's quantity. Zero or below removes the row entirely rather
    /// than leaving a zero-quantity line.
    pub async fn update_quantity(
        &mut self,
        user_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<Option<CartItem>> {
        let mut item = self
            .uow
            .cart_items
            .get(item_id)
            .await?
            .ok_or_else(|| Error::not_found("cart item", item_id))?;
        if item.user_id != user_id {
            return Err(Error::Forbidden);
        }

        if quantity <= 0 {
            self.uow.cart_items.remove(item.id);
            self.uow.save_changes().await?;
            return Ok(None);
        }
        item.quantity = quantity;
        self.uow.cart_items.update(item.clone());
        self.uow.save_changes().await?;
        Ok(Some(item))
    }

    pub async fn remove_item(&mut self, user_id: Uuid, item_id: Uuid) -> Result<()> {
        let item = self
            .uow
            .cart_items
            .get(item_id)
            .await?
            .ok_or_else(|| Error::not_found("cart item", item_id))?;
        if item.user_id != user_id {
            return Err(Error::Forbidden);
        }
        self.uow.cart_items.remove(item.id);
        self.uow.save_changes().await?;
        Ok(())
    }

    /// Empty the cart, e.g. after a successful checkout.
    pub async fn clear(&mut self, user_id: Uuid) -> Result<u64> {
        let ids: Vec<Uuid> = self
            .uow
            .cart_items
            .find(|item| item.user_id == user_id)
            .await?
            .into_iter()
            .map(|item| item.id)
            .collect();
        self.uow.cart_items.remove_range(ids);
        self.uow.save_changes().await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::UnitOfWork;
    use crate::test_utils::{seed_product, setup_test_db};

    #[tokio::test]
    async fn adding_same_product_twice_merges_into_one_row() {
        let pool = setup_test_db().await;
        let user_id = Uuid::now_v7();
        let product = seed_product(&pool, "Widget", 1000).await;

        let mut svc = CartService::new(UnitOfWork::new(pool.clone()));
        svc.add_item(user_id, product.id, 2).await.unwrap();
        svc.add_item(user_id, product.id, 3).await.unwrap();

        let items = svc.items(user_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
    }

    #[tokio::test]
    async fn merge_saturates_instead_of_overflowing() {
        let pool = setup_test_db().await;
        let user_id = Uuid::now_v7();
        let product = seed_product(&pool, "Widget", 1000).await;

        let mut svc = CartService::new(UnitOfWork::new(pool.clone()));
        svc.add_item(user_id, product.id, i32::MAX - 1).await.unwrap();
        let item = svc.add_item(user_id, product.id, 5).await.unwrap();

        assert_eq!(item.quantity, i32::MAX);
    }

    #[tokio::test]
    async fn carts_are_scoped_per_user() {
        let pool = setup_test_db().await;
        let product = seed_product(&pool, "Widget", 1000).await;
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();

        let mut svc = CartService::new(UnitOfWork::new(pool.clone()));
        svc.add_item(alice, product.id, 2).await.unwrap();
        svc.add_item(bob, product.id, 1).await.unwrap();

        assert_eq!(svc.items(alice).await.unwrap().len(), 1);
        assert_eq!(svc.items(alice).await.unwrap()[0].quantity, 2);
        assert_eq!(svc.items(bob).await.unwrap()[0].quantity, 1);
    }

    #[tokio::test]
    async fn zero_quantity_update_removes_the_row() {
        let pool = setup_test_db().await;
        let user_id = Uuid::now_v7();
        let product = seed_product(&pool, "Widget", 1000).await;

        let mut svc = CartService::new(UnitOfWork::new(pool.clone()));
        let item = svc.add_item(user_id, product.id, 2).await.unwrap();

        let updated = svc.update_quantity(user_id, item.id, 0).await.unwrap();
        assert!(updated.is_none());
        assert!(svc.items(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_product_is_rejected() {
        let pool = setup_test_db().await;
        let mut svc = CartService::new(UnitOfWork::new(pool.clone()));
        let err = svc
            .add_item(Uuid::now_v7(), Uuid::now_v7(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn clear_empties_only_that_users_cart() {
        let pool = setup_test_db().await;
        let product = seed_product(&pool, "Widget", 1000).await;
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();

        let mut svc = CartService::new(UnitOfWork::new(pool.clone()));
        svc.add_item(alice, product.id, 2).await.unwrap();
        svc.add_item(bob, product.id, 1).await.unwrap();

        assert_eq!(svc.clear(alice).await.unwrap(), 1);
        assert!(svc.items(alice).await.unwrap().is_empty());
        assert_eq!(svc.items(bob).await.unwrap().len(), 1);
    }
}
