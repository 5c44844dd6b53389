//! Product and category management.

use uuid::Uuid;

use crate::domain::{Audit, Category, Product};
use crate::error::{Error, Result};
use crate::store::UnitOfWork;

#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub discount_price: Option<i64>,
    pub currency: String,
    pub stock_quantity: i32,
    pub category_id: Option<Uuid>,
}

pub struct ProductService {
    uow: UnitOfWork,
}

impl ProductService {
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }

    pub async fn get(&mut self, product_id: Uuid) -> Result<Product> {
        self.uow
            .products
            .get(product_id)
            .await?
            .ok_or_else(|| Error::not_found("product", product_id))
    }

    pub async fn list(&mut self) -> Result<Vec<Product>> {
        self.uow.products.all().await.map_err(Into::into)
    }

    pub async fn create(&mut self, input: ProductInput) -> Result<Product> {
        self.validate(&input).await?;
        let product = Product {
            id: Uuid::now_v7(),
            name: input.name,
            description: input.description,
            price: input.price,
            discount_price: input.discount_price,
            currency: input.currency,
            stock_quantity: input.stock_quantity,
            in_stock: input.stock_quantity > 0,
            category_id: input.category_id,
            audit: Audit::new(),
        };
        self.uow.products.add(product.clone());
        self.uow.save_changes().await?;
        Ok(product)
    }

    pub async fn update(&mut self, product_id: Uuid, input: ProductInput) -> Result<Product> {
        self.validate(&input).await?;
        let mut product = self.get(product_id).await?;
        product.name = input.name;
        product.description = input.description;
        product.price = input.price;
        product.discount_price = input.discount_price;
        product.currency = input.currency;
        product.stock_quantity = input.stock_quantity;
        product.in_stock = input.stock_quantity > 0;
        product.category_id = input.category_id;
        self.uow.products.update(product.clone());
        self.uow.save_changes().await?;
        Ok(product)
    }

    /// Products are never hard-deleted; historical order lines keep pointing
    /// at the row.
    pub async fn delete(&mut self, product_id: Uuid) -> Result<()> {
        self.uow.products.soft_delete(product_id);
        self.uow.save_changes().await?;
        Ok(())
    }

    pub async fn create_category(
        &mut self,
        name: String,
        description: Option<String>,
    ) -> Result<Category> {
        if name.trim().is_empty() {
            return Err(Error::Validation("category name is required".into()));
        }
        let category = Category::new(name, description);
        self.uow.categories.add(category.clone());
        self.uow.save_changes().await?;
        Ok(category)
    }

    pub async fn get_category(&mut self, category_id: Uuid) -> Result<Category> {
        self.uow
            .categories
            .get(category_id)
            .await?
            .ok_or_else(|| Error::not_found("category", category_id))
    }

    pub async fn list_categories(&mut self) -> Result<Vec<Category>> {
        self.uow.categories.all().await.map_err(Into::into)
    }

    async fn validate(&mut self, input: &ProductInput) -> Result<()> {
        if input.name.trim().is_empty() {
            return Err(Error::Validation("product name is required".into()));
        }
        if input.price <= 0 {
            return Err(Error::Validation("price must be positive".into()));
        }
        if let Some(discount) = input.discount_price {
            if discount <= 0 {
                return Err(Error::Validation("discount price must be positive".into()));
            }
        }
        if input.stock_quantity < 0 {
            return Err(Error::Validation(
                "stock quantity must not be negative".into(),
            ));
        }
        if let Some(category_id) = input.category_id {
            if !self.uow.categories.exists(category_id).await? {
                return Err(Error::not_found("category", category_id));
            }
        }
        Ok(())
    }
}
