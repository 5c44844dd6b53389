//! [`Entity`] implementations: one table and its insert/update SQL per
//! domain type. Audit columns always occupy the tail of the column list.

use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;
use uuid::Uuid;

use crate::domain::{Address, Audit, CartItem, Category, Order, OrderDetail, Product};
use crate::store::Entity;

impl Entity for Category {
    const TABLE: &'static str = "categories";

    fn id(&self) -> Uuid {
        self.id
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn insert_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        sqlx::query(
            "INSERT INTO categories (id, name, slug, description, \
             created_at, updated_at, is_active, is_deleted, deleted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.slug)
        .bind(&self.description)
        .bind(self.audit.created_at)
        .bind(self.audit.updated_at)
        .bind(self.audit.is_active)
        .bind(self.audit.is_deleted)
        .bind(self.audit.deleted_at)
    }

    fn update_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        sqlx::query(
            "UPDATE categories SET name = ?2, slug = ?3, description = ?4, updated_at = ?5 \
             WHERE id = ?1 AND is_deleted = 0",
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.slug)
        .bind(&self.description)
        .bind(self.audit.updated_at)
    }
}

impl Entity for Product {
    const TABLE: &'static str = "products";

    fn id(&self) -> Uuid {
        self.id
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn insert_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        sqlx::query(
            "INSERT INTO products (id, name, description, price, discount_price, currency, \
             stock_quantity, in_stock, category_id, \
             created_at, updated_at, is_active, is_deleted, deleted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.description)
        .bind(self.price)
        .bind(self.discount_price)
        .bind(&self.currency)
        .bind(self.stock_quantity)
        .bind(self.in_stock)
        .bind(self.category_id)
        .bind(self.audit.created_at)
        .bind(self.audit.updated_at)
        .bind(self.audit.is_active)
        .bind(self.audit.is_deleted)
        .bind(self.audit.deleted_at)
    }

    fn update_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        sqlx::query(
            "UPDATE products SET name = ?2, description = ?3, price = ?4, discount_price = ?5, \
             currency = ?6, stock_quantity = ?7, in_stock = ?8, category_id = ?9, updated_at = ?10 \
             WHERE id = ?1 AND is_deleted = 0",
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.description)
        .bind(self.price)
        .bind(self.discount_price)
        .bind(&self.currency)
        .bind(self.stock_quantity)
        .bind(self.in_stock)
        .bind(self.category_id)
        .bind(self.audit.updated_at)
    }
}

impl Entity for Address {
    const TABLE: &'static str = "addresses";

    fn id(&self) -> Uuid {
        self.id
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn insert_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        sqlx::query(
            "INSERT INTO addresses (id, user_id, title, line1, line2, city, district, \
             postal_code, country, address_type, is_default, \
             created_at, updated_at, is_active, is_deleted, deleted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        )
        .bind(self.id)
        .bind(self.user_id)
        .bind(&self.title)
        .bind(&self.line1)
        .bind(&self.line2)
        .bind(&self.city)
        .bind(&self.district)
        .bind(&self.postal_code)
        .bind(&self.country)
        .bind(&self.address_type)
        .bind(self.is_default)
        .bind(self.audit.created_at)
        .bind(self.audit.updated_at)
        .bind(self.audit.is_active)
        .bind(self.audit.is_deleted)
        .bind(self.audit.deleted_at)
    }

    fn update_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        sqlx::query(
            "UPDATE addresses SET title = ?2, line1 = ?3, line2 = ?4, city = ?5, district = ?6, \
             postal_code = ?7, country = ?8, address_type = ?9, is_default = ?10, updated_at = ?11 \
             WHERE id = ?1 AND is_deleted = 0",
        )
        .bind(self.id)
        .bind(&self.title)
        .bind(&self.line1)
        .bind(&self.line2)
        .bind(&self.city)
        .bind(&self.district)
        .bind(&self.postal_code)
        .bind(&self.country)
        .bind(&self.address_type)
        .bind(self.is_default)
        .bind(self.audit.updated_at)
    }
}

impl Entity for Order {
    const TABLE: &'static str = "orders";

    fn id(&self) -> Uuid {
        self.id
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn insert_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        sqlx::query(
            "INSERT INTO orders (id, order_number, order_date, user_id, status, payment_status, \
             payment_method, total_amount, shipping_cost, tax_amount, currency, \
             shipping_address_id, billing_address_id, notes, \
             created_at, updated_at, is_active, is_deleted, deleted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
        )
        .bind(self.id)
        .bind(&self.order_number)
        .bind(self.order_date)
        .bind(self.user_id)
        .bind(self.status)
        .bind(self.payment_status)
        .bind(self.payment_method)
        .bind(self.total_amount)
        .bind(self.shipping_cost)
        .bind(self.tax_amount)
        .bind(&self.currency)
        .bind(self.shipping_address_id)
        .bind(self.billing_address_id)
        .bind(&self.notes)
        .bind(self.audit.created_at)
        .bind(self.audit.updated_at)
        .bind(self.audit.is_active)
        .bind(self.audit.is_deleted)
        .bind(self.audit.deleted_at)
    }

    // Status fields are the only business columns that legitimately change
    // after creation; totals and snapshots stay frozen.
    fn update_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        sqlx::query(
            "UPDATE orders SET status = ?2, payment_status = ?3, notes = ?4, updated_at = ?5 \
             WHERE id = ?1 AND is_deleted = 0",
        )
        .bind(self.id)
        .bind(self.status)
        .bind(self.payment_status)
        .bind(&self.notes)
        .bind(self.audit.updated_at)
    }
}

impl Entity for OrderDetail {
    const TABLE: &'static str = "order_details";

    fn id(&self) -> Uuid {
        self.id
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn insert_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        sqlx::query(
            "INSERT INTO order_details (id, order_id, product_id, product_name, unit_price, \
             quantity, subtotal, created_at, updated_at, is_active, is_deleted, deleted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )
        .bind(self.id)
        .bind(self.order_id)
        .bind(self.product_id)
        .bind(&self.product_name)
        .bind(self.unit_price)
        .bind(self.quantity)
        .bind(self.subtotal)
        .bind(self.audit.created_at)
        .bind(self.audit.updated_at)
        .bind(self.audit.is_active)
        .bind(self.audit.is_deleted)
        .bind(self.audit.deleted_at)
    }

    // Line items are immutable snapshots; only the audit trail may move.
    fn update_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        sqlx::query("UPDATE order_details SET updated_at = ?2 WHERE id = ?1 AND is_deleted = 0")
            .bind(self.id)
            .bind(self.audit.updated_at)
    }
}

impl Entity for CartItem {
    const TABLE: &'static str = "cart_items";

    fn id(&self) -> Uuid {
        self.id
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn insert_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        sqlx::query(
            "INSERT INTO cart_items (id, user_id, product_id, quantity, \
             created_at, updated_at, is_active, is_deleted, deleted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(self.id)
        .bind(self.user_id)
        .bind(self.product_id)
        .bind(self.quantity)
        .bind(self.audit.created_at)
        .bind(self.audit.updated_at)
        .bind(self.audit.is_active)
        .bind(self.audit.is_deleted)
        .bind(self.audit.deleted_at)
    }

    fn update_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        sqlx::query(
            "UPDATE cart_items SET quantity = ?2, updated_at = ?3 \
             WHERE id = ?1 AND is_deleted = 0",
        )
        .bind(self.id)
        .bind(self.quantity)
        .bind(self.audit.updated_at)
    }
}
