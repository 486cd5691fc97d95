//! PostgreSQL catalog and order store
//!
//! Reads and writes the storefront's existing tables (created by the admin
//! dashboard, not by this service):
//!
//! ```text
//! "Product"   (id TEXT PK, price NUMERIC, ...)
//! "Order"     (id TEXT PK, "storeId" TEXT FK -> "Store", "isPaid" BOOL, "createdAt" TIMESTAMPTZ, ...)
//! "OrderItem" (id TEXT PK, "orderId" TEXT FK -> "Order", "productId" TEXT FK -> "Product")
//! ```
//!
//! An order and its items are written in one transaction.
//!
//! Because of the `"productId"` foreign key, a cart holding an id that is
//! not in `"Product"` fails here with [`StoreError::ConstraintViolation`]
//! and nothing is written. The in-memory store has no such key and records
//! an item for any id.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};

use super::{OrderStore, ProductCatalog, StoreError};
use crate::core_types::{OrderId, ProductId, StoreId};
use crate::models::{NewOrderItem, Order, OrderItem, Product};

/// Map driver errors, singling out constraint violations
fn map_sqlx_error(e: sqlx::Error, store_id: &StoreId) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_foreign_key_violation() {
            // The only FK on "Order" is the store
            if db_err.table() == Some("Order") {
                return StoreError::StoreNotFound(store_id.clone());
            }
            return StoreError::ConstraintViolation(db_err.message().to_string());
        }
        if db_err.is_unique_violation() || db_err.is_check_violation() {
            return StoreError::ConstraintViolation(db_err.message().to_string());
        }
    }
    StoreError::Database(e)
}

/// Product lookups
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductCatalog for PgCatalog {
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<&str> = ids.iter().map(ProductId::as_str).collect();
        let rows = sqlx::query(r#"SELECT id, price FROM "Product" WHERE id = ANY($1)"#)
            .bind(&keys)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|r| -> Result<Product, StoreError> {
                Ok(Product {
                    id: ProductId::new(r.try_get::<String, _>("id")?),
                    price: r.try_get::<Decimal, _>("price")?,
                })
            })
            .collect()
    }
}

/// Order persistence
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(&self, order: &Order) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO "Order" (id, "storeId", "isPaid", "createdAt", "updatedAt")
               VALUES ($1, $2, $3, $4, $4)"#,
        )
        .bind(order.id.as_str())
        .bind(order.store_id.as_str())
        .bind(order.is_paid)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        for item in &order.items {
            sqlx::query(r#"INSERT INTO "OrderItem" (id, "orderId", "productId") VALUES ($1, $2, $3)"#)
                .bind(&item.id)
                .bind(item.order_id.as_str())
                .bind(item.product_id.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create(&self, store_id: &StoreId, items: &[NewOrderItem]) -> Result<Order, StoreError> {
        let order = Order::new_pending(store_id.clone(), items);

        self.insert(&order)
            .await
            .map_err(|e| map_sqlx_error(e, store_id))?;

        tracing::debug!(
            order_id = %order.id,
            store_id = %store_id,
            items = order.items.len(),
            "Order persisted"
        );
        Ok(order)
    }

    async fn get(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query(
            r#"SELECT id, "storeId", "isPaid", "createdAt" FROM "Order" WHERE id = $1"#,
        )
        .bind(order_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let item_rows = sqlx::query(
            r#"SELECT id, "productId" FROM "OrderItem" WHERE "orderId" = $1 ORDER BY id"#,
        )
        .bind(order_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        let items = item_rows
            .iter()
            .map(|r| -> Result<OrderItem, sqlx::Error> {
                Ok(OrderItem {
                    id: r.try_get("id")?,
                    order_id: order_id.clone(),
                    product_id: ProductId::new(r.try_get::<String, _>("productId")?),
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(Some(Order {
            id: OrderId::new(row.try_get::<String, _>("id")?),
            store_id: StoreId::new(row.try_get::<String, _>("storeId")?),
            is_paid: row.try_get("isPaid")?,
            items,
            created_at: row.try_get::<DateTime<Utc>, _>("createdAt")?,
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
