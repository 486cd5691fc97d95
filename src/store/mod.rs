//! Catalog and order persistence
//!
//! Checkout talks to storage through two narrow traits:
//! - [`ProductCatalog`]: resolve product ids to priced products (read-only)
//! - [`OrderStore`]: create pending orders (create-only in the checkout flow)
//!
//! Two backends implement both:
//! - [`postgres`]: sqlx/PostgreSQL against the storefront schema
//! - [`in_memory`]: DashMap-backed, used in simulation mode and tests

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::{PgCatalog, PgOrderStore};

use async_trait::async_trait;
use thiserror::Error;

use crate::core_types::{OrderId, ProductId, StoreId};
use crate::models::{NewOrderItem, Order, Product};

/// Storage error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store not found: {0}")]
    StoreNotFound(StoreId),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Read access to priced products
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Resolve the given ids.
    ///
    /// Unknown ids are simply absent from the result; no ordering guarantee.
    /// Duplicate ids resolve to a single product.
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError>;
}

/// Order persistence
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Create an unpaid order with one item per entry, atomically.
    async fn create(&self, store_id: &StoreId, items: &[NewOrderItem]) -> Result<Order, StoreError>;

    /// Look up an order with its items.
    ///
    /// Not on the checkout path. Reconciliation of unpaid orders (logged by
    /// the orchestrator with their id) reads orders back through this.
    async fn get(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// Cheap liveness probe for health checks
    async fn ping(&self) -> Result<(), StoreError>;
}
