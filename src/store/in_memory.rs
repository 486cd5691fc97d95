//! In-memory catalog and order store
//!
//! Backs the server when no PostgreSQL URL is configured (simulation mode)
//! and serves as the default collaborator in tests.

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};

use super::{OrderStore, ProductCatalog, StoreError};
use crate::core_types::{OrderId, ProductId, StoreId};
use crate::models::{NewOrderItem, Order, Product};

/// DashMap-backed store implementing both [`ProductCatalog`] and [`OrderStore`]
///
/// Store ids are only checked once at least one store has been registered;
/// an empty registry accepts any store.
#[derive(Default)]
pub struct InMemoryStore {
    products: DashMap<ProductId, Product>,
    stores: DashSet<StoreId>,
    orders: DashMap<OrderId, Order>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register a store id
    pub fn with_store(self, store_id: impl Into<StoreId>) -> Self {
        self.stores.insert(store_id.into());
        self
    }

    /// Builder: add a product
    pub fn with_product(self, product: Product) -> Self {
        self.add_product(product);
        self
    }

    pub fn add_product(&self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    /// Number of persisted orders
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Snapshot of all persisted orders (no particular order)
    pub fn orders(&self) -> Vec<Order> {
        self.orders.iter().map(|e| e.value().clone()).collect()
    }
}

#[async_trait]
impl ProductCatalog for InMemoryStore {
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        let mut seen = std::collections::HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| seen.insert(*id))
            .filter_map(|id| self.products.get(id).map(|p| p.value().clone()))
            .collect())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn create(&self, store_id: &StoreId, items: &[NewOrderItem]) -> Result<Order, StoreError> {
        if !self.stores.is_empty() && !self.stores.contains(store_id) {
            return Err(StoreError::StoreNotFound(store_id.clone()));
        }

        let order = Order::new_pending(store_id.clone(), items);
        self.orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn get(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.get(order_id).map(|o| o.value().clone()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn ids(raw: &[&str]) -> Vec<ProductId> {
        raw.iter().map(|s| ProductId::from(*s)).collect()
    }

    #[tokio::test]
    async fn test_find_by_ids_skips_unknown_and_duplicates() {
        let store = InMemoryStore::new()
            .with_product(Product::new("p1", Decimal::new(1999, 2)))
            .with_product(Product::new("p2", Decimal::new(500, 2)));

        let found = store
            .find_by_ids(&ids(&["p1", "missing", "p1", "p2"]))
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        assert!(found.iter().any(|p| p.id.as_str() == "p1"));
        assert!(found.iter().any(|p| p.id.as_str() == "p2"));
    }

    #[tokio::test]
    async fn test_create_rejects_unregistered_store() {
        let store = InMemoryStore::new().with_store("known");
        let items = vec![NewOrderItem::new(ProductId::from("p1"))];

        let err = store
            .create(&StoreId::from("unknown"), &items)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::StoreNotFound(_)));
        assert_eq!(store.order_count(), 0);

        let order = store.create(&StoreId::from("known"), &items).await.unwrap();
        assert_eq!(store.get(&order.id).await.unwrap(), Some(order));
    }

    #[tokio::test]
    async fn test_empty_registry_accepts_any_store() {
        let store = InMemoryStore::new();
        let items = vec![NewOrderItem::new(ProductId::from("p1"))];

        assert!(store.create(&StoreId::from("anything"), &items).await.is_ok());
        assert_eq!(store.order_count(), 1);
    }
}
