// models.rs - Catalog and order records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core_types::{OrderId, ProductId, StoreId};

/// Priced catalog entry.
///
/// Owned by the catalog; checkout only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Unit price in major currency units (SAR)
    pub price: Decimal,
}

impl Product {
    pub fn new(id: impl Into<ProductId>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            price,
        }
    }
}

/// Line item to be created together with its order.
///
/// Links by product id only; the product does not have to resolve in the
/// catalog for the item to be requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
}

impl NewOrderItem {
    pub fn new(product_id: ProductId) -> Self {
        Self { product_id }
    }
}

/// Persisted order line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub order_id: OrderId,
    pub product_id: ProductId,
}

/// Persisted order
///
/// Created unpaid by checkout. Only the provider callback flips `is_paid`;
/// orders are never deleted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub store_id: StoreId,
    pub is_paid: bool,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Build a fresh unpaid order with one item per requested product.
    pub fn new_pending(store_id: StoreId, items: &[NewOrderItem]) -> Self {
        let id = OrderId::generate();
        let items = items
            .iter()
            .map(|item| OrderItem {
                id: uuid::Uuid::new_v4().to_string(),
                order_id: id.clone(),
                product_id: item.product_id.clone(),
            })
            .collect();

        Self {
            id,
            store_id,
            is_paid: false,
            items,
            created_at: Utc::now(),
        }
    }
}
