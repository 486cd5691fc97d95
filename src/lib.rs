//! Storefront Checkout
//!
//! Prices a cart, records an unpaid order and opens a hosted Moyasar
//! payment session for it.
//!
//! # Modules
//!
//! - [`core_types`] - Identifier newtypes (StoreId, ProductId, OrderId)
//! - [`money`] - Decimal prices to integer minor units
//! - [`models`] - Product, Order and OrderItem records
//! - [`store`] - Catalog and order persistence (PostgreSQL or in-memory)
//! - [`payment`] - Payment provider seam and the Moyasar client
//! - [`checkout`] - The checkout flow
//! - [`gateway`] - HTTP surface (axum)
//! - [`config`] / [`logging`] / [`db`] - Start-up plumbing

// Core types - must be first!
pub mod core_types;

pub mod money;
pub mod models;

pub mod db;
pub mod store;

pub mod payment;

pub mod checkout;

pub mod config;
pub mod gateway;
pub mod logging;

// Convenient re-exports at crate root
pub use checkout::{CheckoutError, CheckoutOrchestrator, CheckoutSession, CheckoutSettings};
pub use core_types::{OrderId, ProductId, StoreId};
pub use models::{NewOrderItem, Order, OrderItem, Product};
pub use money::MinorUnits;
pub use payment::{MoyasarGateway, PaymentError, PaymentGateway, PaymentIntent, PaymentSession};
pub use store::{InMemoryStore, OrderStore, ProductCatalog, StoreError};
