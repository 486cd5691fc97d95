pub mod checkout;
pub mod health;

pub use checkout::{checkout_preflight, create_checkout};
pub use health::{HealthResponse, health_check};
