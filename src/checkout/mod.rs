//! Checkout
//!
//! Turns a cart (list of product ids) into an unpaid order plus a hosted
//! payment session.
//!
//! ```text
//! validate -> resolve products -> amount -> create order -> payment session -> redirect url
//!                                              |                 |
//!                                     PersistenceError    Gateway/TransportError
//!                                      (no payment call)   (order kept unpaid)
//! ```

pub mod error;
pub mod orchestrator;


pub use error::{CheckoutError, GENERIC_ERROR_MESSAGE, INVALID_REQUEST_MESSAGE};
pub use orchestrator::{
    CheckoutOrchestrator, CheckoutSession, CheckoutSettings, CheckoutUrls, PendingCheckout,
};
