//! Core types used throughout the system
//!
//! Identifiers are opaque strings owned by the storefront database
//! (CUID/UUID text keys). Wrapping them in newtypes keeps a store id from
//! ever being passed where a product id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Store ID - the tenant a checkout belongs to (path segment of the route).
    StoreId
);

string_id!(
    /// Product ID - catalog key, supplied by the storefront cart.
    ProductId
);

string_id!(
    /// Order ID - generated when the pending order is created.
    ///
    /// Travels to the payment provider inside the callback URL and metadata,
    /// which is how the callback handler finds the order again.
    OrderId
);

impl OrderId {
    /// Generate a fresh random order id (UUID v4, hyphenated)
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_transparently() {
        let id = ProductId::from("p1");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""p1""#);

        let ids: Vec<ProductId> = serde_json::from_str(r#"["a","b","a"]"#).unwrap();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[2].as_str(), "a");
    }

    #[test]
    fn test_generated_order_ids_are_unique() {
        let a = OrderId::generate();
        let b = OrderId::generate();
        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(a.as_str()).is_ok());
    }
}
