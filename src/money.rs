//! Money Conversion Module
//!
//! Catalog prices are fixed-point `Decimal` values in major units (riyals).
//! The payment provider takes integer minor units (halalas). All conversions
//! between the two go through this module.
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use storefront_checkout::money::{to_minor_units, format_minor_units};
//!
//! let total = Decimal::new(2499, 2); // 24.99
//! let amount = to_minor_units(total).unwrap();
//! assert_eq!(amount.get(), 2499);
//! assert_eq!(format_minor_units(amount), "24.99");
//! ```

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minor units per major unit (1 SAR = 100 halalas)
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

// ============================================================================
// Error Types
// ============================================================================

/// Money conversion errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Amount too large, would overflow")]
    Overflow,
}

// ============================================================================
// MinorUnits
// ============================================================================

/// Integer amount in minor currency units, as sent to the provider.
///
/// Serializes as a bare JSON integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(i64);

impl MinorUnits {
    pub const ZERO: MinorUnits = MinorUnits(0);

    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Conversions
// ============================================================================

/// Sum catalog prices without losing precision.
pub fn sum_prices<'a, I>(prices: I) -> Result<Decimal, MoneyError>
where
    I: IntoIterator<Item = &'a Decimal>,
{
    prices
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(*p))
        .ok_or(MoneyError::Overflow)
}

/// Convert a major-unit total to minor units.
///
/// Scaling by 100 is exact; any remaining fraction (prices with more than two
/// decimals) is resolved with banker's rounding, midpoint to even.
pub fn to_minor_units(total: Decimal) -> Result<MinorUnits, MoneyError> {
    let scaled = total
        .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
        .ok_or(MoneyError::Overflow)?;

    scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .to_i64()
        .map(MinorUnits)
        .ok_or(MoneyError::Overflow)
}

/// Format minor units as a two-decimal major-unit string (logging/display).
pub fn format_minor_units(amount: MinorUnits) -> String {
    let value = Decimal::from(amount.0) / Decimal::from(MINOR_UNITS_PER_MAJOR);
    format!("{:.2}", value)
}

// ============================================================================
// Unit Tests
// ============================================================================
