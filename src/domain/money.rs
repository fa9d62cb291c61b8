//! Integer minor-unit money arithmetic.
//!
//! Amounts are an integer number of minor currency units (cents) plus an
//! ISO 4217 currency code. Fractional cents only exist transiently inside
//! `round_half_up`; no other code performs rounding.

use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 4217 currency code (e.g., "USD"). Passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Currency(pub String);

impl Currency {
    /// Create a Currency from a code, normalizing to uppercase.
    pub fn new(code: impl Into<String>) -> Self {
        Currency(code.into().trim().to_uppercase())
    }

    /// Get the code as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An amount of money in minor currency units.
///
/// Signed: positive amounts credit the owner, negative amounts debit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    cents: i64,
    currency: Currency,
}

impl Money {
    /// Create a Money value from minor units and a currency.
    pub fn new(cents: i64, currency: Currency) -> Self {
        Money { cents, currency }
    }

    /// Zero in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Money { cents: 0, currency }
    }

    /// The amount in minor units.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// The currency code.
    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Returns true if the amount is < 0.
    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Negated amount in the same currency.
    pub fn negated(&self) -> Self {
        Money {
            cents: -self.cents,
            currency: self.currency.clone(),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.cents, self.currency)
    }
}

/// Round-half-up division of the exact rational `numer / denom`.
///
/// This is the single point where a fractional cent becomes an integer
/// cent; every fee computation routes through here. Ties round toward
/// positive infinity. `denom` must be positive.
pub fn round_half_up(numer: i128, denom: i128) -> i64 {
    assert!(denom > 0, "denominator must be positive");
    let q = numer.div_euclid(denom);
    let r = numer.rem_euclid(denom);
    let rounded = if 2 * r >= denom { q + 1 } else { q };
    rounded as i64
}
