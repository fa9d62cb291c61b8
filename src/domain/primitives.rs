//! Domain primitives: TimeMs and identifier newtypes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Time in milliseconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

impl TimeMs {
    /// Create a TimeMs from milliseconds.
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    /// Get the underlying milliseconds value.
    pub fn as_ms(&self) -> i64 {
        self.0
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        TimeMs(chrono::Utc::now().timestamp_millis())
    }
}

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Create an id from a string.
            pub fn new(id: impl Into<String>) -> Self {
                $name(id.into())
            }

            /// Get the id as a string reference.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// Opaque, stable purchase identifier; doubles as the purchase-side
    /// idempotency key.
    PurchaseId
}

string_id! {
    /// Opaque, stable refund identifier; doubles as the refund-side
    /// idempotency key.
    RefundId
}

string_id! {
    /// Identifier of the owner account receiving the net proceeds.
    OwnerAccountId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_ms_ordering() {
        assert!(TimeMs::new(1000) < TimeMs::new(2000));
    }

    #[test]
    fn id_display_roundtrip() {
        let id = PurchaseId::new("pur_123");
        assert_eq!(id.to_string(), "pur_123");
        assert_eq!(id.as_str(), "pur_123");
    }
}
