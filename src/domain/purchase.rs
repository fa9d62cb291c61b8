//! Purchase: one buyer's transaction for one sellable event.

use crate::domain::{Money, OwnerAccountId, PurchaseId, TimeMs};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
    PartiallyRefunded,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Paid => "paid",
            PurchaseStatus::Failed => "failed",
            PurchaseStatus::Refunded => "refunded",
            PurchaseStatus::PartiallyRefunded => "partially_refunded",
        }
    }
}

impl FromStr for PurchaseStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PurchaseStatus::Pending),
            "paid" => Ok(PurchaseStatus::Paid),
            "failed" => Ok(PurchaseStatus::Failed),
            "refunded" => Ok(PurchaseStatus::Refunded),
            "partially_refunded" => Ok(PurchaseStatus::PartiallyRefunded),
            _ => Err(()),
        }
    }
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A buyer's transaction, handed to the ledger core as an
/// already-validated value object. The core reads amounts; it never
/// mutates the purchase itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub owner_account_id: OwnerAccountId,
    pub gross: Money,
    pub platform_fee: Money,
    pub processor_fee: Money,
    pub owner_net: Money,
    /// Rate used for the platform fee, recorded so entry descriptions
    /// can state it.
    pub platform_fee_percent: u8,
    pub status: PurchaseStatus,
    pub paid_at: Option<TimeMs>,
}

impl Purchase {
    /// Once paid, gross must equal the three-way split exactly; any
    /// rounding residue was absorbed into owner net by the calculator,
    /// never dropped.
    pub fn is_balanced(&self) -> bool {
        self.gross.cents()
            == self.platform_fee.cents() + self.processor_fee.cents() + self.owner_net.cents()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Currency;

    fn usd(cents: i64) -> Money {
        Money::new(cents, Currency::new("USD"))
    }

    #[test]
    fn status_string_roundtrip() {
        for s in [
            PurchaseStatus::Pending,
            PurchaseStatus::Paid,
            PurchaseStatus::Failed,
            PurchaseStatus::Refunded,
            PurchaseStatus::PartiallyRefunded,
        ] {
            assert_eq!(PurchaseStatus::from_str(s.as_str()), Ok(s));
        }
        assert!(PurchaseStatus::from_str("disputed").is_err());
    }

    #[test]
    fn balanced_split_detected() {
        let p = Purchase {
            id: PurchaseId::new("pur_1"),
            owner_account_id: OwnerAccountId::new("own_1"),
            gross: usd(1000),
            platform_fee: usd(100),
            processor_fee: usd(59),
            owner_net: usd(841),
            platform_fee_percent: 10,
            status: PurchaseStatus::Paid,
            paid_at: Some(TimeMs::new(1_700_000_000_000)),
        };
        assert!(p.is_balanced());

        let mut off = p;
        off.owner_net = usd(840);
        assert!(!off.is_balanced());
    }
}
