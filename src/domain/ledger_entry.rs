//! Ledger entry: the atomic, immutable unit of record.

use crate::domain::{Money, OwnerAccountId, TimeMs};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of money movement an entry records.
///
/// Open for extension (e.g. a future `payout` type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// Gross amount charged to the buyer, credited to the owner.
    Charge,
    /// Platform's percentage fee. Negative on purchases, positive on
    /// refund reversals.
    PlatformFee,
    /// Payment processor's fee. Never reversed.
    ProcessorFee,
    /// Amount returned to the buyer, debited from the owner.
    Refund,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Charge => "charge",
            EntryType::PlatformFee => "platform_fee",
            EntryType::ProcessorFee => "processor_fee",
            EntryType::Refund => "refund",
        }
    }
}

impl FromStr for EntryType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "charge" => Ok(EntryType::Charge),
            "platform_fee" => Ok(EntryType::PlatformFee),
            "processor_fee" => Ok(EntryType::ProcessorFee),
            "refund" => Ok(EntryType::Refund),
            _ => Err(()),
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source event an entry is traceable to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Purchase,
    Refund,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Purchase => "purchase",
            ReferenceType::Refund => "refund",
        }
    }
}

impl FromStr for ReferenceType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "purchase" => Ok(ReferenceType::Purchase),
            "refund" => Ok(ReferenceType::Refund),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable signed money movement, always tied to a purchase or
/// refund reference.
///
/// Entries are append-only. For a given (reference_type, reference_id)
/// at most one entry of each type exists; the storage layer enforces
/// this with a unique constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Storage-assigned unique id.
    pub id: String,
    /// Owner account whose balance this entry moves.
    pub owner_account_id: OwnerAccountId,
    pub entry_type: EntryType,
    /// Signed amount; positive = credit to owner, negative = debit.
    pub amount: Money,
    pub reference_type: ReferenceType,
    /// Id of the purchase or refund this entry is traceable to.
    pub reference_id: String,
    /// Human-readable description; includes the fee rate for
    /// platform_fee entries.
    pub description: String,
    pub created_at: TimeMs,
}

impl LedgerEntry {
    /// Create a new entry with a fresh id, stamped now.
    pub fn new(
        owner_account_id: OwnerAccountId,
        entry_type: EntryType,
        amount: Money,
        reference_type: ReferenceType,
        reference_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        LedgerEntry {
            id: uuid::Uuid::new_v4().to_string(),
            owner_account_id,
            entry_type,
            amount,
            reference_type,
            reference_id: reference_id.into(),
            description: description.into(),
            created_at: TimeMs::now(),
        }
    }
}
