//! Owner account: the fee-recipient entity.

use crate::domain::OwnerAccountId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerAccountStatus {
    Active,
    Disabled,
}

impl OwnerAccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerAccountStatus::Active => "active",
            OwnerAccountStatus::Disabled => "disabled",
        }
    }
}

impl FromStr for OwnerAccountStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(OwnerAccountStatus::Active),
            "disabled" => Ok(OwnerAccountStatus::Disabled),
            _ => Err(()),
        }
    }
}

/// The selling owner. Must exist before any ledger entry referencing it
/// is written; absence is a fatal precondition failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerAccount {
    pub id: OwnerAccountId,
    /// External payment-processor identity used at payout time.
    pub payout_provider_ref: String,
    pub status: OwnerAccountStatus,
}
