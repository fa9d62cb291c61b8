//! Domain types for the settlement ledger.

pub mod ledger_entry;
pub mod money;
pub mod owner_account;
pub mod primitives;
pub mod purchase;
pub mod refund;

pub use ledger_entry::{EntryType, LedgerEntry, ReferenceType};
pub use money::{round_half_up, Currency, Money};
pub use owner_account::{OwnerAccount, OwnerAccountStatus};
pub use primitives::{OwnerAccountId, PurchaseId, RefundId, TimeMs};
pub use purchase::{Purchase, PurchaseStatus};
pub use refund::Refund;
