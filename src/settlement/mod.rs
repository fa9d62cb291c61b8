//! Settlement: translating purchase and refund events into immutable,
//! balanced ledger entries.

pub mod writer;

pub use writer::{PurchaseSettlement, RefundSettlement, SettlementError, SettlementWriter};
