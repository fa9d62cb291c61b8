pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod settlement;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    Currency, EntryType, LedgerEntry, Money, OwnerAccount, OwnerAccountId, OwnerAccountStatus,
    Purchase, PurchaseId, PurchaseStatus, Refund, RefundId, ReferenceType, TimeMs,
};
pub use engine::{split, FeeSplit, ProcessorFeeSchedule};
pub use error::AppError;
pub use settlement::SettlementWriter;
