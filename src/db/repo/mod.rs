//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database
//! operations. Methods are organized across submodules by domain:
//! - `ledger.rs` - ledger entry inserts, queries and aggregation
//! - `purchases.rs` - purchase and refund settlement records
//!
//! Settlement writes that span tables (purchase row + entries, refund
//! row + entries + status transition) are coordinated here so they
//! commit or roll back as a unit.

mod ledger;
mod purchases;

use crate::domain::{
    Currency, EntryType, LedgerEntry, OwnerAccount, OwnerAccountId, OwnerAccountStatus, Purchase,
    PurchaseStatus, Refund,
};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::str::FromStr;

/// One aggregated revenue bucket: calendar month x currency x entry type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevenueRow {
    pub month: String,
    pub currency: Currency,
    pub entry_type: EntryType,
    pub total_cents: i64,
}

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    // =========================================================================
    // Owner account operations
    // =========================================================================

    /// Insert or update an owner account.
    pub async fn upsert_owner_account(&self, account: &OwnerAccount) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO owner_accounts (id, payout_provider_ref, status)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                payout_provider_ref = excluded.payout_provider_ref,
                status = excluded.status
            "#,
        )
        .bind(account.id.as_str())
        .bind(&account.payout_provider_ref)
        .bind(account.status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Look up an owner account by id.
    pub async fn find_owner_account(
        &self,
        id: &OwnerAccountId,
    ) -> Result<Option<OwnerAccount>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT id, payout_provider_ref, status FROM owner_accounts WHERE id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| {
            let status_str: String = r.get("status");
            let status = OwnerAccountStatus::from_str(&status_str).map_err(|_| {
                sqlx::Error::Decode(format!("unknown owner account status: {}", status_str).into())
            })?;
            Ok(OwnerAccount {
                id: OwnerAccountId::new(r.get::<String, _>("id")),
                payout_provider_ref: r.get("payout_provider_ref"),
                status,
            })
        })
        .transpose()
    }

    // =========================================================================
    // Transaction coordination (spans multiple domains)
    // =========================================================================

    /// Insert the purchase settlement record and its ledger entries
    /// atomically in a single transaction.
    ///
    /// Both inserts are conflict-free: a duplicate settlement leaves the
    /// existing rows untouched. Returns true if the purchase row or any
    /// entry row was newly written.
    ///
    /// # Errors
    /// Returns an error if any database operation fails; nothing is
    /// committed in that case.
    pub async fn record_purchase_settlement_atomic(
        &self,
        purchase: &Purchase,
        entries: &[LedgerEntry],
    ) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let purchase_new = purchases::insert_purchase(&mut tx, purchase).await?;

        let mut any_new = purchase_new;
        for entry in entries {
            if ledger::insert_entry(&mut tx, entry).await? {
                any_new = true;
            }
        }

        tx.commit().await?;
        Ok(any_new)
    }

    /// Insert the refund settlement record, its ledger entries and the
    /// purchase status transition atomically in a single transaction.
    ///
    /// Returns true if the refund row was newly written; a duplicate
    /// delivery changes nothing.
    pub async fn record_refund_settlement_atomic(
        &self,
        refund: &Refund,
        purchase_status: PurchaseStatus,
        entries: &[LedgerEntry],
    ) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let refund_new = purchases::insert_refund(&mut tx, refund).await?;

        for entry in entries {
            ledger::insert_entry(&mut tx, entry).await?;
        }

        if refund_new {
            purchases::update_purchase_status(&mut tx, &refund.purchase_id, purchase_status)
                .await?;
        }

        tx.commit().await?;
        Ok(refund_new)
    }
}
