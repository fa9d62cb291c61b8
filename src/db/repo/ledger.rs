//! Ledger entry operations: conflict-free inserts, timeline queries and
//! revenue aggregation.

use crate::db::repo::{Repository, RevenueRow};
use crate::domain::{
    Currency, EntryType, LedgerEntry, Money, OwnerAccountId, ReferenceType, TimeMs,
};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;

/// Insert one entry inside an open settlement transaction.
///
/// The UNIQUE (reference_type, reference_id, entry_type) constraint plus
/// ON CONFLICT DO NOTHING makes a duplicate delivery a no-op rather than
/// an error. Returns true if the row was newly written.
pub(super) async fn insert_entry(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    entry: &LedgerEntry,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO ledger_entries
        (id, owner_account_id, entry_type, amount_cents, currency, reference_type, reference_id, description, created_at_ms)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(reference_type, reference_id, entry_type) DO NOTHING
        "#,
    )
    .bind(&entry.id)
    .bind(entry.owner_account_id.as_str())
    .bind(entry.entry_type.as_str())
    .bind(entry.amount.cents())
    .bind(entry.amount.currency().as_str())
    .bind(entry.reference_type.as_str())
    .bind(&entry.reference_id)
    .bind(&entry.description)
    .bind(entry.created_at.as_ms())
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() > 0)
}

fn entry_from_row(row: &SqliteRow) -> Result<LedgerEntry, sqlx::Error> {
    let entry_type_str: String = row.get("entry_type");
    let entry_type = EntryType::from_str(&entry_type_str).map_err(|_| {
        sqlx::Error::Decode(format!("unknown entry type: {}", entry_type_str).into())
    })?;

    let reference_type_str: String = row.get("reference_type");
    let reference_type = ReferenceType::from_str(&reference_type_str).map_err(|_| {
        sqlx::Error::Decode(format!("unknown reference type: {}", reference_type_str).into())
    })?;

    let currency: String = row.get("currency");

    Ok(LedgerEntry {
        id: row.get("id"),
        owner_account_id: OwnerAccountId::new(row.get::<String, _>("owner_account_id")),
        entry_type,
        amount: Money::new(row.get("amount_cents"), Currency::new(currency)),
        reference_type,
        reference_id: row.get("reference_id"),
        description: row.get("description"),
        created_at: TimeMs::new(row.get("created_at_ms")),
    })
}

impl Repository {
    /// All entries written for one purchase or refund reference, in
    /// write order.
    pub async fn entries_for_reference(
        &self,
        reference_type: ReferenceType,
        reference_id: &str,
    ) -> Result<Vec<LedgerEntry>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_account_id, entry_type, amount_cents, currency,
                   reference_type, reference_id, description, created_at_ms
            FROM ledger_entries
            WHERE reference_type = ? AND reference_id = ?
            ORDER BY created_at_ms ASC, entry_type ASC
            "#,
        )
        .bind(reference_type.as_str())
        .bind(reference_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(entry_from_row).collect()
    }

    /// Entries for one owner within a time window, oldest first.
    pub async fn query_entries(
        &self,
        owner_account_id: &OwnerAccountId,
        from_ms: i64,
        to_ms: i64,
    ) -> Result<Vec<LedgerEntry>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_account_id, entry_type, amount_cents, currency,
                   reference_type, reference_id, description, created_at_ms
            FROM ledger_entries
            WHERE owner_account_id = ? AND created_at_ms >= ? AND created_at_ms <= ?
            ORDER BY created_at_ms ASC, entry_type ASC
            "#,
        )
        .bind(owner_account_id.as_str())
        .bind(from_ms)
        .bind(to_ms)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(entry_from_row).collect()
    }

    /// Signed sums grouped by calendar month, currency and entry type
    /// for one owner. Sums of INTEGER cents are exact in SQLite.
    pub async fn revenue_rows(
        &self,
        owner_account_id: &OwnerAccountId,
        from_ms: i64,
        to_ms: i64,
    ) -> Result<Vec<RevenueRow>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT strftime('%Y-%m', created_at_ms / 1000, 'unixepoch') AS month,
                   currency,
                   entry_type,
                   SUM(amount_cents) AS total_cents
            FROM ledger_entries
            WHERE owner_account_id = ? AND created_at_ms >= ? AND created_at_ms <= ?
            GROUP BY month, currency, entry_type
            ORDER BY month ASC, currency ASC, entry_type ASC
            "#,
        )
        .bind(owner_account_id.as_str())
        .bind(from_ms)
        .bind(to_ms)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let entry_type_str: String = row.get("entry_type");
                let entry_type = EntryType::from_str(&entry_type_str).map_err(|_| {
                    sqlx::Error::Decode(format!("unknown entry type: {}", entry_type_str).into())
                })?;
                Ok(RevenueRow {
                    month: row.get("month"),
                    currency: Currency::new(row.get::<String, _>("currency")),
                    entry_type,
                    total_cents: row.get("total_cents"),
                })
            })
            .collect()
    }
}
