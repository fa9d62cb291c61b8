//! Purchase and refund settlement records.

use crate::db::repo::Repository;
use crate::domain::{
    Currency, Money, OwnerAccountId, Purchase, PurchaseId, PurchaseStatus, Refund, RefundId,
    TimeMs,
};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;

/// Insert the settled purchase record inside an open transaction.
///
/// A purchase that was already settled keeps its original row.
pub(super) async fn insert_purchase(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    purchase: &Purchase,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO purchases
        (id, owner_account_id, currency, gross_cents, platform_fee_percent,
         platform_fee_cents, processor_fee_cents, owner_net_cents, status, paid_at_ms)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO NOTHING
        "#,
    )
    .bind(purchase.id.as_str())
    .bind(purchase.owner_account_id.as_str())
    .bind(purchase.gross.currency().as_str())
    .bind(purchase.gross.cents())
    .bind(purchase.platform_fee_percent as i64)
    .bind(purchase.platform_fee.cents())
    .bind(purchase.processor_fee.cents())
    .bind(purchase.owner_net.cents())
    .bind(purchase.status.as_str())
    .bind(purchase.paid_at.map(|t| t.as_ms()))
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Insert one refund record inside an open transaction; a duplicate
/// refund id is a no-op.
pub(super) async fn insert_refund(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    refund: &Refund,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO refunds (id, purchase_id, amount_cents, platform_fee_reversal_cents, created_at_ms)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(id) DO NOTHING
        "#,
    )
    .bind(refund.id.as_str())
    .bind(refund.purchase_id.as_str())
    .bind(refund.amount.cents())
    .bind(refund.platform_fee_reversal.cents())
    .bind(refund.created_at.as_ms())
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(super) async fn update_purchase_status(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    purchase_id: &PurchaseId,
    status: PurchaseStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE purchases SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(purchase_id.as_str())
        .execute(&mut **tx)
        .await?;

    Ok(())
}

fn purchase_from_row(row: &SqliteRow) -> Result<Purchase, sqlx::Error> {
    let status_str: String = row.get("status");
    let status = PurchaseStatus::from_str(&status_str).map_err(|_| {
        sqlx::Error::Decode(format!("unknown purchase status: {}", status_str).into())
    })?;

    let currency = Currency::new(row.get::<String, _>("currency"));
    let percent: i64 = row.get("platform_fee_percent");

    Ok(Purchase {
        id: PurchaseId::new(row.get::<String, _>("id")),
        owner_account_id: OwnerAccountId::new(row.get::<String, _>("owner_account_id")),
        gross: Money::new(row.get("gross_cents"), currency.clone()),
        platform_fee: Money::new(row.get("platform_fee_cents"), currency.clone()),
        processor_fee: Money::new(row.get("processor_fee_cents"), currency.clone()),
        owner_net: Money::new(row.get("owner_net_cents"), currency),
        platform_fee_percent: percent as u8,
        status,
        paid_at: row
            .get::<Option<i64>, _>("paid_at_ms")
            .map(TimeMs::new),
    })
}

impl Repository {
    /// Look up a settled purchase record by id.
    pub async fn get_purchase(
        &self,
        id: &PurchaseId,
    ) -> Result<Option<Purchase>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_account_id, currency, gross_cents, platform_fee_percent,
                   platform_fee_cents, processor_fee_cents, owner_net_cents, status, paid_at_ms
            FROM purchases
            WHERE id = ?
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(purchase_from_row).transpose()
    }

    /// Refunds recorded against a purchase, oldest first.
    pub async fn refunds_for_purchase(
        &self,
        purchase_id: &PurchaseId,
    ) -> Result<Vec<Refund>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.purchase_id, r.amount_cents, r.platform_fee_reversal_cents,
                   r.created_at_ms, p.currency
            FROM refunds r
            JOIN purchases p ON p.id = r.purchase_id
            WHERE r.purchase_id = ?
            ORDER BY r.created_at_ms ASC, r.id ASC
            "#,
        )
        .bind(purchase_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let currency = Currency::new(row.get::<String, _>("currency"));
                Refund {
                    id: RefundId::new(row.get::<String, _>("id")),
                    purchase_id: PurchaseId::new(row.get::<String, _>("purchase_id")),
                    amount: Money::new(row.get("amount_cents"), currency.clone()),
                    platform_fee_reversal: Money::new(
                        row.get("platform_fee_reversal_cents"),
                        currency,
                    ),
                    created_at: TimeMs::new(row.get("created_at_ms")),
                }
            })
            .collect())
    }

    /// Totals already refunded and already reversed for a purchase.
    pub async fn refund_totals(
        &self,
        purchase_id: &PurchaseId,
    ) -> Result<(i64, i64), sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0) AS refunded,
                   COALESCE(SUM(platform_fee_reversal_cents), 0) AS reversed
            FROM refunds
            WHERE purchase_id = ?
            "#,
        )
        .bind(purchase_id.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok((row.get("refunded"), row.get("reversed")))
    }
}
