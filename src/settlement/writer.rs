use crate::db::Repository;
use crate::domain::{
    EntryType, LedgerEntry, Money, OwnerAccountId, Purchase, PurchaseStatus, Refund, RefundId,
    ReferenceType, TimeMs,
};
use crate::engine::{reverse_platform_fee, FeeSplit, ReversalError, SplitError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Writes settlement ledger entries through the storage collaborator.
///
/// Each operation is one atomic unit of work: either every entry for the
/// event exists afterwards or none do. Duplicate deliveries of the same
/// event are absorbed here, not upstream; the ledger is the last line of
/// defense against double-posting.
#[derive(Clone)]
pub struct SettlementWriter {
    repo: Arc<Repository>,
}

/// Outcome of a purchase settlement.
#[derive(Debug)]
pub struct PurchaseSettlement {
    /// The canonical entries for the purchase, in write order. On a
    /// duplicate call these are the previously written rows.
    pub entries: Vec<LedgerEntry>,
    pub newly_recorded: bool,
}

/// Outcome of a refund settlement.
#[derive(Debug)]
pub struct RefundSettlement {
    pub entries: Vec<LedgerEntry>,
    pub platform_fee_reversal_cents: i64,
    pub newly_recorded: bool,
}

#[derive(Debug, Error)]
pub enum SettlementError {
    /// Fatal and non-retryable: the purchase cannot be settled until an
    /// operator resolves the missing account.
    #[error("owner account not found: {0}")]
    OwnerAccountNotFound(OwnerAccountId),
    /// Rejected before any write; the caller must correct the input.
    #[error("invalid settlement for {reference_id}: {reason}")]
    Validation {
        reference_id: String,
        reason: String,
    },
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error(transparent)]
    Reversal(#[from] ReversalError),
    /// Transient storage failures propagate unchanged; retry policy
    /// belongs to the caller.
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl SettlementWriter {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Record the settlement of a paid purchase: a `charge` credit, a
    /// `platform_fee` debit and a `processor_fee` debit, atomically.
    ///
    /// `actual_processor_fee_cents`, when the processor has reported its
    /// true fee, replaces the checkout-time estimate in the
    /// processor_fee entry only; the purchase record keeps the split it
    /// was sold under.
    ///
    /// Calling this twice for the same purchase id is a no-op returning
    /// the previously written entries.
    pub async fn record_purchase_settlement(
        &self,
        purchase: &Purchase,
        split: &FeeSplit,
        actual_processor_fee_cents: Option<i64>,
    ) -> Result<PurchaseSettlement, SettlementError> {
        let existing = self
            .repo
            .entries_for_reference(ReferenceType::Purchase, purchase.id.as_str())
            .await?;
        if !existing.is_empty() {
            info!(purchase_id = %purchase.id, "purchase already settled, returning existing entries");
            return Ok(PurchaseSettlement {
                entries: existing,
                newly_recorded: false,
            });
        }

        if self
            .repo
            .find_owner_account(&purchase.owner_account_id)
            .await?
            .is_none()
        {
            return Err(SettlementError::OwnerAccountNotFound(
                purchase.owner_account_id.clone(),
            ));
        }

        self.validate_purchase(purchase, split, actual_processor_fee_cents)?;

        let currency = purchase.gross.currency().clone();
        let paid = Purchase {
            status: PurchaseStatus::Paid,
            paid_at: purchase.paid_at.or_else(|| Some(TimeMs::now())),
            ..purchase.clone()
        };

        // A fully free purchase settles with no money movement.
        if split.gross_cents == 0 {
            let newly_recorded = self
                .repo
                .record_purchase_settlement_atomic(&paid, &[])
                .await?;
            return Ok(PurchaseSettlement {
                entries: Vec::new(),
                newly_recorded,
            });
        }

        let processor_fee_cents =
            actual_processor_fee_cents.unwrap_or(split.processor_fee_cents);
        let processor_fee_desc = if actual_processor_fee_cents.is_some() {
            "Processor fee (settled)"
        } else {
            "Processor fee (estimated)"
        };

        let entries = vec![
            LedgerEntry::new(
                purchase.owner_account_id.clone(),
                EntryType::Charge,
                Money::new(split.gross_cents, currency.clone()),
                ReferenceType::Purchase,
                purchase.id.as_str(),
                format!("Charge for purchase {}", purchase.id),
            ),
            LedgerEntry::new(
                purchase.owner_account_id.clone(),
                EntryType::PlatformFee,
                Money::new(-split.platform_fee_cents, currency.clone()),
                ReferenceType::Purchase,
                purchase.id.as_str(),
                format!("Platform fee ({}%)", split.platform_fee_percent),
            ),
            LedgerEntry::new(
                purchase.owner_account_id.clone(),
                EntryType::ProcessorFee,
                Money::new(-processor_fee_cents, currency),
                ReferenceType::Purchase,
                purchase.id.as_str(),
                processor_fee_desc,
            ),
        ];

        let newly_recorded = self
            .repo
            .record_purchase_settlement_atomic(&paid, &entries)
            .await?;

        if newly_recorded {
            info!(
                purchase_id = %purchase.id,
                owner_account_id = %purchase.owner_account_id,
                gross_cents = split.gross_cents,
                platform_fee_cents = split.platform_fee_cents,
                processor_fee_cents,
                "purchase settlement recorded"
            );
        }

        // Read back the canonical rows: under a concurrent duplicate
        // delivery the constraint keeps the first write, and both calls
        // must return the same entry ids.
        let entries = self
            .repo
            .entries_for_reference(ReferenceType::Purchase, purchase.id.as_str())
            .await?;

        Ok(PurchaseSettlement {
            entries,
            newly_recorded,
        })
    }

    /// Record the settlement of a refund: a `refund` debit and a
    /// `platform_fee` reversal credit, atomically. The processor fee is
    /// never reversed, so no third entry exists on the refund reference.
    ///
    /// Idempotent per refund id, same contract as purchase settlement.
    pub async fn record_refund_settlement(
        &self,
        purchase: &Purchase,
        refund_cents: i64,
        refund_id: &RefundId,
    ) -> Result<RefundSettlement, SettlementError> {
        let existing = self
            .repo
            .entries_for_reference(ReferenceType::Refund, refund_id.as_str())
            .await?;
        if !existing.is_empty() {
            info!(refund_id = %refund_id, "refund already settled, returning existing entries");
            let reversal = existing
                .iter()
                .find(|e| e.entry_type == EntryType::PlatformFee)
                .map(|e| e.amount.cents())
                .unwrap_or(0);
            return Ok(RefundSettlement {
                entries: existing,
                platform_fee_reversal_cents: reversal,
                newly_recorded: false,
            });
        }

        if self
            .repo
            .find_owner_account(&purchase.owner_account_id)
            .await?
            .is_none()
        {
            return Err(SettlementError::OwnerAccountNotFound(
                purchase.owner_account_id.clone(),
            ));
        }

        if self.repo.get_purchase(&purchase.id).await?.is_none() {
            return Err(SettlementError::Validation {
                reference_id: refund_id.to_string(),
                reason: format!("purchase {} has no recorded settlement", purchase.id),
            });
        }

        let (prior_refunded, prior_reversed) = self.repo.refund_totals(&purchase.id).await?;

        let reversal = reverse_platform_fee(
            purchase.gross.cents(),
            purchase.platform_fee.cents(),
            prior_refunded,
            prior_reversed,
            refund_cents,
        )?;

        let currency = purchase.gross.currency().clone();
        let refund = Refund {
            id: refund_id.clone(),
            purchase_id: purchase.id.clone(),
            amount: Money::new(refund_cents, currency.clone()),
            platform_fee_reversal: Money::new(
                reversal.platform_fee_reversal_cents,
                currency.clone(),
            ),
            created_at: TimeMs::now(),
        };

        let entries = vec![
            LedgerEntry::new(
                purchase.owner_account_id.clone(),
                EntryType::Refund,
                Money::new(-refund_cents, currency.clone()),
                ReferenceType::Refund,
                refund_id.as_str(),
                format!("Refund for purchase {}", purchase.id),
            ),
            LedgerEntry::new(
                purchase.owner_account_id.clone(),
                EntryType::PlatformFee,
                Money::new(reversal.platform_fee_reversal_cents, currency),
                ReferenceType::Refund,
                refund_id.as_str(),
                format!("Platform fee reversal ({}%)", purchase.platform_fee_percent),
            ),
        ];

        let status = if prior_refunded + refund_cents == purchase.gross.cents() {
            PurchaseStatus::Refunded
        } else {
            PurchaseStatus::PartiallyRefunded
        };

        let newly_recorded = self
            .repo
            .record_refund_settlement_atomic(&refund, status, &entries)
            .await?;

        if newly_recorded {
            info!(
                refund_id = %refund_id,
                purchase_id = %purchase.id,
                refund_cents,
                platform_fee_reversal_cents = reversal.platform_fee_reversal_cents,
                "refund settlement recorded"
            );
        }

        let entries = self
            .repo
            .entries_for_reference(ReferenceType::Refund, refund_id.as_str())
            .await?;

        Ok(RefundSettlement {
            entries,
            platform_fee_reversal_cents: reversal.platform_fee_reversal_cents,
            newly_recorded,
        })
    }

    fn validate_purchase(
        &self,
        purchase: &Purchase,
        split: &FeeSplit,
        actual_processor_fee_cents: Option<i64>,
    ) -> Result<(), SettlementError> {
        let reject = |reason: String| {
            Err(SettlementError::Validation {
                reference_id: purchase.id.to_string(),
                reason,
            })
        };

        if !split.is_balanced() {
            return reject(format!(
                "split does not balance: {} + {} + {} != {}",
                split.platform_fee_cents,
                split.processor_fee_cents,
                split.owner_net_cents,
                split.gross_cents
            ));
        }
        if split.gross_cents != purchase.gross.cents() {
            return reject(format!(
                "split gross {} does not match purchase gross {}",
                split.gross_cents,
                purchase.gross.cents()
            ));
        }
        if split.owner_net_cents < 0 {
            return reject(format!(
                "owner net is negative ({}); gross does not cover the fees",
                split.owner_net_cents
            ));
        }
        if let Some(actual) = actual_processor_fee_cents {
            if actual < 0 {
                return reject(format!("actual processor fee is negative ({})", actual));
            }
        }
        Ok(())
    }
}
