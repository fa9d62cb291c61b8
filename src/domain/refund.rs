//! Refund: one reversal event against a purchase. May be partial.

use crate::domain::{Money, PurchaseId, RefundId, TimeMs};
use serde::{Deserialize, Serialize};

/// A reversal against a purchase. The platform fee is reversed pro rata;
/// the processor fee is never reversed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub id: RefundId,
    pub purchase_id: PurchaseId,
    /// Amount returned to the buyer; 0 < amount <= gross minus prior
    /// refunds.
    pub amount: Money,
    pub platform_fee_reversal: Money,
    pub created_at: TimeMs,
}
