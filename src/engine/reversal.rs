//! Pro-rata platform fee reversal for refunds.

use crate::domain::round_half_up;
use thiserror::Error;

/// Outcome of the reversal computation for one refund event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeReversal {
    pub refund_cents: i64,
    pub platform_fee_reversal_cents: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReversalError {
    #[error("refund amount must be > 0, got {0}")]
    NonPositiveRefund(i64),
    #[error("refund of {requested} exceeds remaining refundable balance {remaining}")]
    ExceedsRemaining { requested: i64, remaining: i64 },
}

/// Compute the platform fee reversal for one refund.
///
/// Uses the same round-half-up rule as the original fee computation. The
/// reversal is capped at the fee not yet reversed, and the refund that
/// brings cumulative refunds to the original gross takes exactly the
/// remaining fee, so reversals across any refund sequence total the
/// original platform fee. The processor fee is never reversed.
pub fn reverse_platform_fee(
    gross_cents: i64,
    platform_fee_cents: i64,
    prior_refunded_cents: i64,
    prior_reversal_cents: i64,
    refund_cents: i64,
) -> Result<FeeReversal, ReversalError> {
    if refund_cents <= 0 {
        return Err(ReversalError::NonPositiveRefund(refund_cents));
    }
    let remaining = gross_cents - prior_refunded_cents;
    if refund_cents > remaining {
        return Err(ReversalError::ExceedsRemaining {
            requested: refund_cents,
            remaining,
        });
    }

    let reversible = platform_fee_cents - prior_reversal_cents;
    let platform_fee_reversal_cents = if prior_refunded_cents + refund_cents == gross_cents {
        reversible
    } else {
        round_half_up(
            platform_fee_cents as i128 * refund_cents as i128,
            gross_cents as i128,
        )
        .min(reversible)
    };

    Ok(FeeReversal {
        refund_cents,
        platform_fee_reversal_cents,
    })
}
