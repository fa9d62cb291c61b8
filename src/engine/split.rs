//! Fee split calculator: gross amount -> platform fee / processor fee /
//! owner net.

use crate::domain::round_half_up;
use thiserror::Error;

/// The processor's published percentage-plus-fixed fee model, used to
/// estimate its fee at checkout time, before the charge has settled.
/// The actual fee reported at settlement may differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorFeeSchedule {
    /// Percentage component in basis points (290 = 2.9%).
    pub percent_bps: u32,
    /// Fixed component in minor units.
    pub fixed_cents: i64,
}

impl Default for ProcessorFeeSchedule {
    fn default() -> Self {
        ProcessorFeeSchedule {
            percent_bps: 290,
            fixed_cents: 30,
        }
    }
}

/// Three-way split of a gross amount. All fields are minor units and sum
/// exactly: platform + processor + owner net == gross.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    pub gross_cents: i64,
    /// Rate the platform fee was computed with.
    pub platform_fee_percent: u8,
    pub platform_fee_cents: i64,
    pub processor_fee_cents: i64,
    /// May be negative for very small gross amounts; callers must reject
    /// a negative owner net at checkout rather than clamping it.
    pub owner_net_cents: i64,
}

impl FeeSplit {
    pub fn is_balanced(&self) -> bool {
        self.platform_fee_cents + self.processor_fee_cents + self.owner_net_cents
            == self.gross_cents
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SplitError {
    #[error("gross amount must be >= 0, got {0}")]
    NegativeGross(i64),
    #[error("platform fee percent must be within [0, 100], got {0}")]
    PercentOutOfRange(u8),
}

/// Compute the three-way split for a gross amount.
///
/// The platform fee is round-half-up on the exact rational
/// gross * percent / 100; the processor estimate is round-half-up on
/// gross * bps / 10_000 plus the fixed component; owner net is the exact
/// remainder, so any rounding residue lands there and the split always
/// balances. A zero gross yields an all-zero split.
pub fn split(
    gross_cents: i64,
    platform_fee_percent: u8,
    processor: &ProcessorFeeSchedule,
) -> Result<FeeSplit, SplitError> {
    if gross_cents < 0 {
        return Err(SplitError::NegativeGross(gross_cents));
    }
    if platform_fee_percent > 100 {
        return Err(SplitError::PercentOutOfRange(platform_fee_percent));
    }

    if gross_cents == 0 {
        return Ok(FeeSplit {
            gross_cents: 0,
            platform_fee_percent,
            platform_fee_cents: 0,
            processor_fee_cents: 0,
            owner_net_cents: 0,
        });
    }

    let platform_fee_cents = round_half_up(
        gross_cents as i128 * platform_fee_percent as i128,
        100,
    );
    let processor_fee_cents =
        round_half_up(gross_cents as i128 * processor.percent_bps as i128, 10_000)
            + processor.fixed_cents;
    let owner_net_cents = gross_cents - platform_fee_cents - processor_fee_cents;

    Ok(FeeSplit {
        gross_cents,
        platform_fee_percent,
        platform_fee_cents,
        processor_fee_cents,
        owner_net_cents,
    })
}
