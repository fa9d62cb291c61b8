//! Pure, deterministic settlement math. No I/O and no ambient
//! configuration; fee rates and schedules arrive as call-time parameters.

pub mod reversal;
pub mod split;

pub use reversal::{reverse_platform_fee, FeeReversal, ReversalError};
pub use split::{split, FeeSplit, ProcessorFeeSchedule, SplitError};
