//! The voting-period subsystem: during an ongoing period, each pilot
//! casts a single vote for the job they want the group to pursue next.

mod finalizer;
mod period;
pub mod validators;

pub use finalizer::{PeriodFinalizerFairing, PeriodFinalizers};
pub use period::{InvariantViolation, JobVote, PeriodState, VotingPeriod, VotingPeriodsDocument};
