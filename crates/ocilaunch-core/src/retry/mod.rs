//! Capacity retry engine.
//!
//! Classifies provider failures (capacity vs fatal), computes the backoff
//! schedule, and runs the attempt loop with cancellation so the CLI and
//! tests share one policy.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{
    classify, classify_message, CapacityPatterns, Classification, CAPACITY_PATTERNS_VERSION,
    DEFAULT_CAPACITY_PATTERNS,
};
pub use error::ProviderError;
pub use policy::{InvalidRetryPolicy, RetryPolicy};
pub use run::{run_launch, AttemptOutcome, LaunchOutcome, LaunchReport, RetryState};
