//! Launch loop: attempt, classify, back off, until a terminal state.

use std::fmt;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::classify::{classify, CapacityPatterns, Classification};
use super::error::ProviderError;
use super::policy::RetryPolicy;
use crate::launch::LaunchRequest;
use crate::provider::{InstanceHandle, ProviderClient};

/// Outcome of a single launch call, after classification.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Success(InstanceHandle),
    RetryableFailure { reason: String },
    FatalFailure { reason: String, code: Option<String> },
}

impl AttemptOutcome {
    pub fn from_result(
        result: Result<InstanceHandle, ProviderError>,
        patterns: &CapacityPatterns,
    ) -> Self {
        match result {
            Ok(handle) => AttemptOutcome::Success(handle),
            Err(e) => match classify(&e, patterns) {
                Classification::Retryable => AttemptOutcome::RetryableFailure { reason: e.message },
                Classification::Fatal => AttemptOutcome::FatalFailure {
                    reason: e.message,
                    code: e.code,
                },
            },
        }
    }
}

/// Terminal result of [`run_launch`].
#[derive(Debug, Clone, PartialEq)]
pub enum LaunchOutcome {
    Succeeded(InstanceHandle),
    /// Non-capacity error; reason and code exactly as the provider sent them.
    FailedFatal { reason: String, code: Option<String> },
    /// Every attempt hit a capacity error.
    FailedExhausted { last_reason: String, attempts: u32 },
    /// Interrupted before the next attempt or during a backoff wait.
    Cancelled { attempts: u32 },
}

impl LaunchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LaunchOutcome::Succeeded(_))
    }
}

impl fmt::Display for LaunchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchOutcome::Succeeded(h) => write!(f, "instance launched: {}", h.id),
            LaunchOutcome::FailedFatal { reason, code: Some(code) } => {
                write!(f, "non-retryable provider error [{}]: {}", code, reason)
            }
            LaunchOutcome::FailedFatal { reason, code: None } => {
                write!(f, "non-retryable provider error: {}", reason)
            }
            LaunchOutcome::FailedExhausted { last_reason, attempts } => write!(
                f,
                "gave up after {} attempt(s) on capacity errors; last: {}",
                attempts, last_reason
            ),
            LaunchOutcome::Cancelled { attempts } => {
                write!(f, "cancelled after {} attempt(s)", attempts)
            }
        }
    }
}

/// What the loop did, for callers and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchReport {
    pub outcome: LaunchOutcome,
    /// Number of provider calls issued.
    pub attempts: u32,
    /// Backoff waits that fully elapsed, in order.
    pub waits: Vec<Duration>,
}

/// Mutable loop state; lives only for one `run_launch` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryState {
    /// 1-based index of the attempt about to be (or just) issued.
    pub attempt: u32,
    /// Last backoff wait in seconds; `None` before the first wait.
    pub current_delay: Option<f64>,
}

impl RetryState {
    fn new() -> Self {
        Self {
            attempt: 1,
            current_delay: None,
        }
    }
}

enum LaunchState {
    Attempting,
    WaitingBackoff { last_reason: String },
    Finished(LaunchOutcome),
}

/// Launch one instance, retrying capacity errors with backoff.
///
/// Exactly one provider call per attempt and at most one wait between two
/// attempts. Cancellation is observed before each call and during waits; an
/// in-flight call is always awaited to completion.
pub async fn run_launch<C: ProviderClient>(
    request: &LaunchRequest,
    client: &C,
    policy: &RetryPolicy,
    patterns: &CapacityPatterns,
    cancel: &CancellationToken,
) -> LaunchReport {
    let max_attempts = policy.max_attempts();
    let mut state = RetryState::new();
    let mut calls = 0u32;
    let mut waits = Vec::new();
    let mut phase = LaunchState::Attempting;

    loop {
        phase = match phase {
            LaunchState::Attempting => {
                if cancel.is_cancelled() {
                    tracing::warn!(attempt = state.attempt, "cancelled before launch attempt");
                    LaunchState::Finished(LaunchOutcome::Cancelled { attempts: calls })
                } else {
                    tracing::info!(attempt = state.attempt, max_attempts, "launching instance");
                    calls += 1;
                    let result = client.launch_instance(request).await;
                    if let Err(e) = &result {
                        tracing::debug!(attempt = state.attempt, error = ?e, "provider error");
                    }
                    match AttemptOutcome::from_result(result, patterns) {
                        AttemptOutcome::Success(handle) => {
                            tracing::info!(
                                attempt = state.attempt,
                                instance_id = %handle.id,
                                "instance launched"
                            );
                            LaunchState::Finished(LaunchOutcome::Succeeded(handle))
                        }
                        AttemptOutcome::FatalFailure { reason, code } => {
                            tracing::error!(
                                attempt = state.attempt,
                                classification = Classification::Fatal.as_str(),
                                code = code.as_deref().unwrap_or(""),
                                "non-retryable error: {}",
                                reason
                            );
                            LaunchState::Finished(LaunchOutcome::FailedFatal { reason, code })
                        }
                        AttemptOutcome::RetryableFailure { reason } => {
                            tracing::warn!(
                                attempt = state.attempt,
                                max_attempts,
                                classification = Classification::Retryable.as_str(),
                                "capacity error: {}",
                                reason
                            );
                            if state.attempt >= max_attempts {
                                tracing::error!(
                                    attempts = calls,
                                    "max attempts reached, giving up"
                                );
                                LaunchState::Finished(LaunchOutcome::FailedExhausted {
                                    last_reason: reason,
                                    attempts: calls,
                                })
                            } else {
                                LaunchState::WaitingBackoff { last_reason: reason }
                            }
                        }
                    }
                }
            }
            LaunchState::WaitingBackoff { last_reason } => {
                let delay_secs = policy.next_delay(state.current_delay);
                let delay = RetryPolicy::delay_duration(delay_secs);
                tracing::info!(
                    attempt = state.attempt,
                    classification = Classification::Retryable.as_str(),
                    delay_secs,
                    next_delay_secs = policy.next_delay(Some(delay_secs)),
                    "waiting before retry"
                );
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        tracing::warn!(
                            attempt = state.attempt,
                            last_reason = %last_reason,
                            "cancelled during backoff"
                        );
                        LaunchState::Finished(LaunchOutcome::Cancelled { attempts: calls })
                    }
                    _ = tokio::time::sleep(delay) => {
                        waits.push(delay);
                        state.current_delay = Some(delay_secs);
                        state.attempt += 1;
                        LaunchState::Attempting
                    }
                }
            }
            LaunchState::Finished(outcome) => {
                return LaunchReport {
                    outcome,
                    attempts: calls,
                    waits,
                };
            }
        };
    }
}
