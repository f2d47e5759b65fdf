use std::time::Duration;

/// Rejected retry parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidRetryPolicy {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} is too large to wait for, got {value}")]
    DelayTooLarge { field: &'static str, value: f64 },
    #[error("initial_delay_seconds must be > 0, got {0}")]
    NonPositiveInitialDelay(f64),
    #[error("max_delay_seconds ({max}) must be >= initial_delay_seconds ({initial})")]
    MaxBelowInitial { initial: f64, max: f64 },
    #[error("backoff_multiplier must be >= 1, got {0}")]
    MultiplierBelowOne(f64),
}

/// Deterministic multiplicative backoff with an inclusive cap. No jitter.
///
/// Immutable once built; all fields are validated by [`RetryPolicy::new`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay_secs: f64,
    max_delay_secs: f64,
    backoff_multiplier: f64,
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        initial_delay_secs: f64,
        max_delay_secs: f64,
        backoff_multiplier: f64,
    ) -> Result<Self, InvalidRetryPolicy> {
        if max_attempts == 0 {
            return Err(InvalidRetryPolicy::ZeroAttempts);
        }
        for (field, value) in [
            ("initial_delay_seconds", initial_delay_secs),
            ("max_delay_seconds", max_delay_secs),
            ("backoff_multiplier", backoff_multiplier),
        ] {
            if !value.is_finite() {
                return Err(InvalidRetryPolicy::NotFinite { field, value });
            }
        }
        if initial_delay_secs <= 0.0 {
            return Err(InvalidRetryPolicy::NonPositiveInitialDelay(initial_delay_secs));
        }
        if max_delay_secs < initial_delay_secs {
            return Err(InvalidRetryPolicy::MaxBelowInitial {
                initial: initial_delay_secs,
                max: max_delay_secs,
            });
        }
        if backoff_multiplier < 1.0 {
            return Err(InvalidRetryPolicy::MultiplierBelowOne(backoff_multiplier));
        }
        // Every computed delay is clamped to max_delay_secs, so it bounds them all.
        if Duration::try_from_secs_f64(max_delay_secs).is_err() {
            return Err(InvalidRetryPolicy::DelayTooLarge {
                field: "max_delay_seconds",
                value: max_delay_secs,
            });
        }
        Ok(Self {
            max_attempts,
            initial_delay_secs,
            max_delay_secs,
            backoff_multiplier,
        })
    }

    /// Maximum number of launch calls (including the first).
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn initial_delay_secs(&self) -> f64 {
        self.initial_delay_secs
    }

    pub fn max_delay_secs(&self) -> f64 {
        self.max_delay_secs
    }

    pub fn backoff_multiplier(&self) -> f64 {
        self.backoff_multiplier
    }

    /// Next wait in seconds. `None` means no wait has happened yet.
    ///
    /// The multiplier is applied before clamping, so once the cap is hit the
    /// delay stays there.
    pub fn next_delay(&self, previous: Option<f64>) -> f64 {
        match previous {
            None => self.initial_delay_secs,
            Some(prev) => (prev * self.backoff_multiplier).min(self.max_delay_secs),
        }
    }

    /// Infinite sequence of waits: initial, then grown and capped.
    pub fn schedule(&self) -> impl Iterator<Item = f64> + '_ {
        std::iter::successors(Some(self.next_delay(None)), move |prev| {
            Some(self.next_delay(Some(*prev)))
        })
    }

    /// Seconds to `Duration`, saturating at `Duration::MAX`.
    pub fn delay_duration(secs: f64) -> Duration {
        Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
    }
}
