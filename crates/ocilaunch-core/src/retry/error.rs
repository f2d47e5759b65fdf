//! Provider error type surfaced by a failed launch attempt.

use std::fmt;

/// Error returned by a single launch attempt.
/// Carries the provider's message and, when the provider reported one, its machine code.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProviderError {
    /// Human-readable message as reported by the provider.
    pub message: String,
    /// Machine code (e.g. `NotAuthorizedOrNotFound`, `InternalError`).
    pub code: Option<String>,
    /// HTTP status of the failed call, if known.
    pub status: Option<u16>,
    /// Request id for support tickets.
    pub opc_request_id: Option<String>,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, self.status) {
            (Some(code), Some(status)) => write!(f, "{} ({}, HTTP {})", self.message, code, status),
            (Some(code), None) => write!(f, "{} ({})", self.message, code),
            (None, Some(status)) => write!(f, "{} (HTTP {})", self.message, status),
            (None, None) => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ProviderError {}
