//! Classify provider errors into capacity (retryable) and fatal.

use super::error::ProviderError;

/// Bumped whenever the default pattern list changes.
pub const CAPACITY_PATTERNS_VERSION: u32 = 1;

/// Phrases the provider uses when a shape is temporarily out of capacity.
pub const DEFAULT_CAPACITY_PATTERNS: [&str; 6] = [
    "out of host capacity",
    "no sufficient compute capacity",
    "insufficient capacity",
    "capacity exceeded",
    "OutOfCapacity",
    "capacity.exceeded",
];

/// Result of classifying one failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Transient capacity exhaustion; waiting may help.
    Retryable,
    /// Anything else: auth, malformed request, quota, unknown.
    Fatal,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Retryable => "capacity",
            Classification::Fatal => "fatal",
        }
    }
}

/// Ordered, case-insensitive substring matchers for capacity errors.
///
/// Patterns are lowercased once at construction so matching is a plain
/// `contains` on the lowercased haystack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityPatterns {
    lowered: Vec<String>,
}

impl CapacityPatterns {
    /// Build a pattern set from arbitrary phrases. Empty phrases are dropped
    /// since they would match every message.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lowered = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { lowered }
    }

    pub fn patterns(&self) -> &[String] {
        &self.lowered
    }

    /// True if any pattern occurs in `text`, ignoring case.
    pub fn matches(&self, text: &str) -> bool {
        let haystack = text.to_lowercase();
        self.lowered.iter().any(|p| haystack.contains(p.as_str()))
    }
}

impl Default for CapacityPatterns {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY_PATTERNS)
    }
}

/// Classify a bare message. Empty or whitespace-only messages are fatal.
pub fn classify_message(message: &str, patterns: &CapacityPatterns) -> Classification {
    if message.trim().is_empty() {
        return Classification::Fatal;
    }
    if patterns.matches(message) {
        Classification::Retryable
    } else {
        Classification::Fatal
    }
}

/// Classify a provider error by its message and, when present, its code.
pub fn classify(error: &ProviderError, patterns: &CapacityPatterns) -> Classification {
    if classify_message(&error.message, patterns) == Classification::Retryable {
        return Classification::Retryable;
    }
    match error.code.as_deref() {
        Some(code) => classify_message(code, patterns),
        None => Classification::Fatal,
    }
}
