//! Refresh outcome codes.

use serde::{Deserialize, Serialize};

/// Result code recorded on a bundle after each refresh attempt.
///
/// All outcomes are non-fatal: they are persisted as bundle state and logged,
/// never raised to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefreshOutcome {
    /// Never attempted
    None,
    /// Content unchanged, or anchors successfully replaced
    Success,
    /// Transport-level failure after the request was issued
    DownloadTimeout,
    /// Source unreachable or malformed
    NotFound,
    /// Content did not parse as any recognized container format
    InvalidFormat,
    /// Signed container parsed but no signer matched the configured certificate
    UnmatchedSignature,
}

impl RefreshOutcome {
    /// Whether this outcome represents a completed refresh.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl std::fmt::Display for RefreshOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::None => "NONE",
            Self::Success => "SUCCESS",
            Self::DownloadTimeout => "DOWNLOAD_TIMEOUT",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidFormat => "INVALID_BUNDLE_FORMAT",
            Self::UnmatchedSignature => "UNMATCHED_SIGNATURE",
        };
        f.write_str(s)
    }
}
