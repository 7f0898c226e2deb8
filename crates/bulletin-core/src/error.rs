//! Error types for feed fetching.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, FeedError>;

/// Errors that can occur while fetching a feed page from the provider.
///
/// The type is `Clone` because a single failed fetch is observed by every
/// caller that was coalesced onto it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("feed request failed: {0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("feed provider returned status {0}")]
    Status(u16),

    /// The provider's payload could not be decoded.
    #[error("invalid feed payload: {0}")]
    Decode(String),
}

impl FeedError {
    /// Whether the provider reported that the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status(404))
    }
}
