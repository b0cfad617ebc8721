//! REST client error types.
//!
//! - [`RestError::InvalidPath`]: the resource path was rejected before dispatch
//! - [`RestError::Http`]: the call itself failed; see [`HttpError`]

use crate::clients::errors::{ErrorSet, HttpError};
use thiserror::Error;

/// Error type for REST client operations.
///
/// # Example
///
/// ```rust
/// use shopify_client::RestError;
///
/// let error = RestError::InvalidPath { path: "https://evil.example/x".to_string() };
/// assert!(error.to_string().contains("Invalid REST API path"));
/// ```
#[derive(Debug, Error)]
pub enum RestError {
    /// The resource path is empty, absolute, or carries a query string.
    #[error("Invalid REST API path: {path}")]
    InvalidPath {
        /// The rejected path.
        path: String,
    },

    /// An HTTP-level error occurred.
    #[error(transparent)]
    Http(#[from] HttpError),
}

impl RestError {
    /// Returns the HTTP status, if the API answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidPath { .. } => None,
            Self::Http(e) => e.status(),
        }
    }

    /// Returns the decoded `errors` field, if the API answered with one.
    #[must_use]
    pub const fn errors(&self) -> Option<&ErrorSet> {
        match self {
            Self::InvalidPath { .. } => None,
            Self::Http(e) => e.errors(),
        }
    }
}

// Verify RestError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RestError>();
};
