//! OAuth error types.
//!
//! # Example
//!
//! ```rust
//! use shopify_client::auth::oauth::OAuthError;
//!
//! let error = OAuthError::MissingParameter { name: "code" };
//! assert!(error.to_string().contains("code"));
//! ```

use thiserror::Error;

/// Errors raised while building an authorize URL, validating a callback,
/// or exchanging an authorization code.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// A required callback parameter is absent or empty.
    #[error("OAuth callback is missing required parameter '{name}'")]
    MissingParameter {
        /// The missing parameter.
        name: &'static str,
    },

    /// The callback `hmac` does not match the recomputed signature.
    ///
    /// The callback must not be processed any further.
    #[error("OAuth callback signature is invalid")]
    InvalidSignature,

    /// The callback `state` does not match the value issued with the
    /// authorize URL.
    #[error("State parameter mismatch: expected '{expected}', received '{received}'")]
    StateMismatch {
        /// The state that was issued.
        expected: String,
        /// The state found in the callback.
        received: String,
    },

    /// The redirect URI is not an absolute URL.
    #[error("Invalid redirect URI '{uri}'")]
    InvalidRedirectUri {
        /// The rejected URI.
        uri: String,
    },

    /// The access token endpoint rejected the exchange or returned an
    /// unusable body.
    #[error("Token exchange failed with status {status}: {message}")]
    TokenExchangeFailed {
        /// HTTP status, or 0 when no response was received.
        status: u16,
        /// Response body or transport error text.
        message: String,
    },
}

// Verify OAuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OAuthError>();
};
