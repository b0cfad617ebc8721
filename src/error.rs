//! Configuration error types.
//!
//! Every validated newtype and the [`ClientConfigBuilder`](crate::ClientConfigBuilder)
//! return `Result<T, ConfigError>` so that bad credentials or settings are
//! rejected before a client is ever constructed.
//!
//! # Example
//!
//! ```rust
//! use shopify_client::{ApiKey, ConfigError};
//!
//! let result = ApiKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiKey)));
//! ```

use thiserror::Error;

/// Errors that can occur while building client configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API key cannot be empty.
    #[error("API key cannot be empty. Please provide a valid Shopify API key.")]
    EmptyApiKey,

    /// API password cannot be empty.
    #[error("API password cannot be empty. Private apps must provide the password issued with their API key.")]
    EmptyApiPassword,

    /// Shared secret cannot be empty.
    #[error("Shared secret cannot be empty. Please provide the app's API secret key.")]
    EmptyApiSecretKey,

    /// Access token cannot be empty.
    #[error("Access token cannot be empty. Complete the OAuth exchange before building a public app client.")]
    EmptyAccessToken,

    /// Shop domain is invalid.
    #[error("Invalid shop domain '{domain}'. Expected format: 'shop-name' or 'shop-name.myshopify.com'.")]
    InvalidShopDomain {
        /// The invalid domain that was provided.
        domain: String,
    },

    /// API version is invalid.
    #[error("Invalid API version '{version}'. Expected format: 'YYYY-MM' (e.g., '2024-01') or 'unstable'.")]
    InvalidApiVersion {
        /// The invalid version string that was provided.
        version: String,
    },

    /// Scopes are invalid.
    #[error("Invalid scopes: {reason}")]
    InvalidScopes {
        /// The reason the scopes are invalid.
        reason: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// The API host override is not a usable base URL.
    #[error("Invalid API host '{url}'. Expected an absolute http(s) URL such as 'https://proxy.example.com'.")]
    InvalidApiHost {
        /// The invalid URL that was provided.
        url: String,
    },

    /// Throttle delay bounds are unusable.
    #[error("Invalid rate limit delay: {reason}")]
    InvalidRateLimitDelay {
        /// Why the bounds were rejected.
        reason: String,
    },
}
