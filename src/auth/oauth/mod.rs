//! OAuth authorization code grant for public apps.
//!
//! 1. [`authorization_url`]: send the merchant to Shopify with a fresh
//!    [`generate_state`] nonce.
//! 2. [`validate_callback`]: check the `hmac` and `state` of the redirect.
//! 3. [`request_access_token`]: trade the `code` for a [`PublicAppAuth`].
//!
//! Callback signatures are hex HMAC-SHA256 digests, compared in constant
//! time. Webhooks use a base64 digest instead; see
//! [`webhooks`](crate::webhooks).
//!
//! [`PublicAppAuth`]: crate::PublicAppAuth

mod authorize;
mod callback;
mod error;
pub mod hmac;

pub use authorize::{authorization_url, generate_state};
pub use callback::{request_access_token, signable_string, validate_callback};
pub use error::OAuthError;
