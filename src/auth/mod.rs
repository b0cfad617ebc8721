//! Authentication types for the Shopify Admin REST API.
//!
//! # Overview
//!
//! - [`AuthStrategy`]: how a client presents its credentials
//! - [`PrivateAppAuth`]: API key and password sent as URL credentials
//! - [`PublicAppAuth`]: access token sent in the `X-Shopify-Access-Token` header
//! - [`AuthScopes`]: a set of OAuth scopes
//! - [`oauth`]: installation flow for public apps
//!
//! Both strategies carry the app's shared secret, which signs OAuth callbacks
//! and webhooks.
//!
//! # Example
//!
//! ```rust
//! use shopify_client::{ApiKey, ApiPassword, ApiSecretKey, AuthStrategy, PrivateAppAuth};
//!
//! let auth = PrivateAppAuth::new(
//!     ApiKey::new("key").unwrap(),
//!     ApiPassword::new("password").unwrap(),
//!     ApiSecretKey::new("secret").unwrap(),
//! );
//! assert_eq!(auth.url_credentials(), Some(("key", "password")));
//! ```

pub mod oauth;
mod scopes;
mod strategy;

pub use scopes::AuthScopes;
pub use strategy::{AuthStrategy, PrivateAppAuth, PublicAppAuth, ACCESS_TOKEN_HEADER};
