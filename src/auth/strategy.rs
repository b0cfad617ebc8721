//! Credential strategies for the REST client.
//!
//! A client is parameterized by one [`AuthStrategy`]. The strategy decides
//! how credentials reach the API on each call:
//!
//! - [`PrivateAppAuth`]: API key and password embedded as URL user-info
//! - [`PublicAppAuth`]: OAuth access token sent as `X-Shopify-Access-Token`
//!
//! Both carry the app's shared secret, which is only ever used as an HMAC
//! key for webhook and OAuth callback validation.

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::config::{AccessToken, ApiKey, ApiPassword, ApiSecretKey};

/// Header carrying the OAuth access token.
pub const ACCESS_TOKEN_HEADER: &str = "x-shopify-access-token";

/// Produces the credentials attached to every request.
pub trait AuthStrategy: Send + Sync + Debug {
    /// User name and password to embed in the base URL, if any.
    fn url_credentials(&self) -> Option<(&str, &str)>;

    /// Adds authentication headers. Keys must be lower-cased.
    fn apply_headers(&self, headers: &mut BTreeMap<String, String>);

    /// The shared secret used for HMAC validation.
    fn shared_secret(&self) -> &ApiSecretKey;
}

/// Direct-auth credentials of a private app.
///
/// # Example
///
/// ```rust
/// use shopify_client::{ApiKey, ApiPassword, ApiSecretKey, AuthStrategy, PrivateAppAuth};
///
/// let auth = PrivateAppAuth::new(
///     ApiKey::new("key").unwrap(),
///     ApiPassword::new("password").unwrap(),
///     ApiSecretKey::new("secret").unwrap(),
/// );
/// assert_eq!(auth.url_credentials(), Some(("key", "password")));
/// ```
#[derive(Clone, Debug)]
pub struct PrivateAppAuth {
    api_key: ApiKey,
    password: ApiPassword,
    shared_secret: ApiSecretKey,
}

impl PrivateAppAuth {
    /// Creates private app credentials.
    #[must_use]
    pub const fn new(api_key: ApiKey, password: ApiPassword, shared_secret: ApiSecretKey) -> Self {
        Self {
            api_key,
            password,
            shared_secret,
        }
    }

    /// Returns the API key.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }
}

impl AuthStrategy for PrivateAppAuth {
    fn url_credentials(&self) -> Option<(&str, &str)> {
        Some((self.api_key.as_ref(), self.password.as_ref()))
    }

    fn apply_headers(&self, _headers: &mut BTreeMap<String, String>) {}

    fn shared_secret(&self) -> &ApiSecretKey {
        &self.shared_secret
    }
}

/// Delegated-auth credentials of a public app, obtained through OAuth.
///
/// See [`request_access_token`](crate::auth::oauth::request_access_token)
/// for the exchange that produces one.
#[derive(Clone, Debug)]
pub struct PublicAppAuth {
    api_key: ApiKey,
    shared_secret: ApiSecretKey,
    access_token: AccessToken,
}

impl PublicAppAuth {
    /// Creates public app credentials from an already issued token.
    #[must_use]
    pub const fn new(
        api_key: ApiKey,
        shared_secret: ApiSecretKey,
        access_token: AccessToken,
    ) -> Self {
        Self {
            api_key,
            shared_secret,
            access_token,
        }
    }

    /// Returns the API key (OAuth `client_id`).
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the access token.
    #[must_use]
    pub const fn access_token(&self) -> &AccessToken {
        &self.access_token
    }
}

impl AuthStrategy for PublicAppAuth {
    fn url_credentials(&self) -> Option<(&str, &str)> {
        None
    }

    fn apply_headers(&self, headers: &mut BTreeMap<String, String>) {
        headers.insert(
            ACCESS_TOKEN_HEADER.to_string(),
            self.access_token.as_ref().to_string(),
        );
    }

    fn shared_secret(&self) -> &ApiSecretKey {
        &self.shared_secret
    }
}

// Verify strategies are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PrivateAppAuth>();
    assert_send_sync::<PublicAppAuth>();
};
