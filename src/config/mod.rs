//! Client configuration.
//!
//! # Overview
//!
//! - [`ClientConfig`]: per-client settings (shop, API version, JSON mode,
//!   call-limit throttling, timeouts, default headers)
//! - [`ClientConfigBuilder`]: validating builder for [`ClientConfig`]
//! - [`ApiKey`], [`ApiPassword`], [`ApiSecretKey`], [`AccessToken`]: credential newtypes
//! - [`ShopDomain`]: a validated `*.myshopify.com` domain
//! - [`ApiVersion`]: the Admin API version segment
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use shopify_client::{ApiVersion, ClientConfig, ShopDomain};
//!
//! let config = ClientConfig::builder()
//!     .shop(ShopDomain::new("my-store").unwrap())
//!     .api_version(ApiVersion::latest())
//!     .rate_limit_delay(Duration::from_secs(3), Duration::from_secs(10))
//!     .timeout(Duration::from_secs(30))
//!     .build()
//!     .unwrap();
//!
//! assert!(config.rate_limit_enabled());
//! assert!(config.json());
//! ```

mod newtypes;
mod version;

pub use newtypes::{AccessToken, ApiKey, ApiPassword, ApiSecretKey, ShopDomain};
pub use version::ApiVersion;

use std::collections::BTreeMap;
use std::time::Duration;

use url::Url;

use crate::clients::check_delay_bounds;
use crate::error::ConfigError;

/// Default lower bound of the throttle sleep.
pub const DEFAULT_RATE_LIMIT_MIN_DELAY: Duration = Duration::from_secs(3);

/// Default upper bound of the throttle sleep.
pub const DEFAULT_RATE_LIMIT_MAX_DELAY: Duration = Duration::from_secs(10);

/// Settings shared by every request a client issues.
///
/// Credentials are not part of the configuration; they live in the
/// [`AuthStrategy`](crate::auth::AuthStrategy) handed to the client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    shop: ShopDomain,
    api_version: Option<ApiVersion>,
    api_host: Option<Url>,
    json: bool,
    rate_limit_enabled: bool,
    rate_limit_delay: (Duration, Duration),
    connect_timeout: Option<Duration>,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
    default_headers: BTreeMap<String, String>,
}

impl ClientConfig {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the shop domain.
    #[must_use]
    pub const fn shop(&self) -> &ShopDomain {
        &self.shop
    }

    /// Returns the API version, or `None` for unversioned `/admin/` paths.
    #[must_use]
    pub const fn api_version(&self) -> Option<&ApiVersion> {
        self.api_version.as_ref()
    }

    /// Returns the host override, if configured.
    ///
    /// When set, requests go to this scheme/host/port instead of
    /// `https://{shop}`.
    #[must_use]
    pub const fn api_host(&self) -> Option<&Url> {
        self.api_host.as_ref()
    }

    /// Returns whether JSON mode is enabled.
    #[must_use]
    pub const fn json(&self) -> bool {
        self.json
    }

    /// Returns whether call-limit throttling is enabled.
    #[must_use]
    pub const fn rate_limit_enabled(&self) -> bool {
        self.rate_limit_enabled
    }

    /// Returns the `(min, max)` bounds of the throttle sleep.
    #[must_use]
    pub const fn rate_limit_delay(&self) -> (Duration, Duration) {
        self.rate_limit_delay
    }

    /// Returns the transport connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    /// Returns the overall request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the headers added to every request. Keys are lower-cased.
    #[must_use]
    pub const fn default_headers(&self) -> &BTreeMap<String, String> {
        &self.default_headers
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for [`ClientConfig`].
///
/// Only `shop` is required.
///
/// # Defaults
///
/// - `api_version`: [`ApiVersion::latest()`]
/// - `json`: `true`
/// - `rate_limit_enabled`: `true`
/// - `rate_limit_delay`: 3s to 10s
/// - timeouts: transport defaults
#[derive(Debug)]
pub struct ClientConfigBuilder {
    shop: Option<ShopDomain>,
    api_version: Option<ApiVersion>,
    api_host: Option<String>,
    json: bool,
    rate_limit_enabled: bool,
    rate_limit_delay: (Duration, Duration),
    connect_timeout: Option<Duration>,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
    default_headers: BTreeMap<String, String>,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self {
            shop: None,
            api_version: Some(ApiVersion::latest()),
            api_host: None,
            json: true,
            rate_limit_enabled: true,
            rate_limit_delay: (DEFAULT_RATE_LIMIT_MIN_DELAY, DEFAULT_RATE_LIMIT_MAX_DELAY),
            connect_timeout: None,
            timeout: None,
            user_agent_prefix: None,
            default_headers: BTreeMap::new(),
        }
    }
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the shop domain (required).
    #[must_use]
    pub fn shop(mut self, shop: ShopDomain) -> Self {
        self.shop = Some(shop);
        self
    }

    /// Sets the API version used in the `/admin/api/{version}/` prefix.
    #[must_use]
    pub const fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Drops the version segment so paths resolve under plain `/admin/`.
    #[must_use]
    pub const fn unversioned(mut self) -> Self {
        self.api_version = None;
        self
    }

    /// Routes requests to another host (a proxy, or a local mock server).
    ///
    /// Validated in [`build`](Self::build).
    #[must_use]
    pub fn api_host(mut self, url: impl Into<String>) -> Self {
        self.api_host = Some(url.into());
        self
    }

    /// Enables or disables JSON mode.
    #[must_use]
    pub const fn json(mut self, enabled: bool) -> Self {
        self.json = enabled;
        self
    }

    /// Enables or disables call-limit throttling.
    #[must_use]
    pub const fn rate_limit_enabled(mut self, enabled: bool) -> Self {
        self.rate_limit_enabled = enabled;
        self
    }

    /// Sets the bounds of the randomized throttle sleep.
    ///
    /// Validated in [`build`](Self::build): both bounds must be positive and
    /// `min <= max`.
    #[must_use]
    pub const fn rate_limit_delay(mut self, min: Duration, max: Duration) -> Self {
        self.rate_limit_delay = (min, max);
        self
    }

    /// Sets the transport connect timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the overall request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn default_header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.default_headers
            .insert(key.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Builds the [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingRequiredField`] if `shop` is not set
    /// - [`ConfigError::InvalidApiHost`] if the host override is not an
    ///   absolute http(s) URL
    /// - [`ConfigError::InvalidRateLimitDelay`] if the delay bounds are zero
    ///   or reversed
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let shop = self
            .shop
            .ok_or(ConfigError::MissingRequiredField { field: "shop" })?;

        let api_host = self.api_host.map(|raw| parse_api_host(&raw)).transpose()?;

        let (min, max) = self.rate_limit_delay;
        check_delay_bounds(min, max)?;

        Ok(ClientConfig {
            shop,
            api_version: self.api_version,
            api_host,
            json: self.json,
            rate_limit_enabled: self.rate_limit_enabled,
            rate_limit_delay: (min, max),
            connect_timeout: self.connect_timeout,
            timeout: self.timeout,
            user_agent_prefix: self.user_agent_prefix,
            default_headers: self.default_headers,
        })
    }
}

fn parse_api_host(raw: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidApiHost {
        url: raw.to_string(),
    };
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(url)
}
