//! # Shopify REST Client
//!
//! An async client for the Shopify Admin REST API with call-limit aware
//! throttling, cursor pagination and HMAC validation for OAuth callbacks and
//! webhooks.
//!
//! ## Overview
//!
//! - Type-safe configuration via [`ClientConfig`] and [`ClientConfigBuilder`]
//! - Validated newtypes for credentials, shop domains and API versions
//! - Private app (key and password) and public app (access token) credentials
//! - A [`RestClient`] with `get`, `post`, `put` and `delete`
//! - Cursor pagination driven by the `Link` response header
//! - A [`ResourcePager`] that streams items across pages
//! - Throttling once the call budget reaches 80%
//! - OAuth installation helpers in [`auth::oauth`]
//! - Webhook signature validation in [`webhooks`]
//!
//! ## Quick Start
//!
//! ```rust
//! use shopify_client::{
//!     ApiKey, ApiPassword, ApiSecretKey, ApiVersion, ClientConfig, PrivateAppAuth, RestClient,
//!     ShopDomain,
//! };
//!
//! let config = ClientConfig::builder()
//!     .shop(ShopDomain::new("my-store").unwrap())
//!     .api_version("2024-10".parse::<ApiVersion>().unwrap())
//!     .build()
//!     .unwrap();
//!
//! let auth = PrivateAppAuth::new(
//!     ApiKey::new("key").unwrap(),
//!     ApiPassword::new("password").unwrap(),
//!     ApiSecretKey::new("secret").unwrap(),
//! );
//!
//! let client = RestClient::new(&config, auth).unwrap();
//! assert_eq!(client.base_url().path(), "/admin/api/2024-10/");
//! ```
//!
//! ## Making Requests
//!
//! ```rust,ignore
//! use serde_json::json;
//! use shopify_client::RequestOptions;
//!
//! let products = client
//!     .get("products", Some(RequestOptions::new().query_param("limit", 50)))
//!     .await?;
//!
//! client
//!     .put("products/632910392", json!({"product": {"title": "New title"}}), None)
//!     .await?;
//!
//! if client.call_limit_reached() {
//!     // the next call will wait before it is sent
//! }
//! ```
//!
//! ## Pagination
//!
//! ```rust,ignore
//! let mut pager = client.paginate("orders", Some(1_000), RequestOptions::new());
//! while let Some(order) = pager.next_item().await? {
//!     println!("{}", order["id"]);
//! }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: all newtypes validate on construction
//! - **No automatic retries**: a failed call is reported, never resent
//! - **Async-first**: designed for use with the Tokio runtime

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod webhooks;

// Re-export public types at crate root for convenience
pub use auth::{AuthScopes, AuthStrategy, PrivateAppAuth, PublicAppAuth};
pub use config::{
    AccessToken, ApiKey, ApiPassword, ApiSecretKey, ApiVersion, ClientConfig,
    ClientConfigBuilder, ShopDomain,
};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    ApiCallLimit, ErrorSet, HttpError, HttpMethod, HttpResponse, MissingScopeError,
    RateLimiter, RequestFailedError, RequestOptions, ResourcePager, RestClient, RestError,
    TransportError,
};

pub use auth::oauth::OAuthError;
pub use webhooks::{HmacValidator, WebhookError};
