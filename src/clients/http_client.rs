//! The request pipeline.
//!
//! [`HttpClient`] issues exactly one HTTP call per
//! [`request`](HttpClient::request) and normalizes the outcome. It owns the
//! per-client mutable state: the last response, the error flag, and the
//! call-limit throttle.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde_json::Value;
use url::Url;

use crate::auth::AuthStrategy;
use crate::clients::errors::{ErrorSet, HttpError, TransportError};
use crate::clients::http_request::{HttpMethod, RequestOptions};
use crate::clients::http_response::{ApiCallLimit, HttpResponse};
use crate::clients::rate_limit::RateLimiter;
use crate::config::ClientConfig;
use crate::error::ConfigError;

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP client bound to one shop and one set of credentials.
///
/// The client handles:
/// - Base URL construction, including user-info credentials in direct-auth mode
/// - Default headers (User-Agent, configured defaults, auth headers)
/// - Call-limit throttling before dispatch
/// - Continuation-token query restriction
/// - Error classification
///
/// # Concurrency
///
/// Every call takes `&mut self`: one instance serves one request at a time.
/// Share an instance across tasks only behind your own `Mutex`.
pub struct HttpClient<A> {
    client: reqwest::Client,
    base_url: Url,
    default_headers: BTreeMap<String, String>,
    json: bool,
    auth: A,
    rate_limiter: RateLimiter,
    last_response: Option<HttpResponse>,
    has_errors: bool,
    last_errors: Option<ErrorSet>,
}

impl<A: AuthStrategy> fmt::Debug for HttpClient<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &redacted(&self.base_url))
            .field("json", &self.json)
            .field("auth", &self.auth)
            .field("rate_limiter", &self.rate_limiter)
            .field("has_errors", &self.has_errors)
            .finish_non_exhaustive()
    }
}

fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    if url.password().is_some() {
        let _ = url.set_password(Some("*****"));
    }
    url.to_string()
}

impl<A: AuthStrategy> HttpClient<A> {
    /// Creates a client for the configured shop.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiHost`] if the base URL cannot carry
    /// the credentials, or the transport cannot be initialized.
    pub fn new(config: &ClientConfig, auth: A) -> Result<Self, ConfigError> {
        let base_url = build_base_url(config, &auth)?;

        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}Shopify REST Client v{SDK_VERSION} | Rust {rust_version}");

        let mut default_headers = BTreeMap::new();
        default_headers.insert("user-agent".to_string(), user_agent);
        for (key, value) in config.default_headers() {
            default_headers.insert(key.clone(), value.clone());
        }
        auth.apply_headers(&mut default_headers);

        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ConfigError::InvalidApiHost {
            url: format!("{}: {e}", redacted(&base_url)),
        })?;

        let (min_delay, max_delay) = config.rate_limit_delay();

        Ok(Self {
            client,
            base_url,
            default_headers,
            json: config.json(),
            auth,
            rate_limiter: RateLimiter::new(config.rate_limit_enabled(), min_delay, max_delay)?,
            last_response: None,
            has_errors: false,
            last_errors: None,
        })
    }

    /// Returns the admin root every resource path is resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the headers sent with every request.
    #[must_use]
    pub const fn default_headers(&self) -> &BTreeMap<String, String> {
        &self.default_headers
    }

    /// Returns the credentials in use.
    #[must_use]
    pub const fn auth(&self) -> &A {
        &self.auth
    }

    /// Returns the most recent response, including failed ones.
    ///
    /// `None` before the first call and after a transport failure.
    #[must_use]
    pub const fn last_response(&self) -> Option<&HttpResponse> {
        self.last_response.as_ref()
    }

    /// Returns `true` if the most recent call failed with a response.
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Returns the [`ErrorSet`] of the most recent failed call.
    #[must_use]
    pub const fn errors(&self) -> Option<&ErrorSet> {
        self.last_errors.as_ref()
    }

    /// Returns the throttle state.
    #[must_use]
    pub const fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Returns the last observed call-limit state.
    #[must_use]
    pub const fn api_call_limit(&self) -> ApiCallLimit {
        self.rate_limiter.state()
    }

    /// Sends one request for `path`, which is resolved against
    /// [`base_url`](Self::base_url) as given.
    ///
    /// Merges headers, throttles if the previous response asked for it,
    /// restricts the query when a `page_info` token is present, dispatches
    /// and classifies the outcome.
    ///
    /// # Errors
    ///
    /// - [`HttpError::Transport`] if no response was received
    /// - [`HttpError::MissingScope`] if the API reports an ungranted scope
    /// - [`HttpError::RequestFailed`] for any other non-2xx response
    pub async fn request(
        &mut self,
        method: HttpMethod,
        path: &str,
        options: &RequestOptions,
    ) -> Result<HttpResponse, HttpError> {
        let url = self.resolve(path);

        let mut headers = self.default_headers.clone();
        for (key, value) in options.headers() {
            headers.insert(key.clone(), value.clone());
        }
        if self.json && !headers.contains_key("accept") {
            headers.insert("accept".to_string(), JSON_CONTENT_TYPE.to_string());
        }
        if options.body_value().is_some() && !headers.contains_key("content-type") {
            headers.insert("content-type".to_string(), JSON_CONTENT_TYPE.to_string());
        }

        self.rate_limiter.throttle().await;

        let query = options.dispatched_query();
        if query.len() != options.query().len() {
            tracing::debug!(
                dropped = options.query().len() - query.len(),
                "Restricted query parameters alongside page_info"
            );
        }

        let mut builder = self.client.request(method.into(), url);
        for (key, value) in &headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(body) = options.body_value() {
            builder = builder.body(body.to_string());
        }
        if let Some(timeout) = options.timeout_value() {
            builder = builder.timeout(timeout);
        }

        tracing::debug!(%method, path, "Dispatching Admin API request");

        let res = match builder.send().await {
            Ok(res) => res,
            Err(source) => {
                self.last_response = None;
                return Err(TransportError {
                    method,
                    resource: path.to_string(),
                    options: options.to_string(),
                    source,
                }
                .into());
            }
        };

        let code = res.status().as_u16();
        let res_headers = Self::parse_response_headers(res.headers());
        let body_text = match res.text().await {
            Ok(text) => text,
            Err(source) => {
                self.last_response = None;
                return Err(TransportError {
                    method,
                    resource: path.to_string(),
                    options: options.to_string(),
                    source,
                }
                .into());
            }
        };
        let response = HttpResponse::new(code, res_headers, self.decode_body(body_text));

        if let Some(reason) = response.deprecation_reason() {
            tracing::warn!(
                "Deprecated request to Shopify API at {}, received reason: {}",
                path,
                reason
            );
        }

        self.rate_limiter.update(&response);
        self.last_response = Some(response.clone());

        if response.is_ok() {
            self.has_errors = false;
            self.last_errors = None;
            return Ok(response);
        }

        self.has_errors = true;
        self.last_errors = ErrorSet::from_body(&response.body);
        tracing::debug!(code, path, "Admin API request failed");
        Err(HttpError::from_failed_response(response))
    }

    fn resolve(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!("{}{}", self.base_url.path(), path.trim_start_matches('/'));
        url.set_path(&joined);
        url
    }

    fn decode_body(&self, body_text: String) -> Value {
        if !self.json {
            return Value::String(body_text);
        }
        if body_text.trim().is_empty() {
            return serde_json::json!({});
        }
        serde_json::from_str(&body_text).unwrap_or(Value::String(body_text))
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}

/// Builds `https://[key:password@]{shop}/admin/[api/{version}/]`.
fn build_base_url<A: AuthStrategy>(config: &ClientConfig, auth: &A) -> Result<Url, ConfigError> {
    let origin = match config.api_host() {
        Some(host) => host.clone(),
        None => {
            let raw = format!("https://{}/", config.shop().as_ref());
            Url::parse(&raw).map_err(|_| ConfigError::InvalidApiHost { url: raw })?
        }
    };

    let path = config.api_version().map_or_else(
        || "/admin/".to_string(),
        |version| format!("/admin/api/{version}/"),
    );

    let mut url = origin;
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);

    if let Some((user, password)) = auth.url_credentials() {
        let origin = url.origin().ascii_serialization();
        let invalid = |()| ConfigError::InvalidApiHost {
            url: origin.clone(),
        };
        url.set_username(user).map_err(invalid)?;
        url.set_password(Some(password)).map_err(invalid)?;
    }

    Ok(url)
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient<crate::auth::PublicAppAuth>>();
};
