//! Per-call request options.
//!
//! [`RequestOptions`] is the configuration bag for a single call: extra
//! headers, query parameters, an optional JSON body and an optional timeout.
//! It is consumed by [`HttpClient::request`](crate::clients::HttpClient::request).

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde_json::Value;

/// Query parameter carrying the opaque continuation token.
pub const PAGE_INFO_PARAM: &str = "page_info";

/// Query parameters that may accompany a continuation token.
///
/// The API rejects a `page_info` request combined with any other filter.
pub const CURSOR_ALLOWED_PARAMS: [&str; 4] = [PAGE_INFO_PARAM, "limit", "fields", "api_feature"];

/// HTTP methods supported by the Admin REST API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP POST method for creating resources.
    Post,
    /// HTTP PUT method for updating resources.
    Put,
    /// HTTP DELETE method for removing resources.
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Delete => Self::DELETE,
        }
    }
}

/// Options for a single request.
///
/// Header names are case-insensitive and stored lower-cased. Query
/// parameters are kept in key order so the dispatched URL is deterministic.
///
/// # Example
///
/// ```rust
/// use shopify_client::RequestOptions;
/// use serde_json::json;
///
/// let options = RequestOptions::new()
///     .header("X-Custom", "1")
///     .query_param("limit", 50)
///     .query_param("vendor", "Acme")
///     .body(json!({"product": {"title": "Hat"}}));
///
/// assert_eq!(options.headers().get("x-custom"), Some(&"1".to_string()));
/// assert_eq!(options.query().get("limit"), Some(&"50".to_string()));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestOptions {
    headers: BTreeMap<String, String>,
    query: BTreeMap<String, String>,
    body: Option<Value>,
    timeout: Option<Duration>,
}

impl RequestOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header. Replaces any header with the same name, ignoring case.
    #[must_use]
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Adds one query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.insert(key.into(), value.to_string());
        self
    }

    /// Adds every pair from `params`.
    #[must_use]
    pub fn query_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Overrides the client-wide request timeout for this call.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the headers.
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Returns the query parameters as given.
    #[must_use]
    pub const fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Returns the JSON body, if any.
    #[must_use]
    pub const fn body_value(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Returns the per-call timeout, if any.
    #[must_use]
    pub const fn timeout_value(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the query that is actually sent.
    ///
    /// When a `page_info` token is present only [`CURSOR_ALLOWED_PARAMS`]
    /// survive; otherwise the query is sent unchanged.
    ///
    /// ```rust
    /// use shopify_client::RequestOptions;
    ///
    /// let options = RequestOptions::new()
    ///     .query_param("page_info", "abc")
    ///     .query_param("vendor", "x")
    ///     .query_param("limit", 10);
    ///
    /// let sent: Vec<_> = options.dispatched_query().into_keys().collect();
    /// assert_eq!(sent, vec!["limit", "page_info"]);
    /// ```
    #[must_use]
    pub fn dispatched_query(&self) -> BTreeMap<String, String> {
        if !self.query.contains_key(PAGE_INFO_PARAM) {
            return self.query.clone();
        }
        self.query
            .iter()
            .filter(|(key, _)| CURSOR_ALLOWED_PARAMS.contains(&key.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl fmt::Display for RequestOptions {
    /// Summary used in transport error messages. Header values are omitted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<&str> = self.headers.keys().map(String::as_str).collect();
        write!(
            f,
            "headers=[{}] query={:?} body={}",
            headers.join(", "),
            self.query,
            if self.body.is_some() { "json" } else { "none" }
        )
    }
}
