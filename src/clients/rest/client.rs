//! REST client for the Shopify Admin API.

use std::collections::BTreeMap;

use serde_json::Value;
use url::Url;

use crate::auth::AuthStrategy;
use crate::clients::errors::ErrorSet;
use crate::clients::http_client::HttpClient;
use crate::clients::http_request::{HttpMethod, RequestOptions};
use crate::clients::http_response::{ApiCallLimit, HttpResponse};
use crate::clients::pagination::PaginationCursor;
use crate::clients::rest::errors::RestError;
use crate::clients::rest::pager::ResourcePager;
use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::webhooks::HmacValidator;

/// Admin REST API client, parameterized by its credential strategy.
///
/// Resources are addressed by path relative to the admin root
/// (`products`, `orders/450789469`, `products/1/images`); `.json` is added
/// automatically.
///
/// # Concurrency
///
/// Calls take `&mut self` because each one updates the client's state (last
/// response, call-limit estimate, pagination cursor). Wrap the client in a
/// `tokio::sync::Mutex` to share it across tasks.
///
/// # Example
///
/// ```rust,ignore
/// use shopify_client::{
///     AccessToken, ApiKey, ApiSecretKey, ClientConfig, PublicAppAuth, RestClient, ShopDomain,
/// };
/// use serde_json::json;
///
/// let config = ClientConfig::builder()
///     .shop(ShopDomain::new("my-store")?)
///     .build()?;
/// let auth = PublicAppAuth::new(
///     ApiKey::new("key")?,
///     ApiSecretKey::new("secret")?,
///     AccessToken::new("shpat_...")?,
/// );
/// let mut client = RestClient::new(&config, auth)?;
///
/// let shop = client.get("shop", None).await?;
/// let created = client
///     .post("products", json!({"product": {"title": "Hat"}}), None)
///     .await?;
///
/// let mut pager = client.paginate("products", Some(500), Default::default());
/// while let Some(product) = pager.next_item().await? {
///     println!("{}", product["title"]);
/// }
/// ```
#[derive(Debug)]
pub struct RestClient<A: AuthStrategy> {
    http: HttpClient<A>,
    cursor: Option<PaginationCursor>,
}

// Verify RestClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RestClient<crate::auth::PrivateAppAuth>>();
};

impl<A: AuthStrategy> RestClient<A> {
    /// Creates a client for the configured shop.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the base URL or transport cannot be built.
    pub fn new(config: &ClientConfig, auth: A) -> Result<Self, ConfigError> {
        Ok(Self {
            http: HttpClient::new(config, auth)?,
            cursor: None,
        })
    }

    /// Returns the admin root resource paths are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        self.http.base_url()
    }

    /// Returns the credentials in use.
    #[must_use]
    pub const fn auth(&self) -> &A {
        self.http.auth()
    }

    /// Returns a webhook validator keyed by this client's shared secret.
    #[must_use]
    pub fn webhook_validator(&self) -> HmacValidator {
        HmacValidator::new(self.http.auth().shared_secret().clone())
    }

    /// Sends one request and returns the raw response.
    ///
    /// A successful GET replaces the pagination cursor with one built from
    /// the response's `Link` header.
    ///
    /// # Errors
    ///
    /// - [`RestError::InvalidPath`] if `path` is empty, absolute, or carries
    ///   a query string
    /// - [`RestError::Http`] if the call fails
    pub async fn request(
        &mut self,
        method: HttpMethod,
        path: &str,
        options: &RequestOptions,
    ) -> Result<HttpResponse, RestError> {
        let resource = normalize_path(path)?;
        let response = self.http.request(method, &resource, options).await?;

        if method == HttpMethod::Get {
            self.cursor = Some(PaginationCursor::from_link_header(
                resource,
                response.link_header().unwrap_or_default(),
            ));
        }

        Ok(response)
    }

    /// Sends a GET and returns the decoded body.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get(
        &mut self,
        path: &str,
        options: Option<RequestOptions>,
    ) -> Result<Value, RestError> {
        let options = options.unwrap_or_default();
        Ok(self.request(HttpMethod::Get, path, &options).await?.body)
    }

    /// Sends a POST with a JSON body and returns the decoded response body.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn post(
        &mut self,
        path: &str,
        body: Value,
        options: Option<RequestOptions>,
    ) -> Result<Value, RestError> {
        let options = options.unwrap_or_default().body(body);
        Ok(self.request(HttpMethod::Post, path, &options).await?.body)
    }

    /// Sends a PUT with a JSON body and returns the decoded response body.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn put(
        &mut self,
        path: &str,
        body: Value,
        options: Option<RequestOptions>,
    ) -> Result<Value, RestError> {
        let options = options.unwrap_or_default().body(body);
        Ok(self.request(HttpMethod::Put, path, &options).await?.body)
    }

    /// Sends a DELETE and returns the decoded body (usually `{}`).
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn delete(
        &mut self,
        path: &str,
        options: Option<RequestOptions>,
    ) -> Result<Value, RestError> {
        let options = options.unwrap_or_default();
        Ok(self.request(HttpMethod::Delete, path, &options).await?.body)
    }

    // === Pagination ===

    /// Returns `true` if another page can be requested.
    ///
    /// Optimistically `true` before any GET has been made.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.cursor
            .as_ref()
            .map_or(true, PaginationCursor::has_next_page)
    }

    /// Returns `true` if a previous page can be requested.
    #[must_use]
    pub fn has_prev_page(&self) -> bool {
        self.cursor
            .as_ref()
            .is_some_and(PaginationCursor::has_prev_page)
    }

    /// Returns the query that [`next_page`](Self::next_page) will send.
    #[must_use]
    pub fn next_page_params(&self) -> Option<&BTreeMap<String, String>> {
        self.cursor.as_ref()?.next_page_params()
    }

    /// Returns the query that [`prev_page`](Self::prev_page) will send.
    #[must_use]
    pub fn prev_page_params(&self) -> Option<&BTreeMap<String, String>> {
        self.cursor.as_ref()?.prev_page_params()
    }

    /// Returns the current pagination cursor, if a GET has been made.
    #[must_use]
    pub const fn cursor(&self) -> Option<&PaginationCursor> {
        self.cursor.as_ref()
    }

    /// Fetches the next page of the last listed resource.
    ///
    /// Returns `Ok(None)` when there is no next page.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Http`] if the call fails; the cursor is left
    /// unchanged.
    pub async fn next_page(&mut self) -> Result<Option<Value>, RestError> {
        self.step(true).await
    }

    /// Fetches the previous page of the last listed resource.
    ///
    /// Returns `Ok(None)` when there is no previous page.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Http`] if the call fails; the cursor is left
    /// unchanged.
    pub async fn prev_page(&mut self) -> Result<Option<Value>, RestError> {
        self.step(false).await
    }

    async fn step(&mut self, forward: bool) -> Result<Option<Value>, RestError> {
        let Some(cursor) = self.cursor.as_ref() else {
            return Ok(None);
        };
        let params = if forward {
            cursor.next_page_params()
        } else {
            cursor.prev_page_params()
        };
        let Some(params) = params.cloned() else {
            return Ok(None);
        };
        let resource = cursor.resource().to_string();

        let options = RequestOptions::new().query_params(params);
        let response = self
            .http
            .request(HttpMethod::Get, &resource, &options)
            .await?;

        if let Some(cursor) = self.cursor.as_mut() {
            cursor.advance(response.link_header(), forward);
        }
        Ok(Some(response.body))
    }

    /// Streams every item of `resource` across pages.
    ///
    /// `max_items` caps the total number of items yielded. The page size is
    /// the `limit` in `options`, else `max_items`, else 250, clamped to
    /// `1..=250`.
    pub fn paginate(
        &mut self,
        resource: &str,
        max_items: Option<usize>,
        options: RequestOptions,
    ) -> ResourcePager<'_, A> {
        ResourcePager::new(self, resource, max_items, options)
    }

    // === State ===

    /// Returns the most recent response, including failed ones.
    #[must_use]
    pub const fn last_response(&self) -> Option<&HttpResponse> {
        self.http.last_response()
    }

    /// Returns `true` if the most recent call failed with a response.
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        self.http.has_errors()
    }

    /// Returns the [`ErrorSet`] of the most recent failed call.
    #[must_use]
    pub const fn errors(&self) -> Option<&ErrorSet> {
        self.http.errors()
    }

    /// Returns the last observed call-limit state.
    #[must_use]
    pub const fn api_call_limit(&self) -> ApiCallLimit {
        self.http.api_call_limit()
    }

    /// Returns `used / capacity` of the call budget, or 0 when unknown.
    #[must_use]
    pub fn call_limit(&self) -> f64 {
        self.http.rate_limiter().call_limit()
    }

    /// Returns `true` when the call budget is at least 80% used.
    #[must_use]
    pub fn call_limit_reached(&self) -> bool {
        self.http.rate_limiter().call_limit_reached()
    }
}

/// Normalizes a resource path to `{path}.json`.
///
/// Leading `/` and an existing `.json` suffix are stripped before `.json`
/// is appended.
fn normalize_path(path: &str) -> Result<String, RestError> {
    let invalid = || RestError::InvalidPath {
        path: path.to_string(),
    };

    if path.contains("://") || path.contains('?') {
        return Err(invalid());
    }

    let trimmed = path.trim().trim_start_matches('/');
    let trimmed = trimmed.strip_suffix(".json").unwrap_or(trimmed);

    if trimmed.is_empty() {
        return Err(invalid());
    }

    Ok(format!("{trimmed}.json"))
}
