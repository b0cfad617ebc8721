//! HTTP response types.
//!
//! [`HttpResponse`] is the raw outcome of one call: status, lower-cased
//! headers and the decoded body. [`ApiCallLimit`] is the parsed value of the
//! leaky-bucket call-limit header.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;

/// Substring identifying the call-limit header, matched case-insensitively.
pub const CALL_LIMIT_HEADER_FRAGMENT: &str = "shop-api-call-limit";

/// Usage of the shop's leaky-bucket call budget.
///
/// Parsed from the `X-Shopify-Shop-Api-Call-Limit` header, whose value is
/// `"used/capacity"`. The default (0/0) means "unknown" and never throttles.
///
/// # Example
///
/// ```rust
/// use shopify_client::ApiCallLimit;
///
/// let limit = ApiCallLimit::parse("32/40").unwrap();
/// assert_eq!(limit.used, 32);
/// assert_eq!(limit.capacity, 40);
/// assert!((limit.ratio() - 0.8).abs() < f64::EPSILON);
///
/// assert_eq!(ApiCallLimit::default().ratio(), 0.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApiCallLimit {
    /// Calls currently counted against the bucket.
    pub used: u32,
    /// Size of the bucket.
    pub capacity: u32,
}

impl ApiCallLimit {
    /// Parses a `"used/capacity"` header value.
    ///
    /// Returns `None` unless the value is exactly two unsigned integers
    /// separated by `/`.
    #[must_use]
    pub fn parse(header_value: &str) -> Option<Self> {
        let (used, capacity) = header_value.trim().split_once('/')?;
        Some(Self {
            used: used.trim().parse().ok()?,
            capacity: capacity.trim().parse().ok()?,
        })
    }

    /// Returns `used / capacity`, or 0 when the capacity is 0.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            f64::from(self.used) / f64::from(self.capacity)
        }
    }
}

/// An HTTP response from the Admin API.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers, keyed by lower-cased name (headers may repeat).
    pub headers: HashMap<String, Vec<String>>,
    /// The decoded body. An empty body decodes to `{}`.
    pub body: Value,
}

impl HttpResponse {
    /// Creates a response. Header names are lower-cased.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, body: Value) -> Self {
        let headers = headers
            .into_iter()
            .fold(HashMap::new(), |mut acc: HashMap<String, Vec<String>>, (k, v)| {
                acc.entry(k.to_ascii_lowercase()).or_default().extend(v);
                acc
            });
        Self {
            code,
            headers,
            body,
        }
    }

    /// Returns `true` if the status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the first value of a header, looked up case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the `X-Request-Id` header value, if present.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-request-id")
    }

    /// Returns the `X-Shopify-API-Deprecated-Reason` header value, if present.
    #[must_use]
    pub fn deprecation_reason(&self) -> Option<&str> {
        self.header("x-shopify-api-deprecated-reason")
    }

    /// Returns the `Retry-After` delay, if present and numeric.
    ///
    /// Negative, non-finite or out-of-range values yield `None`.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        self.header("retry-after")
            .and_then(|value| value.trim().parse::<f64>().ok())
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// Returns the `Link` header value, if present.
    #[must_use]
    pub fn link_header(&self) -> Option<&str> {
        self.header("link")
    }

    /// Returns the raw call-limit header value.
    ///
    /// Any header whose name contains `shop-api-call-limit` qualifies.
    #[must_use]
    pub fn call_limit_header(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.contains(CALL_LIMIT_HEADER_FRAGMENT))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }

    /// Returns the parsed call-limit header, if present and well-formed.
    #[must_use]
    pub fn api_call_limit(&self) -> Option<ApiCallLimit> {
        self.call_limit_header().and_then(ApiCallLimit::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with_headers(pairs: &[(&str, &str)]) -> HttpResponse {
        let mut headers: HashMap<String, Vec<String>> = HashMap::new();
        for (k, v) in pairs {
            headers.entry((*k).to_string()).or_default().push((*v).to_string());
        }
        HttpResponse::new(200, headers, json!({}))
    }

    #[test]
    fn test_is_ok_covers_2xx_only() {
        for code in [200, 201, 204, 299] {
            assert!(HttpResponse::new(code, HashMap::new(), json!({})).is_ok());
        }
        for code in [199, 300, 404, 422, 500] {
            assert!(!HttpResponse::new(code, HashMap::new(), json!({})).is_ok());
        }
    }

    #[test]
    fn test_header_names_are_lower_cased() {
        let response = with_headers(&[("X-Request-Id", "req-1"), ("Link", "<u>; rel=\"next\"")]);
        assert_eq!(response.request_id(), Some("req-1"));
        assert_eq!(response.header("LINK"), Some("<u>; rel=\"next\""));
        assert!(response.link_header().is_some());
    }

    #[test]
    fn test_call_limit_header_matched_by_fragment() {
        let response = with_headers(&[("X-Shopify-Shop-Api-Call-Limit", "40/80")]);
        assert_eq!(
            response.api_call_limit(),
            Some(ApiCallLimit {
                used: 40,
                capacity: 80
            })
        );

        let response = with_headers(&[("http_x_shopify_shop-api-call-limit", "1/40")]);
        assert_eq!(response.api_call_limit().map(|l| l.used), Some(1));
    }

    #[test]
    fn test_api_call_limit_parse_rejects_malformed_values() {
        assert!(ApiCallLimit::parse("").is_none());
        assert!(ApiCallLimit::parse("40").is_none());
        assert!(ApiCallLimit::parse("a/b").is_none());
        assert!(ApiCallLimit::parse("1/2/3").is_none());
        assert!(ApiCallLimit::parse("-1/40").is_none());
    }

    #[test]
    fn test_ratio_is_zero_without_capacity() {
        let limit = ApiCallLimit {
            used: 10,
            capacity: 0,
        };
        assert!(limit.ratio().abs() < f64::EPSILON);
    }

    #[test]
    fn test_retry_after_and_deprecation() {
        let response = with_headers(&[
            ("Retry-After", "2.5"),
            ("X-Shopify-API-Deprecated-Reason", "use GraphQL"),
        ]);
        assert_eq!(response.retry_after(), Some(Duration::from_millis(2500)));
        assert_eq!(response.deprecation_reason(), Some("use GraphQL"));

        assert_eq!(with_headers(&[("Retry-After", "soon")]).retry_after(), None);
    }

    #[test]
    fn test_retry_after_out_of_range_is_ignored() {
        for value in ["1e300", "-1", "NaN", "inf"] {
            assert_eq!(
                with_headers(&[("Retry-After", value)]).retry_after(),
                None,
                "Retry-After: {value}"
            );
        }
        assert_eq!(
            with_headers(&[("Retry-After", "0")]).retry_after(),
            Some(Duration::ZERO)
        );
    }
}
