//! HTTP client layer for the Shopify Admin REST API.
//!
//! # Overview
//!
//! - [`HttpClient`]: the request pipeline (one call per `request`)
//! - [`RequestOptions`]: headers, query, body and timeout of one call
//! - [`HttpResponse`]: a decoded response
//! - [`RateLimiter`] / [`ApiCallLimit`]: call-budget tracking and throttling
//! - [`PaginationCursor`]: next/previous page queries from the `Link` header
//! - [`HttpError`] and friends: typed failures
//! - [`rest::RestClient`]: the user-facing client
//! - [`rest::ResourcePager`]: item streaming across pages
//!
//! # Throttling
//!
//! When a response reports the call budget at 80% or more, the next call
//! waits a random interval (3 to 10 seconds by default) before dispatch.
//! No call is ever retried automatically.

mod errors;
mod http_client;
mod http_request;
mod http_response;
mod pagination;
mod rate_limit;
pub mod rest;

pub use errors::{
    missing_scopes, ErrorSet, HttpError, MissingScopeError, RequestFailedError, TransportError,
    MISSING_SCOPE_MARKER,
};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{HttpMethod, RequestOptions, CURSOR_ALLOWED_PARAMS, PAGE_INFO_PARAM};
pub use http_response::{ApiCallLimit, HttpResponse, CALL_LIMIT_HEADER_FRAGMENT};
pub use pagination::{parse_link_header, PageLinks, PaginationCursor};
pub use rate_limit::{RateLimiter, CALL_LIMIT_THRESHOLD};
pub(crate) use rate_limit::check_delay_bounds;

pub use rest::{ResourcePager, RestClient, RestError};
