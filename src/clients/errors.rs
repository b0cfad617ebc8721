//! HTTP error types.
//!
//! Every failed call surfaces as an [`HttpError`]:
//!
//! - [`TransportError`]: no response was received at all
//! - [`RequestFailedError`]: the API answered with a non-2xx status
//! - [`MissingScopeError`]: a [`RequestFailedError`] caused by a scope the
//!   app was never granted
//!
//! The decoded `errors` field of a failed response is kept as an
//! [`ErrorSet`], whose shape depends on the endpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_client::{HttpError, RestError};
//!
//! match client.post("products", body).await {
//!     Ok(product) => println!("created {}", product["product"]["id"]),
//!     Err(RestError::Http(HttpError::MissingScope(e))) => {
//!         println!("re-authorize with {:?}", e.scopes);
//!     }
//!     Err(RestError::Http(HttpError::RequestFailed(e))) => {
//!         println!("API error {}: {:?}", e.code, e.errors);
//!     }
//!     Err(other) => println!("{other}"),
//! }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::clients::http_request::HttpMethod;
use crate::clients::http_response::HttpResponse;

/// Text that marks an authorization failure caused by an ungranted scope.
pub const MISSING_SCOPE_MARKER: &str = "requires merchant approval for";

/// The decoded `errors` field of a failed response.
///
/// Surfaced exactly as the API returned it.
///
/// # Example
///
/// ```rust
/// use shopify_client::ErrorSet;
/// use serde_json::json;
///
/// let errors: ErrorSet = serde_json::from_value(json!({"title": ["can't be blank"]})).unwrap();
/// assert_eq!(errors.messages(), vec!["title can't be blank"]);
///
/// let errors: ErrorSet = serde_json::from_value(json!("Not Found")).unwrap();
/// assert_eq!(errors, ErrorSet::Message("Not Found".to_string()));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ErrorSet {
    /// Field name to validation messages.
    Fields(BTreeMap<String, Vec<String>>),
    /// A flat list of messages.
    List(Vec<String>),
    /// A single message.
    Message(String),
    /// Any other JSON shape.
    Other(Value),
}

impl ErrorSet {
    /// Decodes the `errors` field of a response body.
    ///
    /// Returns `None` when the body has no `errors` field or it is `null`.
    #[must_use]
    pub fn from_body(body: &Value) -> Option<Self> {
        body.get("errors")
            .filter(|errors| !errors.is_null())
            .and_then(|errors| serde_json::from_value(errors.clone()).ok())
    }

    /// Flattens the set into human readable messages.
    ///
    /// Field errors are rendered as `"{field} {message}"`.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Fields(fields) => fields
                .iter()
                .flat_map(|(field, messages)| {
                    messages.iter().map(move |message| format!("{field} {message}"))
                })
                .collect(),
            Self::List(messages) => messages.clone(),
            Self::Message(message) => vec![message.clone()],
            Self::Other(value) => vec![value.to_string()],
        }
    }
}

/// The API answered with a non-2xx status.
#[derive(Debug, Error)]
#[error("Request failed with status {code}: {message}")]
pub struct RequestFailedError {
    /// The HTTP status code.
    pub code: u16,
    /// Summary of the failure for display.
    pub message: String,
    /// The decoded `errors` field, if the body carried one.
    pub errors: Option<ErrorSet>,
    /// The `X-Request-Id` of the failed call, for support requests.
    pub error_reference: Option<String>,
    /// The full failed response.
    pub response: Box<HttpResponse>,
}

impl RequestFailedError {
    /// Builds the error from a failed response.
    #[must_use]
    pub fn from_response(response: HttpResponse) -> Self {
        let errors = ErrorSet::from_body(&response.body);
        let message = errors.as_ref().map_or_else(
            || fallback_message(&response.body),
            |set| set.messages().join("; "),
        );
        Self {
            code: response.code,
            message,
            errors,
            error_reference: response.request_id().map(String::from),
            response: Box::new(response),
        }
    }
}

fn fallback_message(body: &Value) -> String {
    match body.get("error") {
        Some(Value::String(error)) => error.clone(),
        Some(other) => other.to_string(),
        None => match body {
            Value::String(text) => text.clone(),
            Value::Object(map) if map.is_empty() => "no error details".to_string(),
            other => other.to_string(),
        },
    }
}

/// The call failed because the app lacks one or more access scopes.
///
/// Carries the same status, [`ErrorSet`] and response as a plain
/// [`RequestFailedError`].
#[derive(Debug, Error)]
#[error("Missing access scope(s) {}: {failed}", .scopes.join(", "))]
pub struct MissingScopeError {
    /// The scopes named in the error message.
    pub scopes: Vec<String>,
    /// The underlying failure.
    #[source]
    pub failed: RequestFailedError,
}

impl MissingScopeError {
    /// Returns the HTTP status code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.failed.code
    }

    /// Returns the decoded `errors` field.
    #[must_use]
    pub const fn errors(&self) -> Option<&ErrorSet> {
        self.failed.errors.as_ref()
    }

    /// Returns the failed response.
    #[must_use]
    pub fn response(&self) -> &HttpResponse {
        &self.failed.response
    }
}

/// No response was received (DNS, connect, TLS or timeout failure).
#[derive(Debug, Error)]
#[error("Failed to send {method} request for '{resource}' ({options})")]
pub struct TransportError {
    /// The method attempted.
    pub method: HttpMethod,
    /// The resource path attempted.
    pub resource: String,
    /// Summary of the request options attempted.
    pub options: String,
    /// The transport failure.
    #[source]
    pub source: reqwest::Error,
}

/// Unified error for one HTTP call.
#[derive(Debug, Error)]
pub enum HttpError {
    /// No response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The API answered with a non-2xx status.
    #[error(transparent)]
    RequestFailed(#[from] RequestFailedError),

    /// The API rejected the call for lack of an access scope.
    #[error(transparent)]
    MissingScope(#[from] MissingScopeError),
}

impl HttpError {
    /// Classifies a non-2xx response.
    ///
    /// Produces [`HttpError::MissingScope`] when the body mentions
    /// [`MISSING_SCOPE_MARKER`], [`HttpError::RequestFailed`] otherwise.
    #[must_use]
    pub fn from_failed_response(response: HttpResponse) -> Self {
        let scopes = missing_scopes(&response.body);
        let failed = RequestFailedError::from_response(response);
        if scopes.is_empty() {
            Self::RequestFailed(failed)
        } else {
            Self::MissingScope(MissingScopeError { scopes, failed })
        }
    }

    /// Returns the HTTP status, if a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(_) => None,
            Self::RequestFailed(e) => Some(e.code),
            Self::MissingScope(e) => Some(e.failed.code),
        }
    }

    /// Returns the decoded `errors` field, if any.
    #[must_use]
    pub const fn errors(&self) -> Option<&ErrorSet> {
        match self {
            Self::Transport(_) => None,
            Self::RequestFailed(e) => e.errors.as_ref(),
            Self::MissingScope(e) => e.failed.errors.as_ref(),
        }
    }

    /// Returns the failed response, if one was received.
    #[must_use]
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Self::Transport(_) => None,
            Self::RequestFailed(e) => Some(&e.response),
            Self::MissingScope(e) => Some(&e.failed.response),
        }
    }
}

/// Extracts every scope named after [`MISSING_SCOPE_MARKER`] anywhere in
/// the body, in order of appearance and without duplicates.
#[must_use]
pub fn missing_scopes(body: &Value) -> Vec<String> {
    let text = match body {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };

    let mut scopes: Vec<String> = Vec::new();
    let mut rest = text.as_str();
    while let Some(index) = rest.find(MISSING_SCOPE_MARKER) {
        rest = rest[index + MISSING_SCOPE_MARKER.len()..].trim_start();
        let scope: String = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        if !scope.is_empty() && !scopes.contains(&scope) {
            scopes.push(scope);
        }
    }
    scopes
}

// Verify error types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpError>();
    assert_send_sync::<ErrorSet>();
};
