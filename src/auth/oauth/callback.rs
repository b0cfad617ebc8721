//! OAuth callback validation and authorization code exchange.
//!
//! When the merchant approves the app, Shopify redirects back with `code`,
//! `hmac`, `shop`, `state` and `timestamp` query parameters. The callback is
//! authentic only if `hmac` matches a hex HMAC-SHA256 over the other
//! parameters, keyed by the app's shared secret.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_client::auth::oauth::{request_access_token, validate_callback};
//!
//! let code = validate_callback(&query, &secret, Some(&stored_state))?;
//! let auth = request_access_token(&config, &api_key, &secret, &code).await?;
//! let client = RestClient::new(config, auth)?;
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::auth::oauth::error::OAuthError;
use crate::auth::oauth::hmac::{compute_signature, constant_time_compare};
use crate::auth::PublicAppAuth;
use crate::config::{AccessToken, ApiKey, ApiSecretKey, ClientConfig};

const ACCESS_TOKEN_PATH: &str = "/admin/oauth/access_token";

#[derive(Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
    #[serde(default)]
    scope: Option<String>,
}

/// Builds the message signed by the callback `hmac`.
///
/// Every parameter except `hmac` and `signature`, sorted by key, each pair
/// url-encoded as `key=value` and joined with `&`.
#[must_use]
pub fn signable_string(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .filter(|(key, _)| key.as_str() != "hmac" && key.as_str() != "signature")
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Validates an OAuth callback and returns its authorization `code`.
///
/// `expected_state` is the nonce issued with the authorize URL; pass `None`
/// only when no state was issued.
///
/// # Errors
///
/// - [`OAuthError::MissingParameter`] if `code` or `hmac` is absent or empty
/// - [`OAuthError::InvalidSignature`] if the signature does not match
/// - [`OAuthError::StateMismatch`] if the callback `state` differs from
///   `expected_state`
pub fn validate_callback(
    params: &BTreeMap<String, String>,
    secret: &ApiSecretKey,
    expected_state: Option<&str>,
) -> Result<String, OAuthError> {
    let code = required(params, "code")?;
    let received_hmac = required(params, "hmac")?;

    let computed = compute_signature(&signable_string(params), secret.as_ref());
    if !constant_time_compare(&computed, received_hmac) {
        tracing::warn!("Rejected OAuth callback with an invalid signature");
        return Err(OAuthError::InvalidSignature);
    }

    if let Some(expected) = expected_state {
        let received = params.get("state").map_or("", String::as_str);
        if !constant_time_compare(expected, received) {
            return Err(OAuthError::StateMismatch {
                expected: expected.to_string(),
                received: received.to_string(),
            });
        }
    }

    Ok(code.to_string())
}

fn required<'a>(
    params: &'a BTreeMap<String, String>,
    name: &'static str,
) -> Result<&'a str, OAuthError> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
        .ok_or(OAuthError::MissingParameter { name })
}

/// Exchanges an authorization code for an offline or online access token.
///
/// POSTs to `/admin/oauth/access_token` on the configured shop (or the
/// configured API host override) and returns credentials ready for a
/// [`RestClient`](crate::RestClient).
///
/// # Errors
///
/// Returns [`OAuthError::TokenExchangeFailed`] on a transport failure, a
/// non-2xx response, or a body without an `access_token`.
pub async fn request_access_token(
    config: &ClientConfig,
    api_key: &ApiKey,
    secret: &ApiSecretKey,
    code: &str,
) -> Result<PublicAppAuth, OAuthError> {
    let token_url = match config.api_host() {
        Some(host) => host
            .join(ACCESS_TOKEN_PATH)
            .map(String::from)
            .map_err(|e| OAuthError::TokenExchangeFailed {
                status: 0,
                message: format!("Invalid token endpoint: {e}"),
            })?,
        None => format!("https://{}{ACCESS_TOKEN_PATH}", config.shop().as_ref()),
    };

    let mut builder = reqwest::Client::builder().use_rustls_tls();
    if let Some(timeout) = config.connect_timeout() {
        builder = builder.connect_timeout(timeout);
    }
    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }
    let client = builder.build().map_err(|e| OAuthError::TokenExchangeFailed {
        status: 0,
        message: format!("Failed to create HTTP client: {e}"),
    })?;

    let response = client
        .post(&token_url)
        .json(&TokenExchangeRequest {
            client_id: api_key.as_ref(),
            client_secret: secret.as_ref(),
            code,
        })
        .send()
        .await
        .map_err(|e| OAuthError::TokenExchangeFailed {
            status: 0,
            message: format!("Network error: {e}"),
        })?;

    let status = response.status().as_u16();
    if !response.status().is_success() {
        let error_body = response.text().await.unwrap_or_default();
        return Err(OAuthError::TokenExchangeFailed {
            status,
            message: error_body,
        });
    }

    let token: TokenExchangeResponse =
        response
            .json()
            .await
            .map_err(|e| OAuthError::TokenExchangeFailed {
                status,
                message: format!("Failed to parse token response: {e}"),
            })?;

    let access_token =
        AccessToken::new(token.access_token).map_err(|e| OAuthError::TokenExchangeFailed {
            status,
            message: e.to_string(),
        })?;

    tracing::debug!(
        shop = config.shop().as_ref(),
        scope = token.scope.as_deref().unwrap_or_default(),
        "Exchanged OAuth authorization code for access token"
    );

    Ok(PublicAppAuth::new(
        api_key.clone(),
        secret.clone(),
        access_token,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_params(secret: &str) -> BTreeMap<String, String> {
        let mut params: BTreeMap<String, String> = [
            ("code", "auth-code-123"),
            ("shop", "test-shop.myshopify.com"),
            ("state", "test-state"),
            ("timestamp", "1700000000"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let hmac = compute_signature(&signable_string(&params), secret);
        params.insert("hmac".to_string(), hmac);
        params
    }

    fn secret() -> ApiSecretKey {
        ApiSecretKey::new("test-secret").unwrap()
    }

    #[test]
    fn test_signable_string_is_sorted_and_excludes_signatures() {
        let params: BTreeMap<String, String> = [
            ("timestamp", "1"),
            ("hmac", "x"),
            ("code", "a b"),
            ("signature", "y"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        assert_eq!(signable_string(&params), "code=a%20b&timestamp=1");
    }

    #[test]
    fn test_valid_callback_returns_code() {
        let params = signed_params("test-secret");
        let code = validate_callback(&params, &secret(), Some("test-state")).unwrap();
        assert_eq!(code, "auth-code-123");
    }

    #[test]
    fn test_missing_code_or_hmac() {
        let mut params = signed_params("test-secret");
        params.remove("code");
        assert!(matches!(
            validate_callback(&params, &secret(), None),
            Err(OAuthError::MissingParameter { name: "code" })
        ));

        let mut params = signed_params("test-secret");
        params.remove("hmac");
        assert!(matches!(
            validate_callback(&params, &secret(), None),
            Err(OAuthError::MissingParameter { name: "hmac" })
        ));
    }

    #[test]
    fn test_tampered_parameter_invalidates_signature() {
        let mut params = signed_params("test-secret");
        params.insert("shop".to_string(), "evil-shop.myshopify.com".to_string());
        assert!(matches!(
            validate_callback(&params, &secret(), None),
            Err(OAuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_signature_from_other_secret_is_rejected() {
        let params = signed_params("other-secret");
        assert!(matches!(
            validate_callback(&params, &secret(), None),
            Err(OAuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_state_mismatch() {
        let params = signed_params("test-secret");
        match validate_callback(&params, &secret(), Some("wrong-state")) {
            Err(OAuthError::StateMismatch { expected, received }) => {
                assert_eq!(expected, "wrong-state");
                assert_eq!(received, "test-state");
            }
            other => panic!("Expected StateMismatch, got {other:?}"),
        }
    }
}
