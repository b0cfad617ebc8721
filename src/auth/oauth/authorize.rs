//! Authorization URL construction.
//!
//! The first leg of the authorization code grant: send the merchant to
//! `https://{shop}/admin/oauth/authorize` with the app's client id, the
//! requested scopes, the redirect URI and an opaque `state` nonce. The nonce
//! must be kept by the caller and handed to
//! [`validate_callback`](super::validate_callback) when the merchant returns.

use rand::distributions::Alphanumeric;
use rand::Rng;
use url::Url;

use crate::auth::oauth::error::OAuthError;
use crate::auth::AuthScopes;
use crate::config::{ApiKey, ShopDomain};

const STATE_LENGTH: usize = 15;

/// Generates a random alphanumeric `state` nonce.
///
/// ```rust
/// use shopify_client::auth::oauth::generate_state;
///
/// let state = generate_state();
/// assert_eq!(state.len(), 15);
/// assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
#[must_use]
pub fn generate_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

/// Builds the URL that starts the OAuth authorization code grant.
///
/// Scopes are comma-joined in the order given. With `per_user` set, the URL
/// requests an online (user-bound) token via `grant_options[]=per-user`.
///
/// # Errors
///
/// Returns [`OAuthError::InvalidRedirectUri`] if `redirect_uri` is not an
/// absolute URL.
///
/// # Example
///
/// ```rust
/// use shopify_client::{ApiKey, AuthScopes, ShopDomain};
/// use shopify_client::auth::oauth::authorization_url;
///
/// let url = authorization_url(
///     &ShopDomain::new("my-store").unwrap(),
///     &ApiKey::new("client-id").unwrap(),
///     &"read_products,write_orders".parse::<AuthScopes>().unwrap(),
///     "https://app.example.com/auth/callback",
///     "nonce123",
///     false,
/// )
/// .unwrap();
///
/// assert!(url.starts_with("https://my-store.myshopify.com/admin/oauth/authorize?"));
/// assert!(url.contains("scope=read_products%2Cwrite_orders"));
/// assert!(url.contains("state=nonce123"));
/// ```
pub fn authorization_url(
    shop: &ShopDomain,
    client_id: &ApiKey,
    scopes: &AuthScopes,
    redirect_uri: &str,
    state: &str,
    per_user: bool,
) -> Result<String, OAuthError> {
    if Url::parse(redirect_uri).is_err() {
        return Err(OAuthError::InvalidRedirectUri {
            uri: redirect_uri.to_string(),
        });
    }

    let mut params = vec![
        ("client_id", client_id.as_ref().to_string()),
        ("scope", scopes.to_string()),
        ("redirect_uri", redirect_uri.to_string()),
        ("state", state.to_string()),
    ];
    if per_user {
        params.push(("grant_options[]", "per-user".to_string()));
    }

    let query_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    Ok(format!(
        "https://{}/admin/oauth/authorize?{query_string}",
        shop.as_ref()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(per_user: bool) -> String {
        authorization_url(
            &ShopDomain::new("test-shop").unwrap(),
            &ApiKey::new("test-api-key").unwrap(),
            &"read_products,write_orders".parse().unwrap(),
            "https://myapp.example.com/auth/callback",
            "abc123",
            per_user,
        )
        .unwrap()
    }

    #[test]
    fn test_authorization_url_structure() {
        let url = build(false);
        assert!(url.starts_with("https://test-shop.myshopify.com/admin/oauth/authorize?"));
        assert!(url.contains("client_id=test-api-key"));
        assert!(url.contains("scope=read_products%2Cwrite_orders"));
        assert!(url.contains("state=abc123"));
        assert!(!url.contains("grant_options"));
    }

    #[test]
    fn test_redirect_uri_is_percent_encoded() {
        let url = build(false);
        let expected = urlencoding::encode("https://myapp.example.com/auth/callback");
        assert!(url.contains(&format!("redirect_uri={expected}")));
    }

    #[test]
    fn test_per_user_requests_online_token() {
        let url = build(true);
        assert!(url.contains("grant_options%5B%5D=per-user"));
    }

    #[test]
    fn test_rejects_relative_redirect_uri() {
        let result = authorization_url(
            &ShopDomain::new("test-shop").unwrap(),
            &ApiKey::new("key").unwrap(),
            &AuthScopes::new(),
            "/auth/callback",
            "state",
            false,
        );
        assert!(matches!(result, Err(OAuthError::InvalidRedirectUri { .. })));
    }

    #[test]
    fn test_generate_state_is_unique() {
        let a = generate_state();
        let b = generate_state();
        assert_eq!(a.len(), STATE_LENGTH);
        assert_ne!(a, b);
    }
}
