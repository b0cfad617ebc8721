//! Webhook signature verification.
//!
//! Shopify signs every webhook delivery with a base64 HMAC-SHA256 of the raw
//! request body, keyed by the app's shared secret, and sends it in the
//! `X-Shopify-Hmac-SHA256` header.
//!
//! # Example
//!
//! ```rust
//! use shopify_client::ApiSecretKey;
//! use shopify_client::webhooks::HmacValidator;
//!
//! let validator = HmacValidator::new(ApiSecretKey::new("my-secret").unwrap());
//!
//! let body = br#"{"id":1}"#;
//! let signature = validator.calculate_hmac(body);
//! assert!(validator.validate(body, &signature).is_ok());
//! assert!(validator.validate(body, "forged").is_err());
//! ```

use crate::auth::oauth::hmac::{compute_signature_base64, constant_time_compare};
use crate::config::ApiSecretKey;
use crate::webhooks::WebhookError;

// ============================================================================
// Header Constants
// ============================================================================

/// Header carrying the base64 HMAC-SHA256 of the body.
pub const HEADER_HMAC: &str = "X-Shopify-Hmac-SHA256";

/// Header carrying the webhook topic, e.g. `orders/create`.
pub const HEADER_TOPIC: &str = "X-Shopify-Topic";

/// Header carrying the `*.myshopify.com` domain of the sending shop.
pub const HEADER_SHOP_DOMAIN: &str = "X-Shopify-Shop-Domain";

/// Header carrying a unique id per delivery.
pub const HEADER_WEBHOOK_ID: &str = "X-Shopify-Webhook-Id";

// ============================================================================
// WebhookContext
// ============================================================================

/// Metadata read from the headers of a verified delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookContext {
    topic: Option<String>,
    shop_domain: Option<String>,
    webhook_id: Option<String>,
}

impl WebhookContext {
    /// Returns the topic, if the header was present.
    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// Returns the shop domain, if the header was present.
    #[must_use]
    pub fn shop_domain(&self) -> Option<&str> {
        self.shop_domain.as_deref()
    }

    /// Returns the delivery id, if the header was present.
    #[must_use]
    pub fn webhook_id(&self) -> Option<&str> {
        self.webhook_id.as_deref()
    }
}

// ============================================================================
// HmacValidator
// ============================================================================

/// Validates webhook signatures against the app's shared secret.
///
/// An optional previous secret can be configured while rotating keys; it is
/// tried only when the primary secret does not match.
#[derive(Clone, Debug)]
pub struct HmacValidator {
    secret: ApiSecretKey,
    old_secret: Option<ApiSecretKey>,
}

impl HmacValidator {
    /// Creates a validator keyed by `secret`.
    #[must_use]
    pub const fn new(secret: ApiSecretKey) -> Self {
        Self {
            secret,
            old_secret: None,
        }
    }

    /// Also accepts signatures made with a previous secret.
    #[must_use]
    pub fn with_old_secret(mut self, old_secret: ApiSecretKey) -> Self {
        self.old_secret = Some(old_secret);
        self
    }

    /// Computes the base64 HMAC-SHA256 of `raw_body` with the primary secret.
    #[must_use]
    pub fn calculate_hmac(&self, raw_body: &[u8]) -> String {
        compute_signature_base64(raw_body, self.secret.as_ref())
    }

    /// Checks `signature` against `raw_body`.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::InvalidSignature`] when the signature is empty,
    /// the body is empty, or neither secret produces a matching HMAC. The
    /// empty checks happen before any HMAC is computed.
    pub fn validate(&self, raw_body: &[u8], signature: &str) -> Result<(), WebhookError> {
        if signature.is_empty() {
            return Err(WebhookError::InvalidSignature {
                reason: "signature header is empty",
            });
        }
        if raw_body.is_empty() {
            return Err(WebhookError::InvalidSignature {
                reason: "request body is empty",
            });
        }

        let matches = |secret: &ApiSecretKey| {
            constant_time_compare(
                &compute_signature_base64(raw_body, secret.as_ref()),
                signature,
            )
        };

        if matches(&self.secret) || self.old_secret.as_ref().is_some_and(matches) {
            Ok(())
        } else {
            tracing::warn!("Rejected webhook with a mismatched HMAC signature");
            Err(WebhookError::InvalidSignature {
                reason: "signature mismatch",
            })
        }
    }

    /// Finds the signature header (case-insensitively), validates the body
    /// and returns the delivery metadata.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::InvalidSignature`] when the signature header is
    /// absent or [`validate`](Self::validate) fails.
    pub fn validate_from_headers<I, K, V>(
        &self,
        raw_body: &[u8],
        headers: I,
    ) -> Result<WebhookContext, WebhookError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut signature = None;
        let mut context = WebhookContext::default();

        for (name, value) in headers {
            let name = name.as_ref();
            let value = value.as_ref().to_string();
            if name.eq_ignore_ascii_case(HEADER_HMAC) {
                signature = Some(value);
            } else if name.eq_ignore_ascii_case(HEADER_TOPIC) {
                context.topic = Some(value);
            } else if name.eq_ignore_ascii_case(HEADER_SHOP_DOMAIN) {
                context.shop_domain = Some(value);
            } else if name.eq_ignore_ascii_case(HEADER_WEBHOOK_ID) {
                context.webhook_id = Some(value);
            }
        }

        let signature = signature.ok_or(WebhookError::InvalidSignature {
            reason: "signature header is missing",
        })?;
        self.validate(raw_body, &signature)?;
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> HmacValidator {
        HmacValidator::new(ApiSecretKey::new("hush").unwrap())
    }

    #[test]
    fn test_empty_signature_and_empty_body_fail_first() {
        let v = validator();
        assert_eq!(
            v.validate(b"{}", ""),
            Err(WebhookError::InvalidSignature {
                reason: "signature header is empty"
            })
        );
        assert_eq!(
            v.validate(b"", "anything"),
            Err(WebhookError::InvalidSignature {
                reason: "request body is empty"
            })
        );
    }

    #[test]
    fn test_correct_signature_validates() {
        let v = validator();
        let body = br#"{"test":"x"}"#;
        let signature = v.calculate_hmac(body);
        assert!(v.validate(body, &signature).is_ok());
    }

    #[test]
    fn test_single_byte_mutation_invalidates() {
        let v = validator();
        let signature = v.calculate_hmac(br#"{"test":"x"}"#);
        assert_eq!(
            v.validate(br#"{"test":"y"}"#, &signature),
            Err(WebhookError::InvalidSignature {
                reason: "signature mismatch"
            })
        );
    }

    #[test]
    fn test_old_secret_is_accepted_during_rotation() {
        let old = HmacValidator::new(ApiSecretKey::new("old").unwrap());
        let signature = old.calculate_hmac(b"payload");

        assert!(validator().validate(b"payload", &signature).is_err());

        let rotating = validator().with_old_secret(ApiSecretKey::new("old").unwrap());
        assert!(rotating.validate(b"payload", &signature).is_ok());
    }

    #[test]
    fn test_validate_from_headers_is_case_insensitive() {
        let v = validator();
        let body = b"payload";
        let signature = v.calculate_hmac(body);
        let headers = vec![
            ("x-shopify-hmac-sha256", signature.as_str()),
            ("X-SHOPIFY-TOPIC", "orders/create"),
            ("x-shopify-shop-domain", "example.myshopify.com"),
        ];

        let context = v.validate_from_headers(body, headers).unwrap();
        assert_eq!(context.topic(), Some("orders/create"));
        assert_eq!(context.shop_domain(), Some("example.myshopify.com"));
        assert_eq!(context.webhook_id(), None);
    }

    #[test]
    fn test_validate_from_headers_requires_signature_header() {
        let headers: Vec<(&str, &str)> = vec![("x-shopify-topic", "orders/create")];
        assert_eq!(
            validator().validate_from_headers(b"payload", headers),
            Err(WebhookError::InvalidSignature {
                reason: "signature header is missing"
            })
        );
    }
}
