//! HMAC-SHA256 primitives shared by OAuth callback and webhook validation.
//!
//! The two remote endpoints disagree on encoding: OAuth callbacks carry a
//! lowercase hex digest, webhooks carry a base64 digest. Both are exposed as
//! separate functions.
//!
//! # Example
//!
//! ```rust
//! use shopify_client::auth::oauth::hmac::{compute_signature, compute_signature_base64};
//!
//! let signature = compute_signature("code=abc&shop=example.myshopify.com", "my-api-secret");
//! assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
//!
//! let webhook_sig = compute_signature_base64(b"webhook payload", "my-api-secret");
//! assert_eq!(webhook_sig.len(), 44);
//! ```

use base64::prelude::*;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

fn digest(message: &[u8], secret: &str) -> Vec<u8> {
    // HMAC accepts keys of any length, so this never panics
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// Computes a lowercase hex HMAC-SHA256 of `message`, as used by OAuth
/// callback query strings.
///
/// ```rust
/// use shopify_client::auth::oauth::hmac::compute_signature;
///
/// assert_eq!(compute_signature("test-message", "secret-key").len(), 64);
/// ```
#[must_use]
pub fn compute_signature(message: &str, secret: &str) -> String {
    hex::encode(digest(message.as_bytes(), secret))
}

/// Computes a standard base64 HMAC-SHA256 of raw bytes, as used by the
/// `X-Shopify-Hmac-SHA256` webhook header.
///
/// Takes bytes rather than `&str` so the payload is signed exactly as it
/// arrived on the wire.
#[must_use]
pub fn compute_signature_base64(message: &[u8], secret: &str) -> String {
    BASE64_STANDARD.encode(digest(message, secret))
}

/// Compares two strings in constant time.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
