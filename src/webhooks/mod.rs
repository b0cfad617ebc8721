//! Inbound webhook authentication.
//!
//! - [`HmacValidator`]: base64 HMAC-SHA256 check of a raw webhook body
//! - [`WebhookContext`]: metadata read from a verified delivery's headers
//! - [`WebhookError`]: the failure raised for unauthentic payloads
//!
//! # Example
//!
//! ```rust
//! use shopify_client::ApiSecretKey;
//! use shopify_client::webhooks::{HmacValidator, HEADER_HMAC, HEADER_TOPIC};
//!
//! let validator = HmacValidator::new(ApiSecretKey::new("secret").unwrap());
//! let body = b"{\"id\":42}";
//! let signature = validator.calculate_hmac(body);
//!
//! let headers = [(HEADER_HMAC, signature.as_str()), (HEADER_TOPIC, "products/update")];
//! let context = validator.validate_from_headers(body, headers).unwrap();
//! assert_eq!(context.topic(), Some("products/update"));
//! ```

mod errors;
mod verification;

pub use errors::WebhookError;
pub use verification::{
    HmacValidator, WebhookContext, HEADER_HMAC, HEADER_SHOP_DOMAIN, HEADER_TOPIC,
    HEADER_WEBHOOK_ID,
};
