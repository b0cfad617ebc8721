//! Webhook error types.

use thiserror::Error;

/// Errors raised while authenticating an inbound webhook.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WebhookError {
    /// The payload is not authentic and must not be processed.
    #[error("Webhook signature verification failed: {reason}")]
    InvalidSignature {
        /// Why verification failed.
        reason: &'static str,
    },
}
