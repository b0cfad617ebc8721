//! Advisory call-limit throttling.
//!
//! Every Admin API response reports how full the shop's leaky bucket is.
//! Once a response shows the bucket at or above [`CALL_LIMIT_THRESHOLD`],
//! the next outgoing call is held back for a random interval so that
//! callers sharing a bucket do not retry in lockstep.
//!
//! The limiter never fails a call: a missing or malformed header resets the
//! state to 0/0, which never throttles.

use std::time::Duration;

use rand::Rng;

use crate::clients::http_response::{ApiCallLimit, HttpResponse};
use crate::error::ConfigError;

/// Bucket ratio at which the next call is delayed.
pub const CALL_LIMIT_THRESHOLD: f64 = 0.8;

/// Per-client throttle state.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use std::time::Duration;
/// use serde_json::json;
/// use shopify_client::{HttpResponse, RateLimiter};
///
/// let mut limiter =
///     RateLimiter::new(true, Duration::from_secs(3), Duration::from_secs(10)).unwrap();
///
/// let mut headers = HashMap::new();
/// headers.insert("x-shopify-shop-api-call-limit".to_string(), vec!["36/40".to_string()]);
/// limiter.update(&HttpResponse::new(200, headers, json!({})));
///
/// assert!(limiter.call_limit_reached());
/// assert!(limiter.delay_pending());
/// ```
#[derive(Clone, Debug)]
pub struct RateLimiter {
    enabled: bool,
    state: ApiCallLimit,
    delay_pending: bool,
    min_delay: Duration,
    max_delay: Duration,
}

impl RateLimiter {
    /// Creates a limiter with an empty (0/0) state.
    ///
    /// `min_delay..=max_delay` bounds the random sleep.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRateLimitDelay`] if either bound is zero
    /// or `min_delay > max_delay`.
    pub fn new(
        enabled: bool,
        min_delay: Duration,
        max_delay: Duration,
    ) -> Result<Self, ConfigError> {
        check_delay_bounds(min_delay, max_delay)?;
        Ok(Self {
            enabled,
            state: ApiCallLimit::default(),
            delay_pending: false,
            min_delay,
            max_delay,
        })
    }

    /// Returns whether throttling is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the last observed bucket state.
    #[must_use]
    pub const fn state(&self) -> ApiCallLimit {
        self.state
    }

    /// Returns `true` if the last response asked for the next call to wait.
    #[must_use]
    pub const fn delay_pending(&self) -> bool {
        self.delay_pending
    }

    /// Returns `used / capacity`, or 0 when the capacity is unknown.
    #[must_use]
    pub fn call_limit(&self) -> f64 {
        self.state.ratio()
    }

    /// Returns `true` when [`call_limit`](Self::call_limit) is at least
    /// [`CALL_LIMIT_THRESHOLD`].
    #[must_use]
    pub fn call_limit_reached(&self) -> bool {
        self.call_limit() >= CALL_LIMIT_THRESHOLD
    }

    /// Records the call-limit header of `response` and recomputes the delay
    /// flag.
    pub fn update(&mut self, response: &HttpResponse) {
        self.state = match response.call_limit_header() {
            Some(raw) => ApiCallLimit::parse(raw).unwrap_or_else(|| {
                tracing::warn!(header = raw, "Ignoring malformed API call limit header");
                ApiCallLimit::default()
            }),
            None => ApiCallLimit::default(),
        };
        self.delay_pending = self.call_limit_reached();
    }

    /// Picks the sleep for the next call, if one is due.
    #[must_use]
    pub fn next_delay(&self) -> Option<Duration> {
        if !(self.enabled && self.delay_pending) {
            return None;
        }
        Some(rand::thread_rng().gen_range(self.min_delay..=self.max_delay))
    }

    /// Sleeps before dispatch when the previous call filled the bucket past
    /// the threshold. Returns the time slept.
    pub async fn throttle(&self) -> Option<Duration> {
        let delay = self.next_delay()?;
        tracing::info!(
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            used = self.state.used,
            capacity = self.state.capacity,
            "API call limit nearly reached, delaying next request"
        );
        tokio::time::sleep(delay).await;
        Some(delay)
    }
}

/// Both bounds must be positive and ordered.
pub(crate) fn check_delay_bounds(min: Duration, max: Duration) -> Result<(), ConfigError> {
    if min.is_zero() || max.is_zero() {
        return Err(ConfigError::InvalidRateLimitDelay {
            reason: "delay bounds must be strictly positive".to_string(),
        });
    }
    if min > max {
        return Err(ConfigError::InvalidRateLimitDelay {
            reason: format!("minimum {min:?} is greater than maximum {max:?}"),
        });
    }
    Ok(())
}
