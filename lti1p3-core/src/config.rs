//! Launch Configuration Module
//!
//! Settings shared by message signing and verification. Loaded from
//! environment variables with defaults suitable for development.

use crate::clock::{MessageClock, SystemClock};
use std::ops::RangeInclusive;
use std::sync::Arc;

/// Default lifetime of a signed message, in seconds.
pub const DEFAULT_MESSAGE_TTL_SECS: i64 = 600;

/// Default tolerance applied to `exp`/`nbf` checks, in seconds.
pub const DEFAULT_CLOCK_SKEW_SECS: i64 = 60;

/// Accepted message lifetimes: one second up to one day.
pub const MESSAGE_TTL_RANGE: RangeInclusive<i64> = 1..=86_400;

/// Accepted clock skews: none up to one hour.
pub const CLOCK_SKEW_RANGE: RangeInclusive<i64> = 0..=3_600;

/// Configuration for building and reading signed LTI messages.
#[derive(Clone)]
pub struct LaunchConfig {
    /// Lifetime of the `lti_message_hint` token (`exp - iat`).
    pub message_ttl_secs: i64,

    /// Leeway applied when a message hint's `exp` and `nbf` are checked.
    pub clock_skew_secs: i64,

    /// Time source for `iat`/`nbf`/`exp`.
    pub clock: Arc<dyn MessageClock>,
}

impl std::fmt::Debug for LaunchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchConfig")
            .field("message_ttl_secs", &self.message_ttl_secs)
            .field("clock_skew_secs", &self.clock_skew_secs)
            .field("clock", &"<MessageClock>")
            .finish()
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            message_ttl_secs: DEFAULT_MESSAGE_TTL_SECS,
            clock_skew_secs: DEFAULT_CLOCK_SKEW_SECS,
            clock: Arc::new(SystemClock),
        }
    }
}

impl LaunchConfig {
    /// Create launch configuration from environment variables.
    ///
    /// Unparsable or out of range values fall back to the defaults.
    ///
    /// # Environment Variables
    /// - `LTI_MESSAGE_TTL_SECS`: message hint lifetime, 1..=86400 (default: 600)
    /// - `LTI_CLOCK_SKEW_SECS`: validation leeway, 0..=3600 (default: 60)
    pub fn from_env() -> Self {
        Self {
            message_ttl_secs: env_secs(
                "LTI_MESSAGE_TTL_SECS",
                &MESSAGE_TTL_RANGE,
                DEFAULT_MESSAGE_TTL_SECS,
            ),
            clock_skew_secs: env_secs(
                "LTI_CLOCK_SKEW_SECS",
                &CLOCK_SKEW_RANGE,
                DEFAULT_CLOCK_SKEW_SECS,
            ),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn MessageClock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the message lifetime; out of range values keep the default.
    pub fn with_message_ttl_secs(mut self, ttl: i64) -> Self {
        self.message_ttl_secs = in_range_or(
            "message_ttl_secs",
            ttl,
            &MESSAGE_TTL_RANGE,
            DEFAULT_MESSAGE_TTL_SECS,
        );
        self
    }

    /// Replace the validation leeway; out of range values keep the default.
    pub fn with_clock_skew_secs(mut self, skew: i64) -> Self {
        self.clock_skew_secs = in_range_or(
            "clock_skew_secs",
            skew,
            &CLOCK_SKEW_RANGE,
            DEFAULT_CLOCK_SKEW_SECS,
        );
        self
    }
}

fn env_secs(key: &str, range: &RangeInclusive<i64>, default: i64) -> i64 {
    match std::env::var(key).ok().map(|s| s.parse::<i64>()) {
        Some(Ok(value)) => in_range_or(key, value, range, default),
        Some(Err(_)) => {
            tracing::warn!(key, default, "Ignoring unparsable launch setting");
            default
        }
        None => default,
    }
}

fn in_range_or(name: &str, value: i64, range: &RangeInclusive<i64>, default: i64) -> i64 {
    if range.contains(&value) {
        value
    } else {
        tracing::warn!(
            name,
            value,
            min = *range.start(),
            max = *range.end(),
            default,
            "Launch setting out of range, using default"
        );
        default
    }
}
