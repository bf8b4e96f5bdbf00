//! Time source for message hints.
//!
//! `iat`, `nbf` and `exp` of an `lti_message_hint` are stamped from a
//! [`MessageClock`], and the same clock decides whether a received hint is
//! still usable. `jsonwebtoken` never reads the system time on its own.

/// Current time as Unix epoch seconds.
pub trait MessageClock: Send + Sync {
    fn now_epoch_secs(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl MessageClock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Pinned instant, so signed hints and their expiry are reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl FixedClock {
    /// The same clock moved `secs` forward (or back when negative).
    pub fn advanced_by(self, secs: i64) -> Self {
        Self(self.0.saturating_add(secs))
    }
}

impl MessageClock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}
