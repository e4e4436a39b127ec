//! Quota-aware rate limiting for Riot API regions.
//!
//! The API reports per-window usage on every response. The tracker turns
//! those reports into proactive waits so calls stay under the limit instead
//! of reacting to 429s after the fact.

mod config;
mod quota;
mod tracker;

use std::time::Duration;

pub use config::{
    RateLimitConfig, RegionStats, WindowLimit, DEFAULT_DIVISOR, DEFAULT_MARGIN, MAX_RETRY_AFTER,
};
pub use quota::{QuotaDescriptor, QuotaParseError, WindowCount, LIMIT_HEADER, USAGE_HEADER};
pub use tracker::{cooldown_for_usage, RateTracker};

/// Parse Retry-After header value (seconds).
/// Returns duration to wait, or None if header is missing/invalid.
pub fn parse_retry_after(header_value: Option<&str>) -> Option<Duration> {
    let value = header_value?;
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| Duration::from_secs(secs).min(MAX_RETRY_AFTER))
}

/// Exponential backoff for a retry attempt, capped at `MAX_RETRY_AFTER`.
pub fn backoff_delay(attempt: u32, base_ms: u64) -> Duration {
    let delay_ms = base_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay_ms).min(MAX_RETRY_AFTER)
}
