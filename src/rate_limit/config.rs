//! Rate limiter configuration.

use std::collections::BTreeMap;
use std::time::Duration;

/// Calls reserved as headroom in each window before throttling kicks in.
pub const DEFAULT_MARGIN: u32 = 4;

/// Cooldown is `window / divisor` plus one second.
pub const DEFAULT_DIVISOR: u32 = 4;

/// Upper bound on a server-provided Retry-After.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Limit and headroom for a single quota window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowLimit {
    /// Calls allowed within the window.
    pub limit: u32,
    /// Calls held back from the limit.
    pub margin: u32,
}

impl WindowLimit {
    pub fn new(limit: u32, margin: u32) -> Self {
        Self { limit, margin }
    }

    /// Usage at or above this count trips the window.
    pub fn threshold(&self) -> u32 {
        self.limit.saturating_sub(self.margin)
    }
}

/// Configuration for quota-aware throttling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Known windows keyed by length in seconds.
    pub windows: BTreeMap<u64, WindowLimit>,
    /// Margin applied to windows learned from response headers.
    pub default_margin: u32,
    /// Cooldown divisor.
    pub divisor: u32,
}

impl RateLimitConfig {
    /// Build a config from `(window_secs, limit)` pairs sharing one margin.
    pub fn from_limits(
        limits: impl IntoIterator<Item = (u64, u32)>,
        margin: u32,
        divisor: u32,
    ) -> Self {
        Self {
            windows: limits
                .into_iter()
                .map(|(window, limit)| (window, WindowLimit::new(limit, margin)))
                .collect(),
            default_margin: margin,
            divisor: divisor.max(1),
        }
    }

    /// Cooldown applied when a window of the given length trips.
    pub fn cooldown(&self, window_secs: u64) -> Duration {
        Duration::from_secs_f64(window_secs as f64 / self.divisor as f64) + Duration::from_secs(1)
    }

    /// Cooldown of the longest configured window.
    pub fn longest_cooldown(&self) -> Duration {
        self.windows
            .keys()
            .next_back()
            .map(|w| self.cooldown(*w))
            .unwrap_or(Duration::from_secs(1))
    }
}

impl Default for RateLimitConfig {
    /// Development key limits: 20 calls per second, 100 per two minutes.
    fn default() -> Self {
        Self::from_limits([(1, 20), (120, 100)], DEFAULT_MARGIN, DEFAULT_DIVISOR)
    }
}

/// Statistics for a region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionStats {
    pub total_calls: u64,
    pub throttle_count: u64,
    pub rate_limit_hits: u64,
    pub pending_wait: Duration,
}
