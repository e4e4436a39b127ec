//! Per-region quota tracking.
//!
//! Each response reports how many calls have been made in every quota window.
//! When a window gets within its margin of the limit, the region is held back
//! for a fraction of that window so the server never has to reject a call.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::config::{RateLimitConfig, RegionStats, WindowLimit};
use super::quota::QuotaDescriptor;
use crate::models::Region;

/// Throttling state for one region.
#[derive(Debug, Clone, Default)]
struct RateWindow {
    /// Earliest time the next call may go out. `None` means no wait.
    next_allowed: Option<Instant>,
    /// Limits learned from response headers, keyed by window length.
    learned_limits: BTreeMap<u64, u32>,
    total_calls: u64,
    throttle_count: u64,
    rate_limit_hits: u64,
}

impl RateWindow {
    fn time_until_ready(&self, now: Instant) -> Duration {
        self.next_allowed
            .map(|t| t.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }

    /// Push `next_allowed` out to `until`. Never pulls it earlier.
    fn hold_until(&mut self, until: Instant) {
        self.next_allowed = Some(match self.next_allowed {
            Some(current) if current > until => current,
            _ => until,
        });
    }

    fn limit_for(&self, config: &RateLimitConfig, window_secs: u64) -> Option<WindowLimit> {
        let configured = config.windows.get(&window_secs);
        match self.learned_limits.get(&window_secs) {
            Some(limit) => Some(WindowLimit::new(
                *limit,
                configured.map(|w| w.margin).unwrap_or(config.default_margin),
            )),
            None => configured.copied(),
        }
    }
}

/// Compute the cooldown for a usage report, or `None` if no window tripped.
///
/// The longest cooldown across all tripped windows wins.
pub fn cooldown_for_usage(
    config: &RateLimitConfig,
    usage: &QuotaDescriptor,
    limit_for: impl Fn(u64) -> Option<WindowLimit>,
) -> Option<Duration> {
    usage
        .windows()
        .iter()
        .filter_map(|w| {
            let Some(limit) = limit_for(w.window_secs) else {
                debug!("No known limit for {}s window, ignoring", w.window_secs);
                return None;
            };
            (w.count >= limit.threshold()).then(|| config.cooldown(w.window_secs))
        })
        .max()
}

/// Tracks the earliest permissible call time per region.
#[derive(Debug, Clone)]
pub struct RateTracker {
    config: RateLimitConfig,
    windows: Arc<RwLock<HashMap<Region, RateWindow>>>,
}

impl RateTracker {
    pub fn new() -> Self {
        Self::with_config(RateLimitConfig::default())
    }

    pub fn with_config(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// How long a caller must wait before the next call to `region`.
    pub async fn should_wait(&self, region: Region) -> Duration {
        let windows = self.windows.read().await;
        windows
            .get(&region)
            .map(|w| w.time_until_ready(Instant::now()))
            .unwrap_or(Duration::ZERO)
    }

    /// Count a request sent to `region`, whether or not its response
    /// reports usage.
    pub async fn record_call(&self, region: Region) {
        let mut windows = self.windows.write().await;
        windows.entry(region).or_default().total_calls += 1;
    }

    /// Record the quota usage reported by a response.
    ///
    /// `limits` is the limit header from the same response, if any; it
    /// replaces the configured limit for the windows it names. Returns the
    /// cooldown applied, if a window tripped.
    pub async fn record_usage(
        &self,
        region: Region,
        usage: &QuotaDescriptor,
        limits: Option<&QuotaDescriptor>,
    ) -> Option<Duration> {
        let mut windows = self.windows.write().await;
        let state = windows.entry(region).or_default();

        if let Some(limits) = limits {
            for w in limits.windows() {
                state.learned_limits.insert(w.window_secs, w.count);
            }
        }

        let cooldown = cooldown_for_usage(&self.config, usage, |window| {
            state.limit_for(&self.config, window)
        })?;

        state.throttle_count += 1;
        state.hold_until(Instant::now() + cooldown);
        debug!(
            "{} quota usage {} near limit, holding for {:?}",
            region, usage, cooldown
        );
        Some(cooldown)
    }

    /// Hold a region after the server rejected a call with 429.
    pub async fn report_rate_limit(&self, region: Region, wait: Duration) {
        let mut windows = self.windows.write().await;
        let state = windows.entry(region).or_default();
        state.rate_limit_hits += 1;
        state.hold_until(Instant::now() + wait);
        warn!("Rate limited by {} API, backing off for {:?}", region, wait);
    }

    /// Statistics for every region that has seen traffic.
    pub async fn get_stats(&self) -> HashMap<Region, RegionStats> {
        let windows = self.windows.read().await;
        let now = Instant::now();
        windows
            .iter()
            .map(|(region, w)| {
                (
                    *region,
                    RegionStats {
                        total_calls: w.total_calls,
                        throttle_count: w.throttle_count,
                        rate_limit_hits: w.rate_limit_hits,
                        pending_wait: w.time_until_ready(now),
                    },
                )
            })
            .collect()
    }
}

impl Default for RateTracker {
    fn default() -> Self {
        Self::new()
    }
}
