//! Quota descriptors from Riot API response headers.
//!
//! Both `X-App-Rate-Limit` (limits) and `X-App-Rate-Limit-Count` (usage)
//! share the format `count:window_secs,count:window_secs`.

use std::fmt;
use std::str::FromStr;

/// Header carrying calls made per window.
pub const USAGE_HEADER: &str = "x-app-rate-limit-count";

/// Header carrying calls allowed per window.
pub const LIMIT_HEADER: &str = "x-app-rate-limit";

/// One `count:window` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCount {
    pub count: u32,
    pub window_secs: u64,
}

/// A parsed quota header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotaDescriptor(Vec<WindowCount>);

impl QuotaDescriptor {
    pub fn new(windows: Vec<WindowCount>) -> Self {
        Self(windows)
    }

    pub fn windows(&self) -> &[WindowCount] {
        &self.0
    }

    /// Count reported for a window length, if present.
    pub fn count_for(&self, window_secs: u64) -> Option<u32> {
        self.0
            .iter()
            .find(|w| w.window_secs == window_secs)
            .map(|w| w.count)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed quota descriptor '{0}'")]
pub struct QuotaParseError(pub String);

impl FromStr for QuotaDescriptor {
    type Err = QuotaParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut windows = Vec::new();
        for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (count, window) = pair
                .split_once(':')
                .ok_or_else(|| QuotaParseError(s.to_string()))?;
            let count = count
                .trim()
                .parse()
                .map_err(|_| QuotaParseError(s.to_string()))?;
            let window_secs = window
                .trim()
                .parse()
                .map_err(|_| QuotaParseError(s.to_string()))?;
            windows.push(WindowCount { count, window_secs });
        }
        Ok(Self(windows))
    }
}

impl fmt::Display for QuotaDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|w| format!("{}:{}", w.count, w.window_secs))
            .collect();
        f.write_str(&parts.join(","))
    }
}
