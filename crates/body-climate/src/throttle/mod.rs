//! Fixed-window request throttling keyed by client address.
//!
//! Counts are approximate under concurrent access; the limiter exists to
//! blunt abuse, not to meter usage.

mod middleware;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::debug;

pub use middleware::{client_key, rate_limit, RateLimitState};

/// Requests seen for one key in its current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCount {
    pub count: u32,
    pub resets_at: Instant,
}

impl WindowCount {
    pub fn retry_after(&self, now: Instant) -> Duration {
        self.resets_at.saturating_duration_since(now)
    }
}

/// Injectable counter service behind the limiter.
pub trait RateCounter: Send + Sync {
    /// Record one request for `key` and return the running count for the
    /// window it fell into.
    fn increment(&self, key: &str, now: Instant) -> WindowCount;

    /// Drop windows that ended before `now`, returning how many were removed.
    fn sweep(&self, now: Instant) -> usize;

    fn window(&self) -> Duration;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    resets_at: Instant,
}

/// In-process counter backed by a mutex-guarded map.
#[derive(Debug)]
pub struct FixedWindowCounter {
    windows: Mutex<HashMap<String, Window>>,
    window: Duration,
}

impl FixedWindowCounter {
    pub fn new(window: Duration) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            window,
        }
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl RateCounter for FixedWindowCounter {
    fn increment(&self, key: &str, now: Instant) -> WindowCount {
        // A poisoned map still holds usable counts.
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let entry = windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            resets_at: now + self.window,
        });
        if now > entry.resets_at {
            *entry = Window {
                count: 0,
                resets_at: now + self.window,
            };
        }
        entry.count = entry.count.saturating_add(1);

        WindowCount {
            count: entry.count,
            resets_at: entry.resets_at,
        }
    }

    fn sweep(&self, now: Instant) -> usize {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = windows.len();
        windows.retain(|_, window| now <= window.resets_at);
        before - windows.len()
    }

    fn window(&self) -> Duration {
        self.window
    }
}

/// Periodically drop expired windows so the map stays bounded.
pub fn spawn_sweeper(counter: Arc<dyn RateCounter>) -> JoinHandle<()> {
    let period = counter.window().max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = counter.sweep(Instant::now());
            if removed > 0 {
                debug!(removed, "swept expired rate limit windows");
            }
        }
    })
}
