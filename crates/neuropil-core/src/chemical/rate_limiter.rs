//! Release Rate Limiting
//!
//! Real terminals cannot fire vesicles arbitrarily fast; readily-releasable
//! pools deplete. This limiter enforces a per-source ceiling with a 1-second
//! sliding window of release timestamps.
//!
//! Per-source windows sit behind their own leaf mutexes, so contention is
//! bounded by how many threads share one source. Nothing may be acquired
//! while holding a window lock.

use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Default sliding-window length
pub const RELEASE_WINDOW: Duration = Duration::from_secs(1);

/// Default maximum admissions per source per window
pub const DEFAULT_MAX_RELEASES_PER_WINDOW: usize = 100;

/// Sliding-window admission control for chemical sources.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_per_window: AtomicUsize,
    sources: RwLock<HashMap<String, Arc<Mutex<VecDeque<Instant>>>>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RELEASES_PER_WINDOW)
    }
}

impl RateLimiter {
    /// Create a limiter admitting `max_per_window` releases per source
    /// per 1-second window
    pub fn new(max_per_window: usize) -> Self {
        Self::with_window(max_per_window, RELEASE_WINDOW)
    }

    /// Create a limiter with a custom window length
    pub fn with_window(max_per_window: usize, window: Duration) -> Self {
        Self {
            window,
            max_per_window: AtomicUsize::new(max_per_window),
            sources: RwLock::new(HashMap::new()),
        }
    }

    /// Change the per-window ceiling; applies to subsequent admissions
    pub fn set_max_per_window(&self, max_per_window: usize) {
        self.max_per_window.store(max_per_window, Ordering::Relaxed);
    }

    fn window_for(&self, source_id: &str) -> Arc<Mutex<VecDeque<Instant>>> {
        if let Some(w) = self.sources.read().get(source_id) {
            return Arc::clone(w);
        }
        let mut sources = self.sources.write();
        Arc::clone(sources.entry(source_id.to_string()).or_default())
    }

    /// Attempt to admit one release for a source.
    ///
    /// Timestamps older than the window are dropped; if the remaining count
    /// is below the ceiling, the current instant is appended and the release
    /// is admitted.
    pub fn can_release(&self, source_id: &str) -> bool {
        let window = self.window_for(source_id);
        let mut timestamps = window.lock();
        let now = Instant::now();
        while let Some(oldest) = timestamps.front() {
            if now.duration_since(*oldest) > self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }
        if timestamps.len() < self.max_per_window.load(Ordering::Relaxed) {
            timestamps.push_back(now);
            true
        } else {
            false
        }
    }

    /// Current in-window release count for a source
    pub fn current_rate(&self, source_id: &str) -> usize {
        let Some(window) = self.sources.read().get(source_id).map(Arc::clone) else {
            return 0;
        };
        let timestamps = window.lock();
        let now = Instant::now();
        timestamps
            .iter()
            .filter(|t| now.duration_since(**t) <= self.window)
            .count()
    }

    /// Clear all windows. Test hook only; production sources must live
    /// with their history.
    pub fn reset_limits(&self) {
        self.sources.write().clear();
    }
}
