use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Cap on distinct keys held at once. Beyond this the least-recently-seen key
/// is evicted, bounding memory under address-spoofed or high-cardinality
/// traffic.
pub const DEFAULT_MAX_KEYS: usize = 10_000;

/// Admission budget for one operation class: at most `limit` requests within
/// any trailing `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub limit: u32,
    pub window: Duration,
}

impl Quota {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self { limit, window }
    }

    pub fn per_minute(limit: u32) -> Self {
        Self::new(limit, Duration::seconds(60))
    }

    pub fn per_hour(limit: u32) -> Self {
        Self::new(limit, Duration::seconds(3600))
    }
}

/// Outcome of an admission check, carrying everything the HTTP layer needs
/// for `429` bodies and `X-RateLimit-*` headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// How long until a slot frees up. Zero when allowed.
    pub retry_after: Duration,
    /// When the oldest recorded admission leaves the window.
    pub reset_at: DateTime<Utc>,
}

#[derive(Debug)]
struct KeyState {
    hits: VecDeque<DateTime<Utc>>,
    last_seen: DateTime<Utc>,
}

/// Sliding-window counter keyed by `{operation class}:{client}` strings.
///
/// Entries are created lazily on first use; key cardinality is bounded by
/// `max_keys` with least-recently-seen eviction.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    max_keys: usize,
    inner: Mutex<HashMap<String, KeyState>>,
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl SlidingWindowLimiter {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_KEYS)
    }

    pub fn with_capacity(max_keys: usize) -> Self {
        Self {
            max_keys: max_keys.max(1),
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Admit or reject one request for `key` right now.
    pub fn allow(&self, key: &str, quota: Quota) -> Decision {
        self.allow_at(key, quota, Utc::now())
    }

    /// Admit or reject one request for `key` at the given instant.
    ///
    /// Prunes admissions older than `now - window`; if the remainder already
    /// meets the limit the attempt is rejected (and not recorded), otherwise
    /// `now` is appended and the attempt is admitted.
    pub fn allow_at(&self, key: &str, quota: Quota, now: DateTime<Utc>) -> Decision {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if !map.contains_key(key) && map.len() >= self.max_keys {
            evict_least_recently_seen(&mut map);
        }

        let state = map.entry(key.to_owned()).or_insert_with(|| KeyState {
            hits: VecDeque::new(),
            last_seen: now,
        });
        state.last_seen = now;
        prune(&mut state.hits, quota.window, now);

        let count = state.hits.len() as u32;
        if count >= quota.limit {
            let oldest = state.hits.front().copied().unwrap_or(now);
            let reset_at = oldest + quota.window;
            return Decision {
                allowed: false,
                limit: quota.limit,
                remaining: 0,
                retry_after: reset_at - now,
                reset_at,
            };
        }

        state.hits.push_back(now);
        let oldest = state.hits.front().copied().unwrap_or(now);
        Decision {
            allowed: true,
            limit: quota.limit,
            remaining: quota.limit - (count + 1),
            retry_after: Duration::zero(),
            reset_at: oldest + quota.window,
        }
    }

    /// Requests left in the current window, without recording an attempt.
    pub fn remaining(&self, key: &str, quota: Quota) -> u32 {
        self.remaining_at(key, quota, Utc::now())
    }

    pub fn remaining_at(&self, key: &str, quota: Quota, now: DateTime<Utc>) -> u32 {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let Some(state) = map.get_mut(key) else {
            return quota.limit;
        };
        prune(&mut state.hits, quota.window, now);
        quota.limit.saturating_sub(state.hits.len() as u32)
    }

    /// Number of distinct keys currently tracked.
    pub fn key_count(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

fn prune(hits: &mut VecDeque<DateTime<Utc>>, window: Duration, now: DateTime<Utc>) {
    let window_start = now - window;
    while let Some(&front) = hits.front() {
        if front <= window_start {
            hits.pop_front();
        } else {
            break;
        }
    }
}

fn evict_least_recently_seen(map: &mut HashMap<String, KeyState>) {
    let victim = map
        .iter()
        .min_by_key(|(_, state)| state.last_seen)
        .map(|(key, _)| key.clone());
    if let Some(key) = victim {
        map.remove(&key);
    }
}
