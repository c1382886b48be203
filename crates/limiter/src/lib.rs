//! `rolodex-limiter` — per-key sliding-window request admission.
//!
//! A sliding window (not fixed calendar buckets) prevents burst-at-boundary
//! abuse: N requests at the end of one window plus N more at the start of the
//! next would both be admitted by a fixed-window counter.
//!
//! The limiter is an injected, explicitly-owned component: construct one at
//! process start and pass a handle into the request path. The read-prune-append
//! sequence is a critical section and runs under a single lock, so two
//! simultaneous requests can never both claim the last remaining slot.

pub mod sliding;

pub use sliding::{DEFAULT_MAX_KEYS, Decision, Quota, SlidingWindowLimiter};
