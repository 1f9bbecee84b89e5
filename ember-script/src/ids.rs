//! Process-wide line id generation.
//!
//! Line ids are strings of a monotonically increasing counter. The counter
//! only ever moves forward: ids are never reused, not even after deletions,
//! so concurrent edit sessions cannot collide.

use std::sync::atomic::{AtomicU64, Ordering};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Hands out the next unused id.
pub fn next_id() -> String {
    (COUNTER.fetch_add(1, Ordering::Relaxed) + 1).to_string()
}

/// Marks `seen` as already in use. The counter never decreases.
pub fn observe(seen: u64) {
    COUNTER.fetch_max(seen, Ordering::Relaxed);
}
