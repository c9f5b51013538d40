//! Wall-clock access, isolated so it can be swapped in tests if ever needed.

use std::time::{SystemTime, UNIX_EPOCH};

#[must_use]
pub fn now_ms() -> i64 {
    #[allow(clippy::cast_possible_wrap)]
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
