//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall clock (captured once per session by the caller)

use chrono::{DateTime, Utc};

/// Current time (native)
#[cfg(not(target_arch = "wasm32"))]
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current time from `Date.now()` (WASM)
#[cfg(target_arch = "wasm32")]
pub fn now() -> DateTime<Utc> {
    let millis = js_sys::Date::now() as i64;
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}
