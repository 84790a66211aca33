//! Wall-clock timestamps
//!
//! Timestamps are milliseconds since the Unix epoch, the unit the browser
//! reports from `Date.now()`.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// A point in wall-clock time (ms since the Unix epoch)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Timestamp(pub f64);

impl Timestamp {
    pub fn from_millis(ms: f64) -> Self {
        Self(ms)
    }

    pub fn as_millis(&self) -> f64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`
    pub fn millis_since(&self, earlier: Timestamp) -> f64 {
        self.0 - earlier.0
    }

    /// Time of day as `hh:mm:ss`
    pub fn time_of_day(&self) -> String {
        format_time_of_day(*self)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.time_of_day())
    }
}

/// Source of the current time
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// The platform wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now(&self) -> Timestamp {
        Timestamp(js_sys::Date::now())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now(&self) -> Timestamp {
        let now = time::OffsetDateTime::now_utc();
        Timestamp(now.unix_timestamp_nanos() as f64 / 1_000_000.0)
    }
}

/// A clock that only moves when told to
///
/// Clones share the same time, so a driver can keep one handle and give
/// another to the session controller.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now_ms: Rc::new(Cell::new(start.0)),
        }
    }

    pub fn advance(&self, ms: f64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    pub fn set(&self, at: Timestamp) {
        self.now_ms.set(at.0);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now_ms.get())
    }
}

/// Local time of day, as the browser formats it
#[cfg(target_arch = "wasm32")]
pub fn format_time_of_day(at: Timestamp) -> String {
    let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(at.0));
    String::from(date.to_locale_time_string("default"))
}

/// UTC time of day as `hh:mm:ss`
#[cfg(not(target_arch = "wasm32"))]
pub fn format_time_of_day(at: Timestamp) -> String {
    use time::OffsetDateTime;
    use time::macros::format_description;

    let format = format_description!("[hour]:[minute]:[second]");
    let nanos = (at.0 * 1_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&format).ok())
        .unwrap_or_else(|| "--:--:--".to_string())
}
