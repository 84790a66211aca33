//! Repeating timers
//!
//! The controller asks for an interval and gets a handle back; the host
//! calls `SessionController::on_tick` with that handle whenever it fires.

use std::collections::BTreeMap;

/// Identifies one scheduled interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u32);

/// Schedules repeating callbacks
pub trait Ticker {
    fn start_interval(&mut self, period_ms: u32) -> TimerHandle;
    /// Cancel an interval; unknown or already-cleared handles are ignored
    fn clear_interval(&mut self, handle: TimerHandle);
}

#[derive(Debug, Clone, Copy)]
struct Interval {
    period_ms: f64,
    next_due_ms: f64,
}

/// Simulated-time ticker
///
/// Time only moves through `advance`; `pop_due` then yields each firing in
/// order so the caller can dispatch it (and clear intervals) one at a time.
#[derive(Debug, Default)]
pub struct ManualTicker {
    now_ms: f64,
    target_ms: f64,
    next_id: u32,
    intervals: BTreeMap<TimerHandle, Interval>,
    started: u32,
    cleared: u32,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Let `ms` of simulated time pass
    pub fn advance(&mut self, ms: f64) {
        self.target_ms += ms;
    }

    /// Next firing at or before the advanced time, earliest first
    pub fn pop_due(&mut self) -> Option<TimerHandle> {
        let target = self.target_ms;
        let (&handle, interval) = self
            .intervals
            .iter_mut()
            .filter(|(_, i)| i.next_due_ms <= target)
            .min_by(|a, b| a.1.next_due_ms.total_cmp(&b.1.next_due_ms))?;
        self.now_ms = interval.next_due_ms;
        interval.next_due_ms += interval.period_ms;
        Some(handle)
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.intervals.contains_key(&handle)
    }

    pub fn active_count(&self) -> usize {
        self.intervals.len()
    }

    /// Intervals ever started
    pub fn started_count(&self) -> u32 {
        self.started
    }

    /// Intervals actually cancelled
    pub fn cleared_count(&self) -> u32 {
        self.cleared
    }
}

impl Ticker for ManualTicker {
    fn start_interval(&mut self, period_ms: u32) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        let period_ms = f64::from(period_ms.max(1));
        self.intervals.insert(
            handle,
            Interval {
                period_ms,
                next_due_ms: self.target_ms + period_ms,
            },
        );
        self.started += 1;
        handle
    }

    fn clear_interval(&mut self, handle: TimerHandle) {
        if self.intervals.remove(&handle).is_some() {
            self.cleared += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_per_period() {
        let mut ticker = ManualTicker::new();
        let handle = ticker.start_interval(1000);

        ticker.advance(999.0);
        assert_eq!(ticker.pop_due(), None);

        ticker.advance(1.0);
        assert_eq!(ticker.pop_due(), Some(handle));
        assert_eq!(ticker.pop_due(), None);

        ticker.advance(2500.0);
        assert_eq!(ticker.pop_due(), Some(handle));
        assert_eq!(ticker.pop_due(), Some(handle));
        assert_eq!(ticker.pop_due(), None);
        assert_eq!(ticker.now_ms(), 3000.0);
    }

    #[test]
    fn test_cleared_interval_never_fires() {
        let mut ticker = ManualTicker::new();
        let handle = ticker.start_interval(100);
        ticker.clear_interval(handle);
        ticker.clear_interval(handle);
        ticker.advance(1000.0);
        assert_eq!(ticker.pop_due(), None);
        assert_eq!(ticker.cleared_count(), 1);
        assert!(!ticker.is_active(handle));
    }

    #[test]
    fn test_interleaved_in_time_order() {
        let mut ticker = ManualTicker::new();
        let slow = ticker.start_interval(300);
        let fast = ticker.start_interval(200);
        ticker.advance(600.0);
        let order: Vec<_> = std::iter::from_fn(|| ticker.pop_due()).collect();
        assert_eq!(order, vec![fast, slow, fast, slow, fast]);
    }
}
