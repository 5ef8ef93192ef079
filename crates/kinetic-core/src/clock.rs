//! Time sources for the animation engine
//!
//! All engine times are seconds as `f64`. Hosts normally hand the engine the
//! [`Timeline`](crate::timeline::Timeline) as its clock so that sampled
//! keyframes line up with the compositor; [`WallClock`] is the fallback.

use std::cell::Cell;
use std::rc::Rc;

/// Source of "now" in seconds
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall-clock time in seconds since the Unix epoch
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Clock for WallClock {
    #[inline]
    fn now(&self) -> f64 {
        chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// Clock that only moves when told to
///
/// Clones share the same underlying time, so a host can keep one handle and
/// give another to an animator.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            time: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, time: f64) {
        self.time.set(time);
    }

    /// Move forward by `dt` seconds and return the new time
    pub fn advance(&self, dt: f64) -> f64 {
        let next = self.time.get() + dt;
        self.time.set(next);
        next
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> f64 {
        self.time.get()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    #[inline]
    fn now(&self) -> f64 {
        (**self).now()
    }
}
