//! Springs: oscillators anchored to absolute time
//!
//! A [`Spring`] owns an [`Oscillator`] plus the absolute time of its last
//! reset. Consumers talk in absolute seconds; the spring converts to the
//! elapsed time the oscillator expects.

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, Error, Result};
use crate::oscillator::Oscillator;

/// Construction parameters for a spring
///
/// Omitted fields fall back to the defaults: critically damped, 0.3s period,
/// resting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringParams {
    #[serde(default = "default_damping_ratio")]
    pub damping_ratio: f64,
    #[serde(default = "default_period")]
    pub period: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    #[serde(default = "default_motion_threshold")]
    pub motion_threshold: f64,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            damping_ratio: default_damping_ratio(),
            period: default_period(),
            value: None,
            target: None,
            motion_threshold: default_motion_threshold(),
        }
    }
}

impl SpringParams {
    pub fn with_damping_ratio(mut self, damping_ratio: f64) -> Self {
        self.damping_ratio = damping_ratio;
        self
    }

    pub fn with_period(mut self, period: f64) -> Self {
        self.period = period;
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_target(mut self, target: f64) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_motion_threshold(mut self, motion_threshold: f64) -> Self {
        self.motion_threshold = motion_threshold;
        self
    }
}

fn default_damping_ratio() -> f64 {
    1.0
}

fn default_period() -> f64 {
    0.3
}

fn default_motion_threshold() -> f64 {
    1.0 / 1000.0
}

/// Value interpolator driven by a damped harmonic oscillator
#[derive(Debug, Clone)]
pub struct Spring {
    inner: Oscillator,
    damping_ratio: f64,
    period: f64,
    motion_threshold: f64,
    last_reset: f64,
}

impl Spring {
    /// Create a spring whose clock starts at `now`
    pub fn new(params: SpringParams, now: f64) -> Result<Self> {
        let motion_threshold = ensure_finite("motion_threshold", params.motion_threshold)?;
        if motion_threshold <= 0.0 {
            return Err(Error::invalid("motion_threshold", "must be positive"));
        }

        let mut inner = Oscillator::new(params.damping_ratio, params.period)?;
        if let Some(value) = params.value {
            inner.reset_value(0.0, value)?;
        }
        match (params.target, params.value) {
            (Some(target), _) | (None, Some(target)) => inner.retarget(0.0, Some(target))?,
            (None, None) => {}
        }

        Ok(Self {
            inner,
            damping_ratio: params.damping_ratio,
            period: params.period,
            motion_threshold,
            last_reset: now,
        })
    }

    /// Elapsed time since the last reset, never negative
    #[inline]
    fn inner_t(&self, time: f64) -> f64 {
        (time - self.last_reset).max(0.0)
    }

    pub fn target(&self) -> f64 {
        self.inner.target().unwrap_or(0.0)
    }

    pub fn damping_ratio(&self) -> f64 {
        self.damping_ratio
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn motion_threshold(&self) -> f64 {
        self.motion_threshold
    }

    /// Absolute time of the last effective parameter change
    pub fn last_reset(&self) -> f64 {
        self.last_reset
    }

    pub fn set_damping_ratio(&mut self, damping_ratio: f64, time: f64) -> Result<()> {
        if self.damping_ratio == damping_ratio {
            return Ok(());
        }
        self.inner.reset_damping_ratio(self.inner_t(time), damping_ratio)?;
        self.damping_ratio = damping_ratio;
        self.last_reset = time;
        Ok(())
    }

    pub fn set_period(&mut self, period: f64, time: f64) -> Result<()> {
        if self.period == period {
            return Ok(());
        }
        self.inner.reset_period(self.inner_t(time), period)?;
        self.period = period;
        self.last_reset = time;
        Ok(())
    }

    /// Move the target; a no-op (and no clock reset) when unchanged
    pub fn set_target(&mut self, target: f64, time: f64) -> Result<()> {
        if self.inner.target() == Some(target) {
            return Ok(());
        }
        self.inner.retarget(self.inner_t(time), Some(target))?;
        self.last_reset = time;
        Ok(())
    }

    /// Jump to a value, keeping the current velocity
    pub fn set_value(&mut self, value: f64, time: f64) -> Result<()> {
        if self.value(time) == value {
            return Ok(());
        }
        self.inner.reset_value(self.inner_t(time), value)?;
        self.last_reset = time;
        Ok(())
    }

    /// Replace the velocity, keeping the current value
    pub fn set_velocity(&mut self, velocity: f64, time: f64) -> Result<()> {
        if self.velocity(time) == velocity {
            return Ok(());
        }
        self.inner.reset_velocity(self.inner_t(time), velocity)?;
        self.last_reset = time;
        Ok(())
    }

    /// Re-anchor the spring at `time` without changing its motion
    ///
    /// Dependents see a new reset timestamp and regenerate.
    pub fn force_reset(&mut self, time: f64) -> Result<()> {
        self.inner.retarget(self.inner_t(time), Some(self.target()))?;
        self.last_reset = time;
        Ok(())
    }

    /// Value at `time`, exactly the target once settled
    pub fn value(&self, time: f64) -> f64 {
        let t = self.inner_t(time);
        let (value, velocity) = self.inner.evaluate(t);
        let target = self.target();
        if (target - value).abs() + velocity.abs() < self.motion_threshold {
            return target;
        }
        value
    }

    pub fn velocity(&self, time: f64) -> f64 {
        self.inner.velocity(self.inner_t(time))
    }

    /// Whether the motion is below the threshold at `time`
    pub fn should_stop(&self, time: f64) -> bool {
        (self.target() - self.value(time)).abs() + self.velocity(time).abs() < self.motion_threshold
    }
}

/// Stable identity of a shared spring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpringId(u64);

fn next_spring_id() -> SpringId {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    SpringId(NEXT.fetch_add(1, Ordering::Relaxed))
}

/// Shared handle to a spring
///
/// UI state keeps one clone and mutates it; animators keep another and sample
/// it. Equality is identity, not value.
#[derive(Debug, Clone)]
pub struct SpringRef {
    id: SpringId,
    spring: Rc<RefCell<Spring>>,
}

impl PartialEq for SpringRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SpringRef {}

impl SpringRef {
    pub fn new(params: SpringParams, now: f64) -> Result<Self> {
        Ok(Self::from_spring(Spring::new(params, now)?))
    }

    pub fn from_spring(spring: Spring) -> Self {
        Self {
            id: next_spring_id(),
            spring: Rc::new(RefCell::new(spring)),
        }
    }

    pub fn id(&self) -> SpringId {
        self.id
    }

    /// Borrow the spring for reading
    pub fn borrow(&self) -> Ref<'_, Spring> {
        self.spring.borrow()
    }

    pub fn target(&self) -> f64 {
        self.spring.borrow().target()
    }

    pub fn last_reset(&self) -> f64 {
        self.spring.borrow().last_reset()
    }

    pub fn value(&self, time: f64) -> f64 {
        self.spring.borrow().value(time)
    }

    pub fn velocity(&self, time: f64) -> f64 {
        self.spring.borrow().velocity(time)
    }

    pub fn should_stop(&self, time: f64) -> bool {
        self.spring.borrow().should_stop(time)
    }

    pub fn set_target(&self, target: f64, time: f64) -> Result<()> {
        self.spring.borrow_mut().set_target(target, time)
    }

    pub fn set_value(&self, value: f64, time: f64) -> Result<()> {
        self.spring.borrow_mut().set_value(value, time)
    }

    pub fn set_velocity(&self, velocity: f64, time: f64) -> Result<()> {
        self.spring.borrow_mut().set_velocity(velocity, time)
    }

    pub fn set_damping_ratio(&self, damping_ratio: f64, time: f64) -> Result<()> {
        self.spring.borrow_mut().set_damping_ratio(damping_ratio, time)
    }

    pub fn set_period(&self, period: f64, time: f64) -> Result<()> {
        self.spring.borrow_mut().set_period(period, time)
    }

    pub fn force_reset(&self, time: f64) -> Result<()> {
        self.spring.borrow_mut().force_reset(time)
    }
}
