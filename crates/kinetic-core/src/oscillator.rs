//! Closed-form damped harmonic oscillator
//!
//! Position and velocity are evaluated analytically for any elapsed time, so
//! there is no integration step and no accumulated error. Every parameter
//! change re-derives the coefficients from the position and velocity at the
//! moment of the change, which keeps motion continuous across retargets.

use std::f64::consts::PI;

use crate::error::{ensure_finite, Error, Result};

/// Lower bound for the damped friction term at critical damping
const MIN_DAMPED_FRICTION: f64 = 1e-5;

/// Displacements below this are treated as zero when solving the phase
const ZERO_DISPLACEMENT: f64 = 1e-5;

/// Coefficients of the closed-form solution, relative to the target
#[derive(Debug, Clone, Copy, PartialEq)]
enum Coefficients {
    /// No restoring force: velocity decays exponentially, position drifts
    Free { offset: f64, velocity: f64 },
    /// `A·e^(−ft/2)·cos(ωd·t − φ)`
    Underdamped {
        damped_angular_frequency: f64,
        phase: f64,
        amplitude: f64,
    },
    /// `a1·e^(λ1·t) + a2·e^(λ2·t)`
    Overdamped { damped_friction: f64, a1: f64, a2: f64 },
}

/// Damped harmonic oscillator with unit mass
///
/// `target == None` is an uncontrolled oscillator: only friction acts on it,
/// which is what free-coasting motion without an endpoint looks like.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oscillator {
    damping_ratio: f64,
    friction: f64,
    period: f64,
    target: Option<f64>,
    coefficients: Coefficients,
}

/// Friction for a given damping ratio and undamped period
#[inline]
pub fn friction_for(damping_ratio: f64, period: f64) -> f64 {
    damping_ratio * (4.0 * PI / period)
}

fn validate_damping_ratio(damping_ratio: f64) -> Result<f64> {
    let damping_ratio = ensure_finite("damping_ratio", damping_ratio)?;
    if damping_ratio < 0.0 {
        return Err(Error::invalid("damping_ratio", "must not be negative"));
    }
    Ok(damping_ratio)
}

fn validate_period(period: f64) -> Result<f64> {
    let period = ensure_finite("period", period)?;
    if period <= 0.0 {
        return Err(Error::invalid("period", format!("must be positive, got {}", period)));
    }
    Ok(period)
}

impl Oscillator {
    /// Create an oscillator at rest at 0 with target 0
    pub fn new(damping_ratio: f64, period: f64) -> Result<Self> {
        let damping_ratio = validate_damping_ratio(damping_ratio)?;
        let period = validate_period(period)?;
        let mut oscillator = Self {
            damping_ratio,
            friction: friction_for(damping_ratio, period),
            period,
            target: Some(0.0),
            coefficients: Coefficients::Free {
                offset: 0.0,
                velocity: 0.0,
            },
        };
        oscillator.hydrate(0.0, 0.0)?;
        Ok(oscillator)
    }

    pub fn damping_ratio(&self) -> f64 {
        self.damping_ratio
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn target(&self) -> Option<f64> {
        self.target
    }

    fn undamped_angular_frequency(&self) -> f64 {
        if self.damping_ratio == 0.0 {
            2.0 * PI / self.period
        } else {
            self.friction / self.damping_ratio / 2.0
        }
    }

    /// Re-derive coefficients so that the motion starts at the given state
    fn hydrate(&mut self, initial_value: f64, initial_velocity: f64) -> Result<()> {
        let friction = self.friction;

        let coefficients = match self.target {
            None => Coefficients::Free {
                offset: initial_value
                    + if friction == 0.0 {
                        0.0
                    } else {
                        initial_velocity / friction
                    },
                velocity: initial_velocity,
            },
            Some(target) => {
                let x = initial_value - target;
                let v = initial_velocity;
                let omega0 = self.undamped_angular_frequency();

                if self.damping_ratio < 1.0 {
                    let omega_d = omega0 * (1.0 - self.damping_ratio * self.damping_ratio).sqrt();
                    let phase = (2.0 * v + friction * x).atan2(2.0 * x * omega_d);
                    let amplitude = if x.abs() < ZERO_DISPLACEMENT {
                        v.signum() * v / omega_d
                    } else {
                        x / phase.cos()
                    };
                    Coefficients::Underdamped {
                        damped_angular_frequency: omega_d,
                        phase,
                        amplitude,
                    }
                } else {
                    let damped_friction = MIN_DAMPED_FRICTION
                        .max(((friction / 2.0).powi(2) - omega0 * omega0).sqrt() * 2.0);
                    let a1 = (-2.0 * v + x * (-friction + damped_friction)) / (2.0 * damped_friction);
                    let a2 = (2.0 * v + x * (friction + damped_friction)) / (2.0 * damped_friction);
                    Coefficients::Overdamped {
                        damped_friction,
                        a1,
                        a2,
                    }
                }
            }
        };

        let finite = match coefficients {
            Coefficients::Free { offset, velocity } => offset.is_finite() && velocity.is_finite(),
            Coefficients::Underdamped {
                damped_angular_frequency,
                phase,
                amplitude,
            } => damped_angular_frequency.is_finite() && phase.is_finite() && amplitude.is_finite(),
            Coefficients::Overdamped {
                damped_friction,
                a1,
                a2,
            } => damped_friction.is_finite() && a1.is_finite() && a2.is_finite(),
        };
        if !finite {
            return Err(Error::invalid(
                "oscillator",
                format!(
                    "parameters produce non-finite coefficients (damping_ratio={}, friction={})",
                    self.damping_ratio, friction
                ),
            ));
        }

        self.coefficients = coefficients;
        Ok(())
    }

    /// Position at elapsed time `t`
    pub fn value(&self, t: f64) -> f64 {
        let friction = self.friction;
        match (self.coefficients, self.target) {
            (Coefficients::Free { offset, velocity }, _) => {
                if friction == 0.0 {
                    offset + t * velocity
                } else {
                    // v' = -cv  =>  v = k·e^(-ct), x = -k·e^(-ct)/c + C
                    offset - velocity * (-t * friction).exp() / friction
                }
            }
            (
                Coefficients::Underdamped {
                    damped_angular_frequency,
                    phase,
                    amplitude,
                },
                target,
            ) => {
                amplitude * (-t * friction / 2.0).exp() * (damped_angular_frequency * t - phase).cos()
                    + target.unwrap_or(0.0)
            }
            (
                Coefficients::Overdamped {
                    damped_friction,
                    a1,
                    a2,
                },
                target,
            ) => {
                a1 * (t * (-friction - damped_friction) / 2.0).exp()
                    + a2 * (t * (-friction + damped_friction) / 2.0).exp()
                    + target.unwrap_or(0.0)
            }
        }
    }

    /// Velocity at elapsed time `t`
    pub fn velocity(&self, t: f64) -> f64 {
        let friction = self.friction;
        match self.coefficients {
            Coefficients::Free { velocity, .. } => velocity * (-t * friction).exp(),
            Coefficients::Underdamped {
                damped_angular_frequency: omega_d,
                phase,
                amplitude,
            } => {
                let decay = (-t * friction / 2.0).exp();
                let angle = omega_d * t - phase;
                amplitude * (-friction / 2.0 * decay * angle.cos() - omega_d * decay * angle.sin())
            }
            Coefficients::Overdamped {
                damped_friction,
                a1,
                a2,
            } => {
                let l1 = (-friction - damped_friction) / 2.0;
                let l2 = (-friction + damped_friction) / 2.0;
                a1 * l1 * (t * l1).exp() + a2 * l2 * (t * l2).exp()
            }
        }
    }

    /// Position and velocity at elapsed time `t`
    #[inline]
    pub fn evaluate(&self, t: f64) -> (f64, f64) {
        (self.value(t), self.velocity(t))
    }

    /// Apply a parameter change at `t`, keeping position and velocity
    ///
    /// The change is staged on a copy so a rejected parameter leaves the
    /// oscillator untouched.
    fn reparameterize(
        &mut self,
        t: f64,
        change: impl FnOnce(&mut Self, f64, f64) -> Result<(f64, f64)>,
    ) -> Result<()> {
        let (value, velocity) = self.evaluate(t);
        let mut next = *self;
        let (value, velocity) = change(&mut next, value, velocity)?;
        next.hydrate(value, velocity)?;
        *self = next;
        Ok(())
    }

    /// Change the target (or release it with `None`) at elapsed time `t`
    pub fn retarget(&mut self, t: f64, target: Option<f64>) -> Result<()> {
        if let Some(target) = target {
            ensure_finite("target", target)?;
        }
        self.reparameterize(t, |osc, value, velocity| {
            osc.target = target;
            Ok((value, velocity))
        })
    }

    /// Replace the velocity at elapsed time `t`
    pub fn reset_velocity(&mut self, t: f64, velocity: f64) -> Result<()> {
        let velocity = ensure_finite("velocity", velocity)?;
        self.reparameterize(t, |_, value, _| Ok((value, velocity)))
    }

    /// Replace the position at elapsed time `t`
    pub fn reset_value(&mut self, t: f64, value: f64) -> Result<()> {
        let value = ensure_finite("value", value)?;
        self.reparameterize(t, |_, _, velocity| Ok((value, velocity)))
    }

    /// Change the damping ratio, keeping the undamped period
    pub fn reset_damping_ratio(&mut self, t: f64, damping_ratio: f64) -> Result<()> {
        let damping_ratio = validate_damping_ratio(damping_ratio)?;
        self.reparameterize(t, |osc, value, velocity| {
            osc.damping_ratio = damping_ratio;
            osc.friction = friction_for(damping_ratio, osc.period);
            Ok((value, velocity))
        })
    }

    /// Change friction directly; the period follows when the ratio allows it
    pub fn reset_friction(&mut self, t: f64, friction: f64) -> Result<()> {
        let friction = ensure_finite("friction", friction)?;
        if friction < 0.0 {
            return Err(Error::invalid("friction", "must not be negative"));
        }
        self.reparameterize(t, |osc, value, velocity| {
            osc.friction = friction;
            if osc.damping_ratio > 0.0 && friction > 0.0 {
                osc.period = osc.damping_ratio * 4.0 * PI / friction;
            }
            Ok((value, velocity))
        })
    }

    /// Change the undamped period
    pub fn reset_period(&mut self, t: f64, period: f64) -> Result<()> {
        let period = validate_period(period)?;
        self.reparameterize(t, |osc, value, velocity| {
            osc.period = period;
            osc.friction = friction_for(osc.damping_ratio, period);
            Ok((value, velocity))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-6;

    fn at_rest(damping_ratio: f64, period: f64, value: f64) -> Oscillator {
        let mut osc = Oscillator::new(damping_ratio, period).unwrap();
        osc.reset_value(0.0, value).unwrap();
        osc.retarget(0.0, Some(value)).unwrap();
        osc
    }

    #[test]
    fn test_starts_at_initial_state() {
        for ratio in [0.3, 0.8, 1.0, 2.5] {
            let mut osc = at_rest(ratio, 0.3, 5.0);
            osc.retarget(0.0, Some(10.0)).unwrap();
            assert!((osc.value(0.0) - 5.0).abs() < TOL, "ratio {}", ratio);
            assert!(osc.velocity(0.0).abs() < TOL, "ratio {}", ratio);
        }
    }

    #[test]
    fn test_retarget_is_continuous() {
        for ratio in [0.0, 0.2, 0.8, 1.0, 1.7] {
            let mut osc = at_rest(ratio, 0.4, 0.0);
            osc.retarget(0.0, Some(100.0)).unwrap();

            let t = 0.137;
            let (value, velocity) = osc.evaluate(t);
            osc.retarget(t, Some(-40.0)).unwrap();
            // Coefficients are now relative to the new start, i.e. elapsed 0
            let (after_value, after_velocity) = osc.evaluate(0.0);
            assert!((value - after_value).abs() < 1e-4, "ratio {}: {} vs {}", ratio, value, after_value);
            assert!(
                (velocity - after_velocity).abs() < 1e-3,
                "ratio {}: {} vs {}",
                ratio,
                velocity,
                after_velocity
            );
        }
    }

    #[test]
    fn test_period_and_ratio_changes_are_continuous() {
        let mut osc = at_rest(0.5, 0.3, 0.0);
        osc.retarget(0.0, Some(1.0)).unwrap();
        let t = 0.05;
        let (value, velocity) = osc.evaluate(t);

        let mut by_period = osc;
        by_period.reset_period(t, 1.2).unwrap();
        assert!((by_period.value(0.0) - value).abs() < 1e-4);
        assert!((by_period.velocity(0.0) - velocity).abs() < 1e-3);

        let mut by_ratio = osc;
        by_ratio.reset_damping_ratio(t, 1.4).unwrap();
        assert!((by_ratio.value(0.0) - value).abs() < 1e-4);
        assert!((by_ratio.velocity(0.0) - velocity).abs() < 1e-3);
    }

    #[test]
    fn test_underdamped_overshoots() {
        let mut osc = at_rest(0.3, 0.5, 0.0);
        osc.retarget(0.0, Some(1.0)).unwrap();
        let peak = (0..200)
            .map(|i| osc.value(i as f64 * 0.005))
            .fold(f64::MIN, f64::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_critically_damped_does_not_overshoot() {
        let mut osc = at_rest(1.0, 0.3, 0.0);
        osc.retarget(0.0, Some(1.0)).unwrap();
        for i in 0..400 {
            let v = osc.value(i as f64 * 0.005);
            assert!(v <= 1.0 + 1e-6, "overshoot {} at step {}", v, i);
        }
        assert!((osc.value(3.0) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_uncontrolled_decay() {
        let mut osc = at_rest(1.0, 0.3, 2.0);
        osc.reset_velocity(0.0, 10.0).unwrap();
        osc.retarget(0.0, None).unwrap();
        let f = osc.friction();
        let resting = 2.0 + 10.0 / f;
        assert!((osc.value(0.0) - 2.0).abs() < TOL);
        assert!((osc.value(50.0) - resting).abs() < 1e-6);
        assert!(osc.velocity(50.0).abs() < 1e-6);
    }

    #[test]
    fn test_uncontrolled_without_friction_is_linear() {
        let mut osc = at_rest(0.0, 0.3, 1.0);
        osc.reset_velocity(0.0, 2.0).unwrap();
        osc.retarget(0.0, None).unwrap();
        assert!((osc.value(1.5) - 4.0).abs() < TOL);
        assert!((osc.velocity(1.5) - 2.0).abs() < TOL);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(Oscillator::new(1.0, 0.0).is_err());
        assert!(Oscillator::new(-0.1, 0.3).is_err());
        assert!(Oscillator::new(f64::NAN, 0.3).is_err());

        let mut osc = at_rest(1.0, 0.3, 0.0);
        let before = osc;
        assert!(osc.reset_period(0.1, -1.0).is_err());
        assert!(osc.retarget(0.1, Some(f64::INFINITY)).is_err());
        assert!(osc.reset_value(0.1, f64::NAN).is_err());
        assert_eq!(osc, before);
    }
}
