//! Tick wheel scroll physics
//!
//! A drum of discrete ticks driven two ways: direct manipulation (pointer
//! drag, wheel deltas) moves the position immediately and records a velocity,
//! and a per-frame loop coasts on that velocity under friction. Once the
//! wheel is released the loop re-snaps to the nearest tick as it passes
//! and steers the remaining fraction back to zero, with less steering the
//! faster it spins so flicks travel further before settling.
//!
//! The position is always `value + float_delta`: `value` is the committed
//! tick, `float_delta` the fractional offset from it.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Physics constants; defaults reproduce the stock wheel feel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelParams {
    /// Drum radius in pixels, maps pointer x to an angle
    #[serde(default = "default_radius")]
    pub radius: f64,
    /// Angle between ticks in degrees
    #[serde(default = "default_tick_angle")]
    pub tick_angle_deg: f64,
    /// Releases with less travel than this (in ticks) are taps
    #[serde(default = "default_tap_threshold")]
    pub tap_threshold: f64,
    /// Wheel delta pixels per tick
    #[serde(default = "default_wheel_divisor")]
    pub wheel_divisor: f64,
    /// Largest simulated step in seconds
    #[serde(default = "default_max_dt")]
    pub max_dt: f64,
    /// Proportional velocity decay per second
    #[serde(default = "default_damping")]
    pub damping: f64,
    /// Steering gain at rest
    #[serde(default = "default_steering")]
    pub steering: f64,
    /// `|float_delta| + |velocity|` below which the loop stops
    #[serde(default = "default_stop_threshold")]
    pub stop_threshold: f64,
    /// Ticks rendered on each side of the current one
    #[serde(default = "default_visible_range")]
    pub visible_range: u32,
}

impl Default for WheelParams {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            tick_angle_deg: default_tick_angle(),
            tap_threshold: default_tap_threshold(),
            wheel_divisor: default_wheel_divisor(),
            max_dt: default_max_dt(),
            damping: default_damping(),
            steering: default_steering(),
            stop_threshold: default_stop_threshold(),
            visible_range: default_visible_range(),
        }
    }
}

fn default_radius() -> f64 {
    300.0
}

fn default_tick_angle() -> f64 {
    10.0
}

fn default_tap_threshold() -> f64 {
    0.2
}

fn default_wheel_divisor() -> f64 {
    50.0
}

fn default_max_dt() -> f64 {
    1.0 / 40.0
}

fn default_damping() -> f64 {
    20.0
}

fn default_steering() -> f64 {
    60.0
}

fn default_stop_threshold() -> f64 {
    0.01
}

fn default_visible_range() -> u32 {
    7
}

impl WheelParams {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("radius", self.radius),
            ("tick_angle_deg", self.tick_angle_deg),
            ("wheel_divisor", self.wheel_divisor),
            ("max_dt", self.max_dt),
            ("stop_threshold", self.stop_threshold),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::invalid(name, format!("must be positive, got {}", value)));
            }
        }
        let non_negative = [
            ("tap_threshold", self.tap_threshold),
            ("damping", self.damping),
            ("steering", self.steering),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::invalid(name, format!("must not be negative, got {}", value)));
            }
        }
        Ok(())
    }

    /// Tick angle in radians
    pub fn tick_angle(&self) -> f64 {
        self.tick_angle_deg.to_radians()
    }
}

/// Committed tick changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WheelChange {
    pub from: i64,
    pub to: i64,
}

/// One tick as rendered on the drum
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleTick {
    pub value: i64,
    pub label: String,
    /// Rotation about the drum axis in radians
    pub rotation: f64,
    pub opacity: f64,
    pub is_current: bool,
}

/// Nearest tick, halves rounding up
pub fn snap(position: f64) -> i64 {
    (position + 0.5).floor() as i64
}

/// Maps a continuous position to the tick it commits to
pub type SnapFn = fn(f64) -> i64;

#[derive(Debug, Clone, Copy)]
struct ActiveLoop {
    token: u64,
    last_time: f64,
}

#[derive(Debug, Clone, Copy)]
struct PointerState {
    moved: f64,
    angle: f64,
    time: f64,
}

/// Tick wheel state machine
#[derive(Debug, Clone)]
pub struct TickWheel {
    params: WheelParams,
    snap: SnapFn,
    value: i64,
    float_delta: f64,
    velocity: f64,
    free_target: bool,
    active: Option<ActiveLoop>,
    next_token: u64,
    pointer: Option<PointerState>,
}

impl TickWheel {
    pub fn new(value: i64, params: WheelParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            snap,
            value,
            float_delta: 0.0,
            velocity: 0.0,
            free_target: false,
            active: None,
            next_token: 1,
            pointer: None,
        })
    }

    pub fn with_defaults(value: i64) -> Self {
        Self {
            params: WheelParams::default(),
            snap,
            value,
            float_delta: 0.0,
            velocity: 0.0,
            free_target: false,
            active: None,
            next_token: 1,
            pointer: None,
        }
    }

    /// Replace the snapping rule, e.g. to skip ticks
    pub fn with_snap(mut self, snap: SnapFn) -> Self {
        self.snap = snap;
        self
    }

    pub fn params(&self) -> &WheelParams {
        &self.params
    }

    /// Committed tick
    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn float_delta(&self) -> f64 {
        self.float_delta
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Continuous position in ticks
    pub fn position(&self) -> f64 {
        self.value as f64 + self.float_delta
    }

    /// Whether the frame loop wants frames
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Token of the running loop; changes whenever the loop restarts
    pub fn loop_token(&self) -> Option<u64> {
        self.active.map(|a| a.token)
    }

    /// Released and coasting toward a tick of its own choosing
    pub fn is_free(&self) -> bool {
        self.free_target
    }

    pub fn is_dragging(&self) -> bool {
        self.pointer.is_some()
    }

    fn start_loop(&mut self, now: f64) {
        if self.active.is_some() {
            return;
        }
        let token = self.next_token;
        self.next_token += 1;
        self.active = Some(ActiveLoop {
            token,
            last_time: now,
        });
        debug!(token, value = self.value, "Wheel loop started");
    }

    fn stop_loop(&mut self) {
        self.active = None;
    }

    /// Commit a new tick, reporting the change if there is one
    fn commit(&mut self, tick: i64) -> Option<WheelChange> {
        if tick == self.value {
            return None;
        }
        let change = WheelChange {
            from: self.value,
            to: tick,
        };
        self.value = tick;
        Some(change)
    }

    /// Move to `position`, committing the nearest tick
    fn move_to(&mut self, position: f64) -> Option<WheelChange> {
        let snapped = (self.snap)(position);
        let change = self.commit(snapped);
        self.float_delta = position - snapped as f64;
        change
    }

    fn angle(&self, x: f64) -> f64 {
        (x / self.params.radius).clamp(-1.0, 1.0).asin()
    }

    /// Pointer pressed at `x` pixels from the drum center
    pub fn pointer_down(&mut self, x: f64, now: f64) {
        self.pointer = Some(PointerState {
            moved: 0.0,
            angle: self.angle(x),
            time: now,
        });
        self.stop_loop();
    }

    pub fn pointer_move(&mut self, x: f64, now: f64) -> Option<WheelChange> {
        let angle = self.angle(x);
        let tick_angle = self.params.tick_angle();
        let pointer = self.pointer.as_mut()?;

        let d_tick = (pointer.angle - angle) / tick_angle;
        let d_time = now - pointer.time;
        pointer.angle = angle;
        pointer.time = now;
        pointer.moved += d_tick;

        let change = self.move_to(self.position() + d_tick);
        if d_time > 0.0 {
            self.velocity = d_tick / d_time;
        }
        change
    }

    /// Pointer released: a tap jumps to the tapped tick, a drag is let go
    pub fn pointer_up(&mut self, x: f64, now: f64) -> Option<WheelChange> {
        let pointer = self.pointer.take()?;

        if pointer.moved.abs() < self.params.tap_threshold {
            let d_tick = self.angle(x) / self.params.tick_angle();
            let tapped = (self.snap)(self.position() + d_tick);
            debug!(tapped, "Wheel tap");
            self.free_target = false;
            return self.set_value(tapped, now);
        }

        let velocity = self.velocity;
        self.release(self.position(), velocity, now)
    }

    /// Let go at `position` with `velocity` ticks per second
    pub fn release(&mut self, position: f64, velocity: f64, now: f64) -> Option<WheelChange> {
        self.pointer = None;
        let change = self.move_to(position);
        self.velocity = velocity;
        self.stop_loop();
        self.start_loop(now);
        self.free_target = true;
        change
    }

    /// Wheel input, `delta_x` in pixels
    pub fn wheel(&mut self, delta_x: f64, now: f64) -> Option<WheelChange> {
        let d_tick = delta_x / self.params.wheel_divisor;
        let position = self.position() + d_tick;
        self.stop_loop();
        let change = self.move_to(position);
        self.velocity = d_tick;
        self.start_loop(now);
        self.free_target = true;
        change
    }

    /// External value change
    ///
    /// The visible position is kept, so the wheel glides to the new tick
    /// instead of jumping there.
    pub fn set_value(&mut self, value: i64, now: f64) -> Option<WheelChange> {
        let position = self.position();
        let change = self.commit(value);
        self.float_delta = position - value as f64;
        if !self.free_target && self.float_delta != 0.0 {
            self.start_loop(now);
        }
        change
    }

    /// Relabel the committed tick without moving the wheel
    ///
    /// For owners that normalise values, e.g. month 12 becoming month 0 of
    /// the next year. The offset from the committed tick is kept.
    pub fn rebase(&mut self, value: i64, now: f64) {
        if value == self.value {
            return;
        }
        debug!(from = self.value, to = value, "Wheel rebased");
        self.value = value;
        if !self.free_target && self.float_delta != 0.0 {
            self.start_loop(now);
        }
    }

    /// Advance the frame loop to `now`
    pub fn frame(&mut self, now: f64) -> Option<WheelChange> {
        let active = self.active.as_mut()?;
        let dt = (now - active.last_time).clamp(0.0, self.params.max_dt);
        active.last_time = now;

        let p = self.params;
        self.float_delta += self.velocity * dt;
        self.velocity -= self.velocity * p.damping * dt;

        let mut change = None;
        if self.free_target {
            change = self.move_to(self.position());
        }

        let gain = (p.steering - self.velocity.abs()).max(0.0);
        self.velocity += gain * (0.0 - self.float_delta) * dt;

        if self.float_delta.abs() + self.velocity.abs() < p.stop_threshold {
            self.float_delta = 0.0;
            self.velocity = 0.0;
            self.free_target = false;
            self.stop_loop();
            debug!(value = self.value, "Wheel settled");
        }
        change
    }

    /// Run the loop at a fixed frame step until it stops
    ///
    /// Returns the time reached and every tick change on the way.
    pub fn settle(&mut self, start: f64, frame_step: f64, max_frames: usize) -> (f64, Vec<WheelChange>) {
        let mut changes = Vec::new();
        let mut now = start;
        for _ in 0..max_frames {
            if !self.is_running() {
                break;
            }
            now += frame_step;
            if let Some(change) = self.frame(now) {
                changes.push(change);
            }
        }
        (now, changes)
    }

    /// Ticks on the visible half of the drum, current tick first
    pub fn visible_ticks(&self) -> Vec<VisibleTick> {
        self.visible_ticks_with(|value| value.to_string())
    }

    /// Like [`visible_ticks`](Self::visible_ticks) with custom labels
    pub fn visible_ticks_with(&self, label: impl Fn(i64) -> String) -> Vec<VisibleTick> {
        let position = self.position();
        let base = (self.snap)(position);
        let tick_angle = self.params.tick_angle();
        let range = self.params.visible_range as i64;

        let mut offsets = vec![0];
        for d in 1..=range {
            offsets.push(d);
            offsets.push(-d);
        }

        offsets
            .into_iter()
            .filter_map(|d| {
                let value = base + d;
                let rotation = (value as f64 - position) * tick_angle;
                if rotation.abs() > FRAC_PI_2 {
                    return None;
                }
                Some(VisibleTick {
                    value,
                    label: label(value),
                    rotation,
                    opacity: 1.0 - rotation.abs() / FRAC_PI_2,
                    is_current: value == self.value,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 1.0 / 60.0;

    fn released_at(offset: f64) -> TickWheel {
        let mut wheel = TickWheel::with_defaults(10);
        wheel.release(10.0 + offset, 0.0, 0.0);
        wheel.settle(0.0, FRAME, 600);
        wheel
    }

    #[test]
    fn test_snap_rounds_half_up() {
        assert_eq!(snap(0.49), 0);
        assert_eq!(snap(0.5), 1);
        assert_eq!(snap(-0.5), 0);
        assert_eq!(snap(-0.51), -1);
    }

    #[test]
    fn test_release_below_half_stays() {
        let wheel = released_at(0.49);
        assert_eq!(wheel.value(), 10);
        assert_eq!(wheel.float_delta(), 0.0);
        assert!(!wheel.is_running());
    }

    #[test]
    fn test_release_above_half_advances() {
        let wheel = released_at(0.51);
        assert_eq!(wheel.value(), 11);
        assert_eq!(wheel.float_delta(), 0.0);
        assert_eq!(wheel.velocity(), 0.0);
    }

    #[test]
    fn test_flick_coasts_past_several_ticks() {
        let mut wheel = TickWheel::with_defaults(0);
        let change = wheel.release(0.0, 40.0, 0.0);
        assert!(change.is_none());
        let (_, changes) = wheel.settle(0.0, FRAME, 600);
        assert!(!wheel.is_running());
        assert!(wheel.value() >= 1, "value: {}", wheel.value());
        assert_eq!(changes.last().map(|c| c.to), Some(wheel.value()));
    }

    #[test]
    fn test_drag_moves_directly() {
        let mut wheel = TickWheel::with_defaults(0);
        wheel.pointer_down(0.0, 0.0);
        assert!(wheel.is_dragging());

        // Six degrees of drum rotation is 0.6 ticks
        let x = -300.0 * 6f64.to_radians().sin();
        let change = wheel.pointer_move(x, 0.1);
        assert_eq!(change, Some(WheelChange { from: 0, to: 1 }));
        assert!((wheel.position() - 0.6).abs() < 1e-9);
        assert!((wheel.velocity() - 6.0).abs() < 1e-9);
        assert!(!wheel.is_running());

        wheel.pointer_up(x, 0.1);
        assert!(wheel.is_free());
        wheel.settle(0.1, FRAME, 600);
        assert!(!wheel.is_dragging());
        assert!(!wheel.is_running());
    }

    #[test]
    fn test_tap_jumps_to_tapped_tick() {
        let mut wheel = TickWheel::with_defaults(5);
        let x = 300.0 * 20f64.to_radians().sin();
        wheel.pointer_down(x, 0.0);
        let change = wheel.pointer_up(x, 0.05);
        assert_eq!(change, Some(WheelChange { from: 5, to: 7 }));
        assert!(!wheel.is_free());

        // Glides from the old position
        assert!((wheel.position() - 5.0).abs() < 1e-9);
        wheel.settle(0.05, FRAME, 600);
        assert_eq!(wheel.position(), 7.0);
    }

    #[test]
    fn test_tap_after_wheel_input_settles_on_tick() {
        let mut wheel = TickWheel::with_defaults(0);
        wheel.wheel(30.0, 0.0);
        wheel.frame(FRAME);

        let x = 300.0 * 20f64.to_radians().sin();
        wheel.pointer_down(x, 2.0 * FRAME);
        let change = wheel.pointer_up(x, 3.0 * FRAME);
        assert_eq!(change.map(|c| c.to), Some(3));
        assert!(!wheel.is_free());
        assert!(wheel.is_running());

        wheel.settle(3.0 * FRAME, FRAME, 600);
        assert_eq!(wheel.value(), 3);
        assert_eq!(wheel.float_delta(), 0.0);
        assert!(!wheel.is_running());
    }

    #[test]
    fn test_tap_on_current_tick_resumes_settling() {
        let mut wheel = TickWheel::with_defaults(0);
        wheel.wheel(30.0, 0.0);
        wheel.frame(FRAME);
        assert_ne!(wheel.float_delta(), 0.0);

        wheel.pointer_down(0.0, 2.0 * FRAME);
        let change = wheel.pointer_up(0.0, 3.0 * FRAME);
        assert!(change.is_none());
        assert!(wheel.is_running());

        wheel.settle(3.0 * FRAME, FRAME, 600);
        assert_eq!(wheel.value(), 1);
        assert_eq!(wheel.position(), 1.0);
    }

    #[test]
    fn test_wheel_input() {
        let mut wheel = TickWheel::with_defaults(0);
        let change = wheel.wheel(30.0, 0.0);
        assert_eq!(change, Some(WheelChange { from: 0, to: 1 }));
        assert!((wheel.float_delta() + 0.4).abs() < 1e-9);
        assert!((wheel.velocity() - 0.6).abs() < 1e-9);
        assert!(wheel.is_free());

        wheel.settle(0.0, FRAME, 600);
        assert_eq!(wheel.value(), 1);
        assert!(!wheel.is_running());
    }

    #[test]
    fn test_direct_manipulation_stops_loop() {
        let mut wheel = TickWheel::with_defaults(0);
        wheel.wheel(30.0, 0.0);
        let token = wheel.loop_token();
        assert!(token.is_some());

        wheel.pointer_down(0.0, 0.01);
        assert!(!wheel.is_running());
        assert!(wheel.frame(0.02).is_none());

        wheel.wheel(-30.0, 0.03);
        assert_ne!(wheel.loop_token(), token);
    }

    #[test]
    fn test_frame_step_is_capped() {
        let mut wheel = TickWheel::with_defaults(0);
        wheel.release(0.0, 1.0, 0.0);
        wheel.frame(10.0);
        // One capped step of 1/40s, not ten seconds of coasting
        assert!(wheel.position() < 0.05);
    }

    #[test]
    fn test_visible_ticks() {
        let wheel = TickWheel::with_defaults(3);
        let ticks = wheel.visible_ticks();
        assert_eq!(ticks.len(), 15);
        assert_eq!(ticks[0].value, 3);
        assert!(ticks[0].is_current);
        assert_eq!(ticks[0].opacity, 1.0);

        let edge = ticks.iter().find(|t| t.value == 10).unwrap();
        assert!((edge.rotation - 70f64.to_radians()).abs() < 1e-9);
        assert!((edge.opacity - (1.0 - 70.0 / 90.0)).abs() < 1e-9);
    }

    #[test]
    fn test_visible_ticks_culled_beyond_quarter_turn() {
        let params = WheelParams {
            tick_angle_deg: 25.0,
            ..Default::default()
        };
        let wheel = TickWheel::new(0, params).unwrap();
        let ticks = wheel.visible_ticks();
        assert!(ticks.iter().all(|t| t.rotation.abs() <= FRAC_PI_2));
        assert_eq!(ticks.len(), 7);
    }

    #[test]
    fn test_custom_snap_skips_odd_ticks() {
        fn even(position: f64) -> i64 {
            2 * snap(position / 2.0)
        }
        let mut wheel = TickWheel::with_defaults(0).with_snap(even);
        let change = wheel.release(1.2, 0.0, 0.0);
        assert_eq!(change, Some(WheelChange { from: 0, to: 2 }));
        wheel.settle(0.0, FRAME, 600);
        assert_eq!(wheel.value(), 2);
        assert_eq!(wheel.float_delta(), 0.0);
        assert!(wheel.visible_ticks().iter().any(|t| t.value == 3));
    }

    #[test]
    fn test_labels_and_rebase() {
        let mut wheel = TickWheel::with_defaults(11);
        wheel.wheel(30.0, 0.0);
        assert_eq!(wheel.value(), 12);
        let offset = wheel.float_delta();

        wheel.rebase(0, 0.0);
        assert_eq!(wheel.value(), 0);
        assert_eq!(wheel.float_delta(), offset);

        let ticks = wheel.visible_ticks_with(|v| format!("m{}", v.rem_euclid(12)));
        assert_eq!(ticks[0].label, "m0");
        assert_eq!(wheel.visible_ticks()[0].label, "0");
    }

    #[test]
    fn test_invalid_params() {
        let params = WheelParams {
            radius: 0.0,
            ..Default::default()
        };
        assert!(TickWheel::new(0, params).is_err());
    }
}
