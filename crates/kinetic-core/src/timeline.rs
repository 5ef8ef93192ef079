//! Compositor timeline: keyframe animations played against a shared clock
//!
//! Stands in for the platform animation timeline. Surfaces receive keyframe
//! runs, the host advances time once per frame, and finished runs fire their
//! one-shot callbacks. Callbacks run after the timeline has released its
//! internal state, so they are free to start or cancel animations.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::clock::{Clock, WallClock};
use crate::Result;

/// One-shot callback fired when an animation finishes
pub type FinishCallback = Box<dyn FnOnce() -> Result<()>>;

/// Identifier of a surface registered on a timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(usize);

/// Identifier of one keyframe run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnimationId(u64);

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anim#{}", self.0)
    }
}

/// What a surface shows once its animation has finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    /// Hold the final keyframe
    #[default]
    Forwards,
    /// Drop back to the surface's own style
    None,
}

/// Timing of a keyframe run; keyframes are spread evenly, linear easing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationTiming {
    /// Seconds
    pub duration: f64,
    pub fill: FillMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Running,
    Finished,
    Cancelled,
}

/// Handle to a running keyframe animation
pub trait NativeAnimation {
    fn id(&self) -> AnimationId;

    /// Stop the animation and discard its pending callbacks
    fn cancel(&self);

    /// Register a one-shot callback for when the run finishes
    fn on_finish(&self, callback: FinishCallback);

    fn play_state(&self) -> PlayState;
}

/// Something a keyframe run can be attached to
pub trait Surface<S> {
    /// Whether the surface is currently mounted
    fn is_attached(&self) -> bool;

    fn animate(&self, keyframes: Vec<S>, timing: AnimationTiming) -> Box<dyn NativeAnimation>;
}

struct AnimationRecord<S> {
    surface: SurfaceId,
    keyframes: Vec<S>,
    start: f64,
    timing: AnimationTiming,
    state: PlayState,
    callbacks: Vec<FinishCallback>,
}

impl<S> AnimationRecord<S> {
    fn end(&self) -> f64 {
        self.start + self.timing.duration
    }

    fn frame_at(&self, time: f64) -> Option<&S> {
        let last = self.keyframes.len().checked_sub(1)?;
        if self.timing.duration <= 0.0 || last == 0 {
            return self.keyframes.last();
        }
        let progress = ((time - self.start) / self.timing.duration).clamp(0.0, 1.0);
        let index = (progress * last as f64).round() as usize;
        self.keyframes.get(index.min(last))
    }
}

struct TimelineState<S> {
    current_time: Option<f64>,
    attached: Vec<bool>,
    animations: BTreeMap<AnimationId, AnimationRecord<S>>,
    next_id: u64,
}

impl<S> TimelineState<S> {
    fn now(&self) -> f64 {
        self.current_time.unwrap_or_else(|| WallClock.now())
    }
}

/// Shared animation timeline
///
/// Cloning yields another handle to the same timeline.
pub struct Timeline<S> {
    state: Rc<RefCell<TimelineState<S>>>,
}

impl<S> Clone for Timeline<S> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<S> Default for Timeline<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Timeline<S> {
    /// Timeline that has not started; its clock reads wall time until the
    /// first `advance_to`
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(TimelineState {
                current_time: None,
                attached: Vec::new(),
                animations: BTreeMap::new(),
                next_id: 1,
            })),
        }
    }

    /// Timeline already positioned at `start`
    pub fn starting_at(start: f64) -> Self {
        let timeline = Self::new();
        timeline.state.borrow_mut().current_time = Some(start);
        timeline
    }

    pub fn current_time(&self) -> Option<f64> {
        self.state.borrow().current_time
    }

    /// Register a new, attached surface
    pub fn create_surface(&self) -> SurfaceHandle<S> {
        let mut state = self.state.borrow_mut();
        let id = SurfaceId(state.attached.len());
        state.attached.push(true);
        SurfaceHandle {
            timeline: self.clone(),
            id,
        }
    }

    /// Unmount a surface; its animations are discarded without finishing
    pub fn detach(&self, surface: SurfaceId) {
        let mut state = self.state.borrow_mut();
        if let Some(flag) = state.attached.get_mut(surface.0) {
            *flag = false;
        }
        state.animations.retain(|_, record| record.surface != surface);
    }

    pub fn attach(&self, surface: SurfaceId) {
        if let Some(flag) = self.state.borrow_mut().attached.get_mut(surface.0) {
            *flag = true;
        }
    }

    pub fn is_attached(&self, surface: SurfaceId) -> bool {
        self.state
            .borrow()
            .attached
            .get(surface.0)
            .copied()
            .unwrap_or(false)
    }

    /// Number of running animations on a surface
    pub fn live_animations(&self, surface: SurfaceId) -> usize {
        self.state
            .borrow()
            .animations
            .values()
            .filter(|r| r.surface == surface && r.state == PlayState::Running)
            .count()
    }

    fn play_state(&self, id: AnimationId) -> PlayState {
        self.state
            .borrow()
            .animations
            .get(&id)
            .map(|r| r.state)
            .unwrap_or(PlayState::Cancelled)
    }

    fn cancel(&self, id: AnimationId) {
        if self.state.borrow_mut().animations.remove(&id).is_some() {
            debug!(animation = %id, "Animation cancelled");
        }
    }

    fn add_callback(&self, id: AnimationId, callback: FinishCallback) {
        let mut state = self.state.borrow_mut();
        match state.animations.get_mut(&id) {
            Some(record) if record.state == PlayState::Running => record.callbacks.push(callback),
            _ => debug!(animation = %id, "Finish callback dropped: animation no longer running"),
        }
    }

    fn start(&self, surface: SurfaceId, keyframes: Vec<S>, timing: AnimationTiming) -> AnimationId {
        let mut state = self.state.borrow_mut();
        let id = AnimationId(state.next_id);
        state.next_id += 1;
        let start = state.now();
        state.animations.insert(
            id,
            AnimationRecord {
                surface,
                keyframes,
                start,
                timing,
                state: PlayState::Running,
                callbacks: Vec::new(),
            },
        );
        id
    }

    /// Move the timeline to `now` and fire callbacks of finished runs
    ///
    /// Time never moves backwards. Returns the ids that finished.
    pub fn advance_to(&self, now: f64) -> Vec<AnimationId> {
        let mut fired = Vec::new();
        {
            let mut state = self.state.borrow_mut();
            let now = state.current_time.map_or(now, |t| t.max(now));
            state.current_time = Some(now);

            let mut dropped = Vec::new();
            for (id, record) in state.animations.iter_mut() {
                if record.state == PlayState::Running && now >= record.end() {
                    record.state = PlayState::Finished;
                    fired.push((*id, std::mem::take(&mut record.callbacks)));
                    if record.timing.fill == FillMode::None {
                        dropped.push(*id);
                    }
                }
            }
            for id in dropped {
                state.animations.remove(&id);
            }
        }

        let mut finished = Vec::with_capacity(fired.len());
        for (id, callbacks) in fired {
            finished.push(id);
            for callback in callbacks {
                if let Err(e) = callback() {
                    error!(animation = %id, error = %e, "Finish callback failed");
                }
            }
        }
        finished
    }
}

impl<S: Clone> Timeline<S> {
    /// Style currently shown by the surface's most recent animation
    pub fn computed_style(&self, surface: SurfaceId) -> Option<S> {
        let state = self.state.borrow();
        let now = state.now();
        state
            .animations
            .values()
            .rev()
            .find(|r| r.surface == surface)
            .and_then(|r| r.frame_at(now))
            .cloned()
    }
}

impl<S> Clock for Timeline<S> {
    fn now(&self) -> f64 {
        self.state.borrow().now()
    }
}

/// A surface on a [`Timeline`]
pub struct SurfaceHandle<S> {
    timeline: Timeline<S>,
    id: SurfaceId,
}

impl<S> Clone for SurfaceHandle<S> {
    fn clone(&self) -> Self {
        Self {
            timeline: self.timeline.clone(),
            id: self.id,
        }
    }
}

impl<S> SurfaceHandle<S> {
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn timeline(&self) -> &Timeline<S> {
        &self.timeline
    }
}

impl<S: 'static> Surface<S> for SurfaceHandle<S> {
    fn is_attached(&self) -> bool {
        self.timeline.is_attached(self.id)
    }

    fn animate(&self, keyframes: Vec<S>, timing: AnimationTiming) -> Box<dyn NativeAnimation> {
        let id = self.timeline.start(self.id, keyframes, timing);
        Box::new(AnimationHandle {
            timeline: self.timeline.clone(),
            id,
        })
    }
}

/// Handle to an animation on a [`Timeline`]
pub struct AnimationHandle<S> {
    timeline: Timeline<S>,
    id: AnimationId,
}

impl<S> NativeAnimation for AnimationHandle<S> {
    fn id(&self) -> AnimationId {
        self.id
    }

    fn cancel(&self) {
        self.timeline.cancel(self.id);
    }

    fn on_finish(&self, callback: FinishCallback) {
        self.timeline.add_callback(self.id, callback);
    }

    fn play_state(&self) -> PlayState {
        self.timeline.play_state(self.id)
    }
}
