//! Frame scheduler: turns springs into keyframe runs on surfaces
//!
//! An [`ElementAnimator`] samples its input springs forward from "now" at a
//! fixed step, feeds each sample through a style function and hands the
//! resulting keyframes to every attached surface. A run that does not settle
//! within the horizon chains into the next one when it finishes; a run that
//! settles emits [`AnimatorEvent::Finish`].
//!
//! Each submission bumps a generation counter. Continuations carry the
//! generation they were registered for, so a chain that has been superseded
//! or dropped can never fire again.

mod inputs;
mod phase;

pub use inputs::{Inputs, SampledInputs};
pub use phase::{Phase, Transition};

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::timeline::{AnimationId, AnimationTiming, FillMode, NativeAnimation, PlayState, Surface};
use inputs::ObservedInputs;

/// Style function: sampled inputs and absolute time to one style per surface
pub type StyleFn<S> = dyn Fn(&SampledInputs, f64) -> Vec<S>;

/// Keyframe generation settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimatorOptions {
    /// Seconds of keyframes generated per run
    #[serde(default = "default_horizon")]
    pub horizon: f64,
    /// Seconds between keyframes
    #[serde(default = "default_time_step")]
    pub time_step: f64,
    /// Hold the final frame after convergence
    #[serde(default = "default_fill_forwards")]
    pub fill_forwards: bool,
}

impl Default for AnimatorOptions {
    fn default() -> Self {
        Self {
            horizon: default_horizon(),
            time_step: default_time_step(),
            fill_forwards: default_fill_forwards(),
        }
    }
}

fn default_horizon() -> f64 {
    1.0
}

fn default_time_step() -> f64 {
    1.0 / 60.0
}

fn default_fill_forwards() -> bool {
    true
}

impl AnimatorOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.horizon.is_finite() && self.horizon > 0.0) {
            return Err(Error::invalid("horizon", format!("must be positive, got {}", self.horizon)));
        }
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(Error::invalid(
                "time_step",
                format!("must be positive, got {}", self.time_step),
            ));
        }
        Ok(())
    }

    fn fill(&self) -> FillMode {
        if self.fill_forwards {
            FillMode::Forwards
        } else {
            FillMode::None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Converged,
    Dropped,
}

/// Notifications emitted to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum AnimatorEvent {
    /// A new keyframe run started on these animations
    Resolve { animations: Vec<AnimationId> },
    /// The animation converged, or the animator was dropped
    Finish { reason: FinishReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn(&AnimatorEvent)>;

/// What the first animation of a run does when it finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Continuation {
    Regenerate,
    Finish,
}

struct AnimatorState<S> {
    style_fn: Rc<StyleFn<S>>,
    surfaces: Vec<Box<dyn Surface<S>>>,
    clock: Rc<dyn Clock>,
    options: AnimatorOptions,
    inputs: Inputs,
    observed: ObservedInputs,
    phase: Phase,
    stale: bool,
    generation: u64,
    animations: Vec<Box<dyn NativeAnimation>>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl<S> AnimatorState<S> {
    fn apply(&mut self, transition: Transition) -> Result<()> {
        if self.phase == Phase::Dropped {
            return Err(Error::Dropped);
        }
        match self.phase.next(transition) {
            Some(next) => self.phase = next,
            None => debug!(phase = ?self.phase, ?transition, "Ignoring transition"),
        }
        Ok(())
    }

    fn cancel_all(&mut self) {
        for animation in self.animations.drain(..) {
            animation.cancel();
        }
    }

    /// Scheduled, but the run holding the continuation was discarded
    /// without finishing, so the chain can never fire again
    fn chain_lost(&self) -> bool {
        self.phase == Phase::Scheduled
            && self
                .animations
                .first()
                .map_or(false, |a| a.play_state() == PlayState::Cancelled)
    }

    /// Mark stale when the live run vanished under us
    fn check_chain(&mut self) {
        if !self.stale && self.chain_lost() {
            debug!(generation = self.generation, "Keyframe run lost, rescheduling");
            self.animations.clear();
            self.stale = true;
        }
    }

    fn listeners(&self) -> Vec<Listener> {
        self.listeners.iter().map(|(_, l)| Rc::clone(l)).collect()
    }
}

fn emit(listeners: Vec<Listener>, event: &AnimatorEvent) {
    for listener in listeners {
        listener(event);
    }
}

/// Frame scheduler for one animated entity
pub struct ElementAnimator<S> {
    state: Rc<RefCell<AnimatorState<S>>>,
}

impl<S: 'static> ElementAnimator<S> {
    /// Create an idle animator
    ///
    /// The style function runs while the animator is borrowed and must not
    /// call back into it.
    pub fn new<F>(
        style_fn: F,
        surfaces: Vec<Box<dyn Surface<S>>>,
        clock: Rc<dyn Clock>,
        options: AnimatorOptions,
    ) -> Result<Self>
    where
        F: Fn(&SampledInputs, f64) -> Vec<S> + 'static,
    {
        options.validate()?;
        Ok(Self {
            state: Rc::new(RefCell::new(AnimatorState {
                style_fn: Rc::new(style_fn),
                surfaces,
                clock,
                options,
                inputs: Inputs::new(),
                observed: ObservedInputs::default(),
                phase: Phase::Idle,
                stale: false,
                generation: 0,
                animations: Vec::new(),
                listeners: Vec::new(),
                next_listener: 1,
            })),
        })
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    /// Whether the next resolve will regenerate
    ///
    /// A scheduled run whose surface was detached counts as stale.
    pub fn is_stale(&self) -> bool {
        let state = self.state.borrow();
        state.stale || state.chain_lost()
    }

    pub fn is_dropped(&self) -> bool {
        self.phase() == Phase::Dropped
    }

    /// Number of keyframe runs submitted so far
    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    /// Animations of the current run
    pub fn animation_ids(&self) -> Vec<AnimationId> {
        self.state.borrow().animations.iter().map(|a| a.id()).collect()
    }

    pub fn options(&self) -> AnimatorOptions {
        self.state.borrow().options
    }

    /// Record the input set; regenerate if it changed
    ///
    /// Call on every render. Inputs are compared by spring identity and reset
    /// time, so unchanged springs cost nothing.
    pub fn set_inputs(&self, inputs: Inputs) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            if state.phase == Phase::Dropped {
                return Err(Error::Dropped);
            }
            let changed = state.observed.observe(&inputs);
            state.inputs = inputs;
            if changed {
                state.stale = true;
                state.apply(Transition::Invalidate)?;
            }
            state.check_chain();
            if !state.stale {
                return Ok(());
            }
        }
        Self::regenerate(&self.state)
    }

    /// Force regeneration on the next resolve
    ///
    /// For style-function inputs that are not springs.
    pub fn mark_stale(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.apply(Transition::Invalidate)?;
        state.stale = true;
        Ok(())
    }

    /// Regenerate keyframes if stale
    pub fn resolve(&self) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            if state.phase == Phase::Dropped {
                return Err(Error::Dropped);
            }
            state.check_chain();
            if !state.stale {
                return Ok(());
            }
        }
        Self::regenerate(&self.state)
    }

    /// First attach: force a resolve
    pub fn on_mount(&self) -> Result<()> {
        self.mark_stale()?;
        self.resolve()
    }

    /// Styles at the clock's current time, without touching the timeline
    pub fn current_styles(&self) -> Vec<S> {
        let state = self.state.borrow();
        let now = state.clock.now();
        (state.style_fn)(&state.inputs.sample(now), now)
    }

    /// Cancel everything and make the animator permanently inert
    pub fn drop_animations(&self) {
        let listeners = {
            let mut state = self.state.borrow_mut();
            if state.apply(Transition::Drop).is_err() {
                return;
            }
            state.cancel_all();
            state.stale = false;
            debug!(generation = state.generation, "Animator dropped");
            state.listeners()
        };
        emit(
            listeners,
            &AnimatorEvent::Finish {
                reason: FinishReason::Dropped,
            },
        );
    }

    pub fn subscribe(&self, listener: impl Fn(&AnimatorEvent) + 'static) -> ListenerId {
        let mut state = self.state.borrow_mut();
        let id = ListenerId(state.next_listener);
        state.next_listener += 1;
        state.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener; returns whether it was registered
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.listeners.len();
        state.listeners.retain(|(l, _)| *l != id);
        state.listeners.len() != before
    }

    /// Sample forward, replace the running animations and arm the continuation
    fn regenerate(cell: &Rc<RefCell<AnimatorState<S>>>) -> Result<()> {
        let (listeners, event) = {
            let mut guard = cell.borrow_mut();
            let state = &mut *guard;
            if state.phase == Phase::Dropped {
                return Ok(());
            }

            let attached: Vec<usize> = state
                .surfaces
                .iter()
                .enumerate()
                .filter(|(_, s)| s.is_attached())
                .map(|(i, _)| i)
                .collect();
            if attached.is_empty() {
                debug!("No attached surface, resolve deferred");
                state.stale = true;
                return Ok(());
            }

            let now = state.clock.now();
            let step = state.options.time_step;
            let steps = ((state.options.horizon / step).ceil() as usize).max(1);
            let surface_count = state.surfaces.len();

            let mut keyframes: Vec<Vec<S>> = (0..surface_count)
                .map(|_| Vec::with_capacity(steps))
                .collect();
            let mut samples = 0usize;
            let mut converged = false;
            for i in 0..steps {
                let t = now + i as f64 * step;
                let styles = (state.style_fn)(&state.inputs.sample(t), t);
                if styles.len() < surface_count {
                    return Err(Error::StyleMismatch {
                        expected: surface_count,
                        got: styles.len(),
                    });
                }
                for (frames, style) in keyframes.iter_mut().zip(styles) {
                    frames.push(style);
                }
                samples += 1;

                if state.inputs.all_settled(t) {
                    converged = true;
                    break;
                }
            }

            let timing = AnimationTiming {
                duration: (samples - 1) as f64 * step,
                fill: state.options.fill(),
            };

            state.cancel_all();
            let mut animations = Vec::with_capacity(attached.len());
            for (i, frames) in keyframes.into_iter().enumerate() {
                if attached.contains(&i) {
                    animations.push(state.surfaces[i].animate(frames, timing));
                }
            }
            state.animations = animations;

            state.generation += 1;
            state.stale = false;
            state.apply(Transition::Submit)?;

            let generation = state.generation;
            let continuation = if converged {
                Continuation::Finish
            } else {
                Continuation::Regenerate
            };
            let weak = Rc::downgrade(cell);
            if let Some(first) = state.animations.first() {
                first.on_finish(Box::new(move || {
                    Self::continue_chain(&weak, generation, continuation)
                }));
            }

            debug!(
                generation,
                samples,
                converged,
                duration = timing.duration,
                "Submitted keyframes"
            );

            let ids = state.animations.iter().map(|a| a.id()).collect();
            (state.listeners(), AnimatorEvent::Resolve { animations: ids })
        };

        emit(listeners, &event);
        Ok(())
    }

    /// Finish handler of a run; a no-op unless that run is still current
    fn continue_chain(
        weak: &Weak<RefCell<AnimatorState<S>>>,
        generation: u64,
        continuation: Continuation,
    ) -> Result<()> {
        let Some(cell) = weak.upgrade() else {
            return Ok(());
        };
        {
            let state = cell.borrow();
            if state.phase == Phase::Dropped || state.generation != generation {
                debug!(
                    generation,
                    current = state.generation,
                    "Superseded continuation ignored"
                );
                return Ok(());
            }
        }

        match continuation {
            Continuation::Regenerate => Self::regenerate(&cell),
            Continuation::Finish => {
                let listeners = {
                    let mut state = cell.borrow_mut();
                    if !state.options.fill_forwards {
                        state.cancel_all();
                    }
                    if state.phase != Phase::Scheduled {
                        warn!(phase = ?state.phase, "Finish continuation outside a scheduled run");
                    }
                    state.apply(Transition::Converge)?;
                    state.listeners()
                };
                emit(
                    listeners,
                    &AnimatorEvent::Finish {
                        reason: FinishReason::Converged,
                    },
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::spring::{SpringParams, SpringRef};
    use crate::timeline::{SurfaceHandle, Timeline};
    use std::cell::Cell;

    struct Fixture {
        timeline: Timeline<f64>,
        surface: SurfaceHandle<f64>,
        spring: SpringRef,
        animator: ElementAnimator<f64>,
        finishes: Rc<Cell<u32>>,
        resolves: Rc<Cell<u32>>,
    }

    fn fixture(period: f64, options: AnimatorOptions) -> Fixture {
        let timeline: Timeline<f64> = Timeline::starting_at(0.0);
        let surface = timeline.create_surface();
        let spring = SpringRef::new(SpringParams::default().with_period(period).with_value(0.0), 0.0).unwrap();
        let animator = ElementAnimator::new(
            |inputs: &SampledInputs, _| vec![inputs.get_or("x", 0.0)],
            vec![Box::new(surface.clone()) as Box<dyn Surface<f64>>],
            Rc::new(timeline.clone()),
            options,
        )
        .unwrap();

        let finishes = Rc::new(Cell::new(0));
        let resolves = Rc::new(Cell::new(0));
        let (f, r) = (finishes.clone(), resolves.clone());
        animator.subscribe(move |event| match event {
            AnimatorEvent::Finish { .. } => f.set(f.get() + 1),
            AnimatorEvent::Resolve { .. } => r.set(r.get() + 1),
        });

        Fixture {
            timeline,
            surface,
            spring,
            animator,
            finishes,
            resolves,
        }
    }

    fn inputs(spring: &SpringRef) -> Inputs {
        Inputs::new().with("x", spring)
    }

    /// Advance frame by frame, checking the single-live-run invariant
    fn run_frames(fx: &Fixture, from: f64, seconds: f64) -> f64 {
        let frames = (seconds * 60.0).round() as usize;
        let mut t = from;
        for _ in 0..frames {
            t += 1.0 / 60.0;
            fx.timeline.advance_to(t);
            assert!(fx.timeline.live_animations(fx.surface.id()) <= 1);
        }
        t
    }

    #[test]
    fn test_settles_within_one_run() {
        let fx = fixture(0.3, AnimatorOptions::default());
        fx.spring.set_target(1.0, 0.0).unwrap();
        fx.animator.set_inputs(inputs(&fx.spring)).unwrap();

        assert_eq!(fx.animator.phase(), Phase::Scheduled);
        assert_eq!(fx.timeline.live_animations(fx.surface.id()), 1);

        run_frames(&fx, 0.0, 2.0);
        assert_eq!(fx.resolves.get(), 1);
        assert_eq!(fx.finishes.get(), 1);
        assert_eq!(fx.animator.phase(), Phase::Converged);
        assert_eq!(fx.timeline.computed_style(fx.surface.id()), Some(1.0));
    }

    #[test]
    fn test_long_motion_chains_runs() {
        let fx = fixture(1.5, AnimatorOptions::default());
        fx.spring.set_target(1.0, 0.0).unwrap();
        fx.animator.set_inputs(inputs(&fx.spring)).unwrap();

        run_frames(&fx, 0.0, 6.0);
        assert!(fx.resolves.get() >= 3, "resolves: {}", fx.resolves.get());
        assert_eq!(fx.finishes.get(), 1);
        assert_eq!(fx.timeline.computed_style(fx.surface.id()), Some(1.0));
    }

    #[test]
    fn test_unchanged_target_does_not_regenerate() {
        let fx = fixture(0.3, AnimatorOptions::default());
        fx.spring.set_target(1.0, 0.0).unwrap();
        fx.animator.set_inputs(inputs(&fx.spring)).unwrap();
        let t = run_frames(&fx, 0.0, 2.0);

        fx.spring.set_target(1.0, t).unwrap();
        fx.animator.set_inputs(inputs(&fx.spring)).unwrap();
        assert_eq!(fx.animator.generation(), 1);
        assert!(!fx.animator.is_stale());
        assert_eq!(fx.animator.phase(), Phase::Converged);
    }

    #[test]
    fn test_retargets_keep_one_live_animation() {
        let fx = fixture(0.3, AnimatorOptions::default());
        let mut t = 0.0;
        for i in 1..=5 {
            fx.spring.set_target(i as f64 * 10.0, t).unwrap();
            fx.animator.set_inputs(inputs(&fx.spring)).unwrap();
            assert_eq!(fx.timeline.live_animations(fx.surface.id()), 1);
            t = run_frames(&fx, t, 0.1);
        }
        assert_eq!(fx.animator.generation(), 5);
        assert_eq!(fx.finishes.get(), 0);

        run_frames(&fx, t, 3.0);
        assert_eq!(fx.finishes.get(), 1);
    }

    #[test]
    fn test_superseded_continuation_is_noop() {
        let fx = fixture(1.5, AnimatorOptions::default());
        fx.spring.set_target(1.0, 0.0).unwrap();
        fx.animator.set_inputs(inputs(&fx.spring)).unwrap();
        fx.spring.set_target(2.0, 0.0).unwrap();
        fx.animator.set_inputs(inputs(&fx.spring)).unwrap();
        assert_eq!(fx.animator.generation(), 2);

        let weak = Rc::downgrade(&fx.animator.state);
        ElementAnimator::continue_chain(&weak, 1, Continuation::Regenerate).unwrap();
        ElementAnimator::continue_chain(&weak, 1, Continuation::Finish).unwrap();
        assert_eq!(fx.animator.generation(), 2);
        assert_eq!(fx.finishes.get(), 0);
    }

    #[test]
    fn test_no_surface_keeps_schedule_stale() {
        let fx = fixture(0.3, AnimatorOptions::default());
        fx.timeline.detach(fx.surface.id());
        fx.spring.set_target(1.0, 0.0).unwrap();
        fx.animator.set_inputs(inputs(&fx.spring)).unwrap();

        assert!(fx.animator.is_stale());
        assert_eq!(fx.animator.generation(), 0);
        assert_eq!(fx.animator.phase(), Phase::Idle);

        fx.timeline.attach(fx.surface.id());
        fx.animator.set_inputs(inputs(&fx.spring)).unwrap();
        assert_eq!(fx.animator.generation(), 1);
        assert_eq!(fx.timeline.live_animations(fx.surface.id()), 1);
    }

    #[test]
    fn test_detached_run_resumes_after_reattach() {
        let fx = fixture(1.5, AnimatorOptions::default());
        fx.spring.set_target(1.0, 0.0).unwrap();
        fx.animator.set_inputs(inputs(&fx.spring)).unwrap();
        let t = run_frames(&fx, 0.0, 0.3);

        fx.timeline.detach(fx.surface.id());
        assert!(fx.animator.is_stale());
        fx.animator.set_inputs(inputs(&fx.spring)).unwrap();
        assert_eq!(fx.animator.generation(), 1);
        assert!(fx.animator.is_stale());

        fx.timeline.attach(fx.surface.id());
        fx.animator.set_inputs(inputs(&fx.spring)).unwrap();
        assert_eq!(fx.animator.generation(), 2);
        assert!(!fx.animator.is_stale());
        assert_eq!(fx.timeline.live_animations(fx.surface.id()), 1);

        run_frames(&fx, t, 6.0);
        assert_eq!(fx.animator.phase(), Phase::Converged);
        assert_eq!(fx.finishes.get(), 1);
        assert_eq!(fx.timeline.computed_style(fx.surface.id()), Some(1.0));
    }

    #[test]
    fn test_drop_is_terminal() {
        let fx = fixture(1.5, AnimatorOptions::default());
        fx.spring.set_target(1.0, 0.0).unwrap();
        fx.animator.set_inputs(inputs(&fx.spring)).unwrap();

        fx.animator.drop_animations();
        assert_eq!(fx.animator.phase(), Phase::Dropped);
        assert!(!fx.animator.is_stale());
        assert_eq!(fx.timeline.live_animations(fx.surface.id()), 0);
        assert_eq!(fx.finishes.get(), 1);

        fx.spring.set_target(5.0, 0.1).unwrap();
        assert!(matches!(fx.animator.set_inputs(inputs(&fx.spring)), Err(Error::Dropped)));
        assert!(matches!(fx.animator.resolve(), Err(Error::Dropped)));
        assert!(matches!(fx.animator.on_mount(), Err(Error::Dropped)));
        run_frames(&fx, 0.0, 3.0);
        assert_eq!(fx.timeline.live_animations(fx.surface.id()), 0);
        assert_eq!(fx.animator.generation(), 1);

        fx.animator.drop_animations();
        assert_eq!(fx.finishes.get(), 1);
    }

    #[test]
    fn test_on_mount_forces_resolve() {
        let fx = fixture(0.3, AnimatorOptions::default());
        fx.animator.set_inputs(inputs(&fx.spring)).unwrap();
        assert_eq!(fx.animator.generation(), 1);

        fx.animator.resolve().unwrap();
        assert_eq!(fx.animator.generation(), 1);

        fx.animator.on_mount().unwrap();
        assert_eq!(fx.animator.generation(), 2);
    }

    #[test]
    fn test_fill_none_clears_on_finish() {
        let options = AnimatorOptions {
            fill_forwards: false,
            ..Default::default()
        };
        let fx = fixture(0.3, options);
        fx.spring.set_target(1.0, 0.0).unwrap();
        fx.animator.set_inputs(inputs(&fx.spring)).unwrap();
        run_frames(&fx, 0.0, 2.0);

        assert_eq!(fx.finishes.get(), 1);
        assert!(fx.animator.animation_ids().is_empty());
        assert_eq!(fx.timeline.computed_style(fx.surface.id()), None);
    }

    #[test]
    fn test_current_styles_and_mismatch() {
        let fx = fixture(0.3, AnimatorOptions::default());
        fx.spring.set_target(1.0, 0.0).unwrap();
        fx.animator.set_inputs(inputs(&fx.spring)).unwrap();
        assert_eq!(fx.animator.current_styles(), vec![0.0]);

        let timeline: Timeline<f64> = Timeline::starting_at(0.0);
        let a = timeline.create_surface();
        let b = timeline.create_surface();
        let animator = ElementAnimator::new(
            |_: &SampledInputs, _| vec![1.0],
            vec![
                Box::new(a) as Box<dyn Surface<f64>>,
                Box::new(b) as Box<dyn Surface<f64>>,
            ],
            Rc::new(timeline.clone()),
            AnimatorOptions::default(),
        )
        .unwrap();
        let err = animator.set_inputs(inputs(&fx.spring)).unwrap_err();
        assert!(matches!(err, Error::StyleMismatch { expected: 2, got: 1 }));
        assert!(animator.is_stale());
    }

    #[test]
    fn test_current_styles_follow_injected_clock() {
        let timeline: Timeline<f64> = Timeline::starting_at(0.0);
        let clock = Rc::new(ManualClock::new(0.0));
        let spring = SpringRef::new(SpringParams::default().with_value(0.0), 0.0).unwrap();
        let animator = ElementAnimator::new(
            |inputs: &SampledInputs, _| vec![inputs.get_or("x", 0.0)],
            vec![Box::new(timeline.create_surface()) as Box<dyn Surface<f64>>],
            clock.clone(),
            AnimatorOptions::default(),
        )
        .unwrap();

        spring.set_target(1.0, 0.0).unwrap();
        animator.set_inputs(inputs(&spring)).unwrap();
        assert_eq!(animator.current_styles(), vec![0.0]);

        // The timeline has not moved; sampling follows the animator's clock
        clock.advance(5.0);
        assert_eq!(animator.current_styles(), vec![1.0]);
        assert_eq!(timeline.current_time(), Some(0.0));
    }

    #[test]
    fn test_unsubscribe() {
        let fx = fixture(0.3, AnimatorOptions::default());
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let id = fx.animator.subscribe(move |_| h.set(h.get() + 1));
        assert!(fx.animator.unsubscribe(id));
        assert!(!fx.animator.unsubscribe(id));

        fx.spring.set_target(1.0, 0.0).unwrap();
        fx.animator.set_inputs(inputs(&fx.spring)).unwrap();
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let timeline: Timeline<f64> = Timeline::starting_at(0.0);
        let options = AnimatorOptions {
            time_step: 0.0,
            ..Default::default()
        };
        let result = ElementAnimator::new(
            |_: &SampledInputs, _| vec![0.0],
            Vec::new(),
            Rc::new(timeline),
            options,
        );
        assert!(result.is_err());
    }
}
