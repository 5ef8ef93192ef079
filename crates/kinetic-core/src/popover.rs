//! Animated popover: presence, height and vertical position springs
//!
//! Each render hands the popover a [`PopoverFrame`] with the open flag and
//! fresh geometry. The popover retargets its springs, resolves placement and
//! lets the [`ElementAnimator`] drive two surfaces, the dialog and its arrow.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::animator::{AnimatorEvent, AnimatorOptions, ElementAnimator, FinishReason, Inputs, SampledInputs};
use crate::clock::Clock;
use crate::error::Result;
use crate::placement::{Placement, PlacementEngine, PlacementParams, Rect, Size, Viewport};
use crate::spring::{SpringParams, SpringRef};
use crate::style::{px, scale, translate, Style};
use crate::timeline::Surface;

/// Arrow is kept this far from the dialog's rounded corners
const ARROW_INSET: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopoverOptions {
    #[serde(default = "default_arrow_size")]
    pub arrow_size: f64,
    #[serde(default = "default_max_padding")]
    pub max_padding: f64,
    #[serde(default = "default_max_lift")]
    pub max_lift: f64,
    /// Fade instead of scaling
    #[serde(default)]
    pub reduce_motion: bool,
}

impl Default for PopoverOptions {
    fn default() -> Self {
        let placement = PlacementParams::default();
        Self {
            arrow_size: placement.arrow_size,
            max_padding: placement.max_padding,
            max_lift: placement.max_lift,
            reduce_motion: false,
        }
    }
}

fn default_arrow_size() -> f64 {
    PlacementParams::default().arrow_size
}

fn default_max_padding() -> f64 {
    PlacementParams::default().max_padding
}

fn default_max_lift() -> f64 {
    PlacementParams::default().max_lift
}

impl PopoverOptions {
    pub fn placement(&self) -> PlacementParams {
        PlacementParams {
            arrow_size: self.arrow_size,
            max_padding: self.max_padding,
            max_lift: self.max_lift,
        }
    }
}

/// Per-render input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopoverFrame {
    pub open: bool,
    pub anchor: Rect,
    pub viewport: Viewport,
    /// Measured size of the popover contents
    pub content: Size,
}

/// Non-spring values the style function reads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleParams {
    pub anchor: (f64, f64),
    pub x: f64,
    pub y: f64,
    pub open: bool,
    /// Whether the first measured frame has been laid out
    pub measured: bool,
    pub arrow_size: f64,
    pub reduce_motion: bool,
}

/// Dialog and arrow styles for one sample
pub fn popover_styles(params: &StyleParams, inputs: &SampledInputs) -> Vec<Style> {
    let presence = inputs.get_or("presence", 0.0);
    let pos_y = inputs.get_or("pos_y", 0.0);
    let height = inputs.get_or("height", 0.0);

    let mut arrow_y = params.anchor.1 - pos_y - params.arrow_size / 2.0;
    let arrow_hidden = arrow_y < 0.0 || arrow_y > height;
    if arrow_y < ARROW_INSET {
        arrow_y = ARROW_INSET;
    }
    if arrow_y > height - ARROW_INSET {
        arrow_y = height - ARROW_INSET;
    }
    let arrow = Style::new()
        .with("top", px(arrow_y))
        .with("opacity", if arrow_hidden { 0.0 } else { 1.0 });

    let dialog = if params.reduce_motion {
        Style::new()
            .with("transform", translate(params.x, pos_y))
            .with("opacity", presence)
            .with("height", px(height))
            .with("x", px(params.x))
            .with("y", px(pos_y))
    } else {
        let zoom = presence.max(0.0);
        let opacity = match (params.open, params.measured) {
            (true, true) => 1.0,
            (true, false) => 0.0,
            (false, _) => presence,
        };
        Style::new()
            .with(
                "transform-origin",
                format!(
                    "{}px {}px",
                    params.anchor.0 - params.x,
                    params.anchor.1 - params.y
                ),
            )
            .with("transform", format!("{} {}", translate(params.x, pos_y), scale(zoom)))
            .with("opacity", opacity)
            .with("height", px(height))
            .with("x", px(params.x))
            .with("y", px(pos_y))
            .with("scale", zoom)
    };

    vec![dialog, arrow]
}

/// Popover animation state bound to a dialog and an arrow surface
pub struct Popover {
    presence: SpringRef,
    height: SpringRef,
    pos_y: SpringRef,
    engine: PlacementEngine,
    animator: ElementAnimator<Style>,
    params: Rc<Cell<StyleParams>>,
    wants_unmount: Rc<Cell<bool>>,
    clock: Rc<dyn Clock>,
    options: PopoverOptions,
    placement: Option<Placement>,
}

impl Popover {
    pub fn new(
        dialog: Box<dyn Surface<Style>>,
        arrow: Box<dyn Surface<Style>>,
        clock: Rc<dyn Clock>,
        options: PopoverOptions,
        animator_options: AnimatorOptions,
    ) -> Result<Self> {
        let now = clock.now();
        let presence = SpringRef::new(
            SpringParams::default().with_damping_ratio(0.8).with_target(1.0),
            now,
        )?;
        let height = SpringRef::new(SpringParams::default().with_value(128.0), now)?;
        let pos_y = SpringRef::new(SpringParams::default().with_value(-1.0), now)?;

        let params = Rc::new(Cell::new(StyleParams {
            anchor: (0.0, 0.0),
            x: 0.0,
            y: 0.0,
            open: false,
            measured: false,
            arrow_size: options.arrow_size,
            reduce_motion: options.reduce_motion,
        }));

        let style_params = Rc::clone(&params);
        let animator = ElementAnimator::new(
            move |inputs: &SampledInputs, _t| popover_styles(&style_params.get(), inputs),
            vec![dialog, arrow],
            Rc::clone(&clock),
            animator_options,
        )?;

        let wants_unmount = Rc::new(Cell::new(false));
        let flag = Rc::clone(&wants_unmount);
        let presence_ref = presence.clone();
        animator.subscribe(move |event| {
            if let AnimatorEvent::Finish {
                reason: FinishReason::Converged,
            } = event
            {
                if presence_ref.target() == 0.0 {
                    info!("Popover closed");
                    flag.set(true);
                }
            }
        });

        Ok(Self {
            presence,
            height,
            pos_y,
            engine: PlacementEngine::new(options.placement()),
            animator,
            params,
            wants_unmount,
            clock,
            options,
            placement: None,
        })
    }

    /// Apply one render's worth of state
    pub fn update(&mut self, frame: PopoverFrame) -> Result<Placement> {
        let now = self.clock.now();
        self.presence.set_target(if frame.open { 1.0 } else { 0.0 }, now)?;
        self.height.set_target(frame.content.height, now)?;

        let placement = self.engine.place(frame.anchor, frame.viewport, frame.content);
        self.pos_y.set_target(placement.y, now)?;

        let previous = self.params.get();
        if !previous.measured {
            self.pos_y.set_value(self.pos_y.target(), now)?;
            debug!(y = placement.y, "Initial popover position");
        }

        let next = StyleParams {
            anchor: placement.anchor,
            x: placement.x,
            y: placement.y,
            open: frame.open,
            measured: true,
            arrow_size: self.options.arrow_size,
            reduce_motion: self.options.reduce_motion,
        };
        self.params.set(next);
        if next != previous {
            self.animator.mark_stale()?;
        }
        if frame.open {
            self.wants_unmount.set(false);
        }

        self.animator.set_inputs(self.inputs())?;
        self.placement = Some(placement);
        Ok(placement)
    }

    fn inputs(&self) -> Inputs {
        Inputs::new()
            .with("presence", &self.presence)
            .with("pos_y", &self.pos_y)
            .with("height", &self.height)
    }

    pub fn on_mount(&self) -> Result<()> {
        self.animator.on_mount()
    }

    /// Dialog and arrow styles for the current frame
    pub fn current_styles(&self) -> Vec<Style> {
        self.animator.current_styles()
    }

    /// The close animation has finished; the host can unmount
    pub fn wants_unmount(&self) -> bool {
        self.wants_unmount.get()
    }

    pub fn is_open(&self) -> bool {
        self.presence.target() == 1.0
    }

    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    pub fn animator(&self) -> &ElementAnimator<Style> {
        &self.animator
    }

    pub fn presence(&self) -> &SpringRef {
        &self.presence
    }

    pub fn height(&self) -> &SpringRef {
        &self.height
    }

    pub fn pos_y(&self) -> &SpringRef {
        &self.pos_y
    }

    /// Permanently stop animating
    pub fn drop_animations(&self) {
        self.animator.drop_animations();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::Phase;
    use crate::timeline::{SurfaceHandle, Timeline};

    struct Fixture {
        timeline: Timeline<Style>,
        dialog: SurfaceHandle<Style>,
        arrow: SurfaceHandle<Style>,
        popover: Popover,
    }

    fn fixture(options: PopoverOptions) -> Fixture {
        let timeline: Timeline<Style> = Timeline::starting_at(0.0);
        let dialog = timeline.create_surface();
        let arrow = timeline.create_surface();
        let popover = Popover::new(
            Box::new(dialog.clone()),
            Box::new(arrow.clone()),
            Rc::new(timeline.clone()),
            options,
            AnimatorOptions::default(),
        )
        .unwrap();
        Fixture {
            timeline,
            dialog,
            arrow,
            popover,
        }
    }

    fn frame(open: bool) -> PopoverFrame {
        PopoverFrame {
            open,
            anchor: Rect::new(100.0, 300.0, 20.0, 40.0),
            viewport: Viewport::new(1024.0, 768.0),
            content: Size::new(200.0, 240.0),
        }
    }

    fn run(timeline: &Timeline<Style>, from: f64, seconds: f64) -> f64 {
        let mut t = from;
        for _ in 0..(seconds * 60.0) as usize {
            t += 1.0 / 60.0;
            timeline.advance_to(t);
        }
        t
    }

    fn params(anchor_y: f64) -> StyleParams {
        StyleParams {
            anchor: (120.0, anchor_y),
            x: 128.0,
            y: 200.0,
            open: true,
            measured: true,
            arrow_size: 16.0,
            reduce_motion: false,
        }
    }

    fn sampled(presence: f64, pos_y: f64, height: f64) -> SampledInputs {
        let springs: Inputs = [("presence", presence), ("pos_y", pos_y), ("height", height)]
            .into_iter()
            .map(|(name, value)| {
                let spring = SpringRef::new(SpringParams::default().with_value(value), 0.0).unwrap();
                (name, spring)
            })
            .collect();
        springs.sample(0.0)
    }

    #[test]
    fn test_open_then_close_requests_unmount() {
        let mut fx = fixture(PopoverOptions::default());
        fx.popover.update(frame(true)).unwrap();
        fx.popover.on_mount().unwrap();
        let t = run(&fx.timeline, 0.0, 3.0);
        assert_eq!(fx.popover.animator().phase(), Phase::Converged);
        assert!(!fx.popover.wants_unmount());

        let dialog = fx.timeline.computed_style(fx.dialog.id()).unwrap();
        assert_eq!(dialog.number("scale"), Some(1.0));
        assert_eq!(dialog.number("height"), Some(240.0));

        fx.popover.update(frame(false)).unwrap();
        assert!(!fx.popover.is_open());
        run(&fx.timeline, t, 3.0);
        assert!(fx.popover.wants_unmount());
        let dialog = fx.timeline.computed_style(fx.dialog.id()).unwrap();
        assert_eq!(dialog.number("opacity"), Some(0.0));
    }

    #[test]
    fn test_first_frame_snaps_position() {
        let mut fx = fixture(PopoverOptions::default());
        let placement = fx.popover.update(frame(true)).unwrap();
        assert_eq!(fx.popover.pos_y().value(0.0), placement.y);

        let styles = fx.popover.current_styles();
        assert_eq!(styles.len(), 2);
        assert_eq!(styles[0].number("y"), Some(placement.y));
        assert_eq!(fx.timeline.live_animations(fx.arrow.id()), 1);
    }

    #[test]
    fn test_reopen_clears_unmount_request() {
        let mut fx = fixture(PopoverOptions::default());
        fx.popover.update(frame(true)).unwrap();
        let t = run(&fx.timeline, 0.0, 2.0);
        fx.popover.update(frame(false)).unwrap();
        let t = run(&fx.timeline, t, 3.0);
        assert!(fx.popover.wants_unmount());

        fx.popover.update(frame(true)).unwrap();
        assert!(!fx.popover.wants_unmount());
        run(&fx.timeline, t, 3.0);
        assert!(!fx.popover.wants_unmount());
    }

    #[test]
    fn test_arrow_clamped_and_hidden() {
        let inputs = sampled(1.0, 200.0, 100.0);

        // Anchor well inside the dialog
        let styles = popover_styles(&params(250.0), &inputs);
        assert_eq!(styles[1].number("top"), Some(42.0));
        assert_eq!(styles[1].number("opacity"), Some(1.0));

        // Near the top edge: clamped, still visible
        let styles = popover_styles(&params(210.0), &inputs);
        assert_eq!(styles[1].number("top"), Some(8.0));
        assert_eq!(styles[1].number("opacity"), Some(1.0));

        // Below the dialog: clamped and hidden
        let styles = popover_styles(&params(400.0), &inputs);
        assert_eq!(styles[1].number("top"), Some(92.0));
        assert_eq!(styles[1].number("opacity"), Some(0.0));
    }

    #[test]
    fn test_dialog_style() {
        let inputs = sampled(0.5, 210.0, 120.0);
        let mut p = params(250.0);
        p.open = false;
        let dialog = &popover_styles(&p, &inputs)[0];
        assert_eq!(dialog.text("transform"), Some("translate(128px, 210px) scale(0.5)"));
        assert_eq!(dialog.text("transform-origin"), Some("-8px 50px"));
        assert_eq!(dialog.number("opacity"), Some(0.5));
        assert_eq!(dialog.number("height"), Some(120.0));

        p.open = true;
        p.measured = false;
        assert_eq!(popover_styles(&p, &inputs)[0].number("opacity"), Some(0.0));
    }

    #[test]
    fn test_reduced_motion_fades() {
        let inputs = sampled(0.25, 210.0, 120.0);
        let mut p = params(250.0);
        p.reduce_motion = true;
        let dialog = &popover_styles(&p, &inputs)[0];
        assert_eq!(dialog.text("transform"), Some("translate(128px, 210px)"));
        assert_eq!(dialog.number("opacity"), Some(0.25));
        assert!(dialog.get("transform-origin").is_none());
        assert!(dialog.get("scale").is_none());
    }

    #[test]
    fn test_negative_presence_never_mirrors() {
        let inputs = sampled(-0.1, 0.0, 100.0);
        let dialog = &popover_styles(&params(50.0), &inputs)[0];
        assert_eq!(dialog.number("scale"), Some(0.0));
    }
}
