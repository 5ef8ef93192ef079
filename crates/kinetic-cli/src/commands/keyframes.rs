use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;

use kinetic_core::placement::{Rect, Size, Viewport};
use kinetic_core::popover::{Popover, PopoverFrame};
use kinetic_core::timeline::{AnimationTiming, FillMode, NativeAnimation, Surface, SurfaceHandle, Timeline};
use kinetic_core::{AnimatorEvent, AppConfig, Clock, Style};

#[derive(Args, Debug)]
pub struct KeyframesArgs {
    /// Close the popover at this time (seconds)
    #[arg(long, default_value_t = 1.5)]
    pub close_at: f64,
    /// Total simulated time (seconds)
    #[arg(long, default_value_t = 4.0)]
    pub duration: f64,
    /// Content height in pixels
    #[arg(long, default_value_t = 240.0)]
    pub content_height: f64,
    /// Fade instead of scaling
    #[arg(long)]
    pub reduce_motion: bool,
}

/// One keyframe run as submitted to a surface
#[derive(Debug, Serialize)]
struct RecordedRun {
    surface: &'static str,
    start: f64,
    duration: f64,
    fill: FillMode,
    keyframes: Vec<Style>,
}

/// Surface that records every run before passing it to the timeline
struct RecordingSurface {
    name: &'static str,
    inner: SurfaceHandle<Style>,
    log: Rc<RefCell<Vec<RecordedRun>>>,
}

impl Surface<Style> for RecordingSurface {
    fn is_attached(&self) -> bool {
        self.inner.is_attached()
    }

    fn animate(&self, keyframes: Vec<Style>, timing: AnimationTiming) -> Box<dyn NativeAnimation> {
        self.log.borrow_mut().push(RecordedRun {
            surface: self.name,
            start: self.inner.timeline().now(),
            duration: timing.duration,
            fill: timing.fill,
            keyframes: keyframes.clone(),
        });
        self.inner.animate(keyframes, timing)
    }
}

#[derive(Debug, Serialize)]
struct Report {
    runs: Vec<RecordedRun>,
    events: Vec<String>,
    unmount_requested_at: Option<f64>,
}

pub fn run(config: &AppConfig, args: KeyframesArgs) -> Result<()> {
    if !(args.duration.is_finite() && args.duration > 0.0) {
        bail!("--duration must be positive");
    }

    let timeline: Timeline<Style> = Timeline::starting_at(0.0);
    let log = Rc::new(RefCell::new(Vec::new()));
    let surface = |name| RecordingSurface {
        name,
        inner: timeline.create_surface(),
        log: Rc::clone(&log),
    };

    let mut options = config.popover;
    options.reduce_motion |= args.reduce_motion;
    let mut popover = Popover::new(
        Box::new(surface("dialog")),
        Box::new(surface("arrow")),
        Rc::new(timeline.clone()),
        options,
        config.animator,
    )?;

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let clock = timeline.clone();
    popover.animator().subscribe(move |event| {
        let line = match event {
            AnimatorEvent::Resolve { animations } => {
                let ids: Vec<String> = animations.iter().map(|id| id.to_string()).collect();
                format!("{:.3} resolve {}", clock.now(), ids.join(","))
            }
            AnimatorEvent::Finish { reason } => format!("{:.3} finish {:?}", clock.now(), reason),
        };
        sink.borrow_mut().push(line);
    });

    let frame = |open| PopoverFrame {
        open,
        anchor: Rect::new(300.0, 200.0, 40.0, 24.0),
        viewport: Viewport::new(1280.0, 800.0),
        content: Size::new(320.0, args.content_height),
    };

    popover.update(frame(true))?;
    popover.on_mount()?;

    let step = config.animator.time_step;
    let mut t = 0.0;
    let mut closed = false;
    let mut unmount_requested_at = None;
    while t < args.duration {
        t += step;
        timeline.advance_to(t);
        if !closed && t >= args.close_at {
            closed = true;
        }
        popover.update(frame(!closed))?;
        if unmount_requested_at.is_none() && popover.wants_unmount() {
            unmount_requested_at = Some(t);
        }
    }
    popover.drop_animations();

    let report = Report {
        runs: log.take(),
        events: events.take(),
        unmount_requested_at,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
