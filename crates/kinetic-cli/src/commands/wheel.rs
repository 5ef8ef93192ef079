use anyhow::Result;
use clap::Args;
use serde::Serialize;

use kinetic_core::wheel::{TickWheel, WheelChange};
use kinetic_core::AppConfig;

#[derive(Args, Debug)]
pub struct WheelArgs {
    /// Committed tick before the release
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub start: i64,
    /// Fractional offset at release, in ticks
    #[arg(long, default_value_t = 0.51, allow_hyphen_values = true)]
    pub offset: f64,
    /// Velocity at release, in ticks per second
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub velocity: f64,
    /// Simulation frame rate
    #[arg(long, default_value_t = 60)]
    pub fps: u32,
    /// Emit JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct Outcome {
    settled_tick: i64,
    settled_after: f64,
    settled: bool,
    changes: Vec<WheelChange>,
}

pub fn run(config: &AppConfig, args: WheelArgs) -> Result<()> {
    let mut wheel = TickWheel::new(args.start, config.wheel)?;
    let frame_step = 1.0 / args.fps.max(1) as f64;

    let mut changes = Vec::new();
    if let Some(change) = wheel.release(args.start as f64 + args.offset, args.velocity, 0.0) {
        changes.push(change);
    }
    let (elapsed, settled_changes) = wheel.settle(0.0, frame_step, 60 * args.fps.max(1) as usize);
    changes.extend(settled_changes);

    let outcome = Outcome {
        settled_tick: wheel.value(),
        settled_after: elapsed,
        settled: !wheel.is_running(),
        changes,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    for change in &outcome.changes {
        println!("  {} -> {}", change.from, change.to);
    }
    if outcome.settled {
        println!("Settled on {} after {:.3}s", outcome.settled_tick, outcome.settled_after);
    } else {
        println!("Still moving after {:.3}s (at {})", outcome.settled_after, wheel.position());
    }
    Ok(())
}
