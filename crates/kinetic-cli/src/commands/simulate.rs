use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;

use kinetic_core::{AppConfig, SpringRef};

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Starting value
    #[arg(long, default_value_t = 0.0)]
    pub from: f64,
    /// Target value
    #[arg(long, default_value_t = 1.0)]
    pub to: f64,
    /// Damping ratio (defaults to the configured spring)
    #[arg(long)]
    pub damping_ratio: Option<f64>,
    /// Period in seconds (defaults to the configured spring)
    #[arg(long)]
    pub period: Option<f64>,
    /// Seconds to simulate
    #[arg(long, default_value_t = 1.0)]
    pub duration: f64,
    /// Seconds between samples
    #[arg(long, default_value_t = 0.05)]
    pub step: f64,
    /// Retarget mid-flight at this time
    #[arg(long, requires = "retarget_to")]
    pub retarget_at: Option<f64>,
    /// New target for the mid-flight retarget
    #[arg(long)]
    pub retarget_to: Option<f64>,
    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct Sample {
    t: f64,
    value: f64,
    velocity: f64,
    target: f64,
    settled: bool,
}

pub fn run(config: &AppConfig, args: SimulateArgs) -> Result<()> {
    if !(args.step.is_finite() && args.step > 0.0) {
        bail!("--step must be positive");
    }

    let mut params = config.spring.with_value(args.from).with_target(args.to);
    if let Some(damping_ratio) = args.damping_ratio {
        params = params.with_damping_ratio(damping_ratio);
    }
    if let Some(period) = args.period {
        params = params.with_period(period);
    }
    let spring = SpringRef::new(params, 0.0)?;

    let steps = (args.duration / args.step).round() as usize;
    let mut retarget = args.retarget_at.zip(args.retarget_to);
    let mut samples = Vec::with_capacity(steps + 1);
    for i in 0..=steps {
        let t = i as f64 * args.step;
        if let Some((at, target)) = retarget {
            if t >= at {
                spring.set_target(target, at)?;
                retarget = None;
            }
        }
        samples.push(Sample {
            t,
            value: spring.value(t),
            velocity: spring.velocity(t),
            target: spring.target(),
            settled: spring.should_stop(t),
        });
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&samples)?);
        return Ok(());
    }

    println!("{:>8}  {:>12}  {:>12}  {:>8}", "t", "value", "velocity", "target");
    for s in &samples {
        println!(
            "{:>8.3}  {:>12.6}  {:>12.6}  {:>8.3}{}",
            s.t,
            s.value,
            s.velocity,
            s.target,
            if s.settled { "  settled" } else { "" }
        );
    }
    Ok(())
}
