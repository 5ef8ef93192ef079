use anyhow::Result;
use clap::Args;

use kinetic_core::placement::{PlacementEngine, Rect, Size, Viewport};
use kinetic_core::AppConfig;

#[derive(Args, Debug)]
pub struct PlaceArgs {
    /// Anchor rect as left,top,width,height
    #[arg(long, value_parser = parse_rect, default_value = "780,20,20,40")]
    pub anchor: Rect,
    /// Viewport as width,height
    #[arg(long, value_parser = parse_size, default_value = "1024,768")]
    pub viewport: Size,
    /// Content as width,height
    #[arg(long, value_parser = parse_size, default_value = "200,100")]
    pub content: Size,
    /// Viewport scale
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,
    /// Emit JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_numbers<const N: usize>(s: &str) -> Result<[f64; N], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {} comma-separated numbers, got {:?}", N, s));
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse::<f64>()
            .map_err(|e| format!("invalid number {:?}: {}", part, e))?;
    }
    Ok(out)
}

fn parse_rect(s: &str) -> Result<Rect, String> {
    let [left, top, width, height] = parse_numbers::<4>(s)?;
    Ok(Rect::new(left, top, width, height))
}

fn parse_size(s: &str) -> Result<Size, String> {
    let [width, height] = parse_numbers::<2>(s)?;
    Ok(Size::new(width, height))
}

pub fn run(config: &AppConfig, args: PlaceArgs) -> Result<()> {
    let viewport = Viewport {
        scale: args.scale,
        ..Viewport::new(args.viewport.width, args.viewport.height)
    };
    let mut engine = PlacementEngine::new(config.popover.placement());
    let placement = engine.place(args.anchor, viewport, args.content);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&placement)?);
        return Ok(());
    }

    println!("Anchor point: ({}, {})", placement.anchor.0, placement.anchor.1);
    println!("Position:     ({}, {})", placement.x, placement.y);
    println!(
        "Floating:     {}",
        if placement.is_floating { "yes" } else { "no" }
    );
    Ok(())
}
