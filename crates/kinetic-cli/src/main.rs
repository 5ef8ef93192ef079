use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kinetic_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "kinetic")]
#[command(author, version, about = "Spring physics and keyframe scheduling playground")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the terminal demo
    Run,
    /// Sample a spring trajectory
    Simulate(commands::simulate::SimulateArgs),
    /// Drive a popover against a headless timeline and dump its keyframes
    Keyframes(commands::keyframes::KeyframesArgs),
    /// Compute a popover placement
    Place(commands::place::PlaceArgs),
    /// Release the tick wheel and report where it settles
    Wheel(commands::wheel::WheelArgs),
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Handle commands
    match cli.command {
        Some(Commands::Run) | None => commands::run::run(config),
        Some(Commands::Simulate(args)) => commands::simulate::run(&config, args),
        Some(Commands::Keyframes(args)) => commands::keyframes::run(&config, args),
        Some(Commands::Place(args)) => commands::place::run(&config, args),
        Some(Commands::Wheel(args)) => commands::wheel::run(&config, args),
        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Path => commands::config::path(),
            ConfigAction::Init { force } => commands::config::init(force).await,
        },
    }
}
