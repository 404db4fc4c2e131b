//! Layer Shortcuts - headless tools for layer visibility shortcut configurations
//!
//! Validates configuration files, lists the technologies found in the search
//! path and simulates key presses against a layer list.

use clap::{Parser, Subcommand};
use layer_shortcuts::cli::{ListArgs, SimulateArgs, ValidateArgs};
use layer_shortcuts::constants::APP_BINARY_NAME;
use layer_shortcuts::settings::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Layer Shortcuts - single-key layer visibility shortcuts for layout viewers
#[derive(Parser, Debug)]
#[command(name = APP_BINARY_NAME, author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a configuration file
    Validate(ValidateArgs),
    /// List configured technologies
    List(ListArgs),
    /// Simulate key presses against a layer list
    Simulate(SimulateArgs),
}

fn init_tracing(verbose: bool) {
    let level = match Settings::load() {
        Ok(settings) => settings.logging.level,
        Err(e) => {
            eprintln!("{APP_BINARY_NAME}: warning: {e:#}; using log level 'info'");
            "info".to_string()
        }
    };
    let filter = if verbose { "debug".to_string() } else { level };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Validate(args) => args.execute(),
        Commands::List(args) => args.execute(),
        Commands::Simulate(args) => args.execute(),
    };

    if let Err(e) = result {
        eprintln!("{APP_BINARY_NAME}: {e}");
        std::process::exit(e.exit_code());
    }
}
