//! sunsys command line entry point.

use clap::Parser;

use sunsys::Settings;
use sunsys::cli::commands;
use sunsys::cli::{Cli, Commands};
use sunsys::io::ExitCode;
use sunsys::logging;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // For non-init commands, check if project is initialized
    if cli.config.is_none() && !matches!(cli.command, Commands::Init { .. }) {
        if let Err(warning) = Settings::check_init() {
            eprintln!("Warning: {warning}");
            eprintln!("Using default configuration for now.");
        }
    }

    let loaded = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let settings = match loaded {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if cli.config.is_some() {
                return ExitCode::ConfigError.into();
            }
            Settings::default()
        }
    };

    logging::init_with_config(&settings.logging);
    tracing::debug!("workspace root: {:?}", settings.workspace_root);

    let code = match cli.command {
        Commands::Init { force } => commands::init::run_init(force),
        Commands::Config => commands::init::run_config(&settings),
        Commands::Simulate {
            file,
            steps,
            ts,
            json,
        } => commands::simulate::run(&file, steps, ts, json, &settings),
        Commands::Docs { action } => commands::docs::run(action, &settings),
    };

    code.into()
}
