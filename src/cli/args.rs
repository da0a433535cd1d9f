//! CLI argument parsing using clap.
//!
//! Contains the Cli struct, Commands enum, and all subcommand enums.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

fn heading(text: &str) -> String {
    if console::colors_enabled() {
        console::style(text).cyan().bold().to_string()
    } else {
        text.to_string()
    }
}

/// Create custom help text with consistent styling
fn create_custom_help() -> String {
    let mut help = String::new();

    help.push_str(&format!("{}\n", heading("Quick Start:")));
    help.push_str("  $ sunsys init                          # Create .sunsys/settings.toml\n");
    help.push_str("  $ sunsys simulate model.toml --steps 50 # Step a model, print y(k)\n");
    help.push_str("  $ sunsys docs lookup setTs             # Find documentation links\n");
    help.push_str("  $ sunsys docs validate --dir html/search\n\n");

    help.push_str("Discrete time systems toolkit and API documentation index.\n\n");

    help.push_str(&heading("Usage:"));
    help.push_str(" sunsys [OPTIONS] <COMMAND>\n\n");

    help.push_str(&format!("{}\n", heading("Commands:")));
    help.push_str("  init          Set up .sunsys directory\n");
    help.push_str("  config        Display active settings\n");
    help.push_str("  simulate      Run a model described in a TOML file\n");
    help.push_str("  docs          Query the documentation search index\n");
    help.push_str("  help          Print this message or the help of the given subcommand(s)\n\n");

    help.push_str("See 'sunsys help <command>' for more information on a specific command.\n\n");

    help.push_str(&format!("{}\n", heading("Options:")));
    help.push_str("  -c, --config <CONFIG>  Path to custom settings.toml file\n");
    help.push_str("  -h, --help             Print help\n");
    help.push_str("  -V, --version          Print version\n");

    help
}

/// Discrete time systems toolkit
#[derive(Parser, Debug)]
#[command(
    name = "sunsys",
    version = env!("CARGO_PKG_VERSION"),
    about = "Discrete time systems toolkit",
    long_about = "Simulate discrete time systems and query their API documentation index.",
    next_line_help = true,
    styles = clap_cargo_style(),
    override_help = create_custom_help()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize project
    #[command(about = "Set up .sunsys directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration
    #[command(about = "Display active settings")]
    Config,

    /// Run a model described in a TOML file
    #[command(
        about = "Run a model described in a TOML file",
        after_help = "Examples:\n  sunsys simulate filter.toml\n  sunsys simulate filter.toml --steps 500 --json"
    )]
    Simulate {
        /// Simulation file with [model] and [input] tables
        file: PathBuf,

        /// Number of steps (overrides the file and simulation.steps)
        #[arg(short, long)]
        steps: Option<usize>,

        /// Sampling time for models without one (overrides simulation.sampling_time)
        #[arg(long)]
        ts: Option<f64>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Query the documentation search index
    #[command(about = "Query the documentation search index")]
    Docs {
        #[command(subcommand)]
        action: DocsAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum DocsAction {
    /// Exact, case-insensitive lookup of a symbol name
    #[command(after_help = "Examples:\n  sunsys docs lookup setTs\n  sunsys docs lookup SS_FCN --json")]
    Lookup {
        /// Symbol name or raw search key
        name: String,

        /// Directory with the search fragments (overrides docs.search_dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Check the search fragments for structural problems
    Validate {
        #[arg(short, long)]
        dir: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// List owning scopes (namespaces, classes, files)
    Scopes {
        #[arg(short, long)]
        dir: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// List the documented members of a scope
    Members {
        /// Scope such as `sun::RK4`
        scope: String,

        #[arg(short, long)]
        dir: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_docs_lookup() {
        let cli = Cli::parse_from(["sunsys", "docs", "lookup", "setTs", "--json", "-c", "x.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        match cli.command {
            Commands::Docs {
                action: DocsAction::Lookup { name, dir, json },
            } => {
                assert_eq!(name, "setTs");
                assert!(dir.is_none());
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_simulate() {
        let cli = Cli::parse_from(["sunsys", "simulate", "m.toml", "--steps", "10", "--ts", "0.5"]);
        match cli.command {
            Commands::Simulate {
                file,
                steps,
                ts,
                json,
            } => {
                assert_eq!(file, PathBuf::from("m.toml"));
                assert_eq!(steps, Some(10));
                assert_eq!(ts, Some(0.5));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
