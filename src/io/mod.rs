//! Output handling for the CLI.
//!
//! This module provides:
//! - The JSON envelope used by `--json`
//! - Exit codes shared by all commands

pub mod envelope;
pub mod exit_code;

pub use envelope::{EntityType, Envelope, MessageType, Meta, ResultCode, SCHEMA_VERSION, Status};
pub use exit_code::ExitCode;

/// Output format chosen on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }

    pub fn is_json(self) -> bool {
        self == Self::Json
    }
}

/// Print an envelope on stdout and return its exit code.
pub fn emit<T: serde::Serialize>(envelope: &Envelope<T>) -> ExitCode {
    match envelope.to_json() {
        Ok(json) => {
            println!("{json}");
            envelope.exit_code()
        }
        Err(e) => {
            eprintln!("Error: failed to serialize output: {e}");
            ExitCode::GeneralError
        }
    }
}
