//! Error types for loading documentation search fragments.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Failed to set up the JavaScript grammar: {0}")]
    Grammar(String),

    #[error("{fragment}: tree-sitter returned no tree")]
    ParseFailed { fragment: String },

    #[error("{fragment}: syntax error at line {line}, column {column}")]
    Syntax {
        fragment: String,
        line: usize,
        column: usize,
    },

    #[error("{fragment}: no `searchData` declaration found")]
    MissingSearchData { fragment: String },

    #[error("{fragment}: record {index} is malformed: {reason}")]
    MalformedRecord {
        fragment: String,
        index: usize,
        reason: String,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("No search fragments (*.js) found in {0}")]
    NoFragments(PathBuf),
}

impl IndexError {
    /// Short hint for the command line.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NotADirectory(_) | Self::NoFragments(_) => {
                Some("Point --dir (or docs.search_dir in settings.toml) at the html/search directory")
            }
            Self::Syntax { .. } | Self::MalformedRecord { .. } | Self::MissingSearchData { .. } => {
                Some("Regenerate the documentation; the fragment does not look like search data")
            }
            _ => None,
        }
    }
}

pub type IndexResult<T> = Result<T, IndexError>;
