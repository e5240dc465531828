use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to parse a solve time or a solve log line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty solve time")]
    EmptyTime,
    #[error("invalid solve time `{0}`")]
    InvalidTime(String),
    #[error("invalid date `{0}`")]
    InvalidDate(String),
    #[error("expected `{expected}` at column {column}")]
    Expected { expected: char, column: usize },
    #[error("unterminated quote starting at column {0}")]
    UnterminatedQuote(usize),
    #[error("unexpected input after `]` at column {0}")]
    TrailingInput(usize),
    #[error("line is not valid UTF-8")]
    NotUtf8,
}

/// Errors raised while reading or appending to the solve log
#[derive(Debug, Error)]
pub enum LogError {
    #[error("solve log {} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read solve log {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to append to solve log {}: {source}", path.display())]
    Append {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Configuration problems. These are never fatal: callers fall back to defaults.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file {} not found", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed configuration: {0}")]
    Malformed(#[from] Box<figment::Error>),
}
