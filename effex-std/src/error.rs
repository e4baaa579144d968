//! Faults raised by the standard bundles.

use std::io;

use thiserror::Error;

/// Why a standard bundle suspended, or why a scenario could not be loaded.
#[derive(Debug, Error)]
pub enum Failure {
    /// `Read` found no more input.
    #[error("input exhausted")]
    EndOfInput,

    /// A fallible step reported an error.
    #[error("attempt failed: {0}")]
    Attempt(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid scenario: {0}")]
    Scenario(#[from] toml::de::Error),
}

impl Failure {
    /// Whether resuming with a line of input is the expected recovery.
    pub fn wants_input(&self) -> bool {
        matches!(self, Failure::EndOfInput | Failure::Attempt(_))
    }
}
