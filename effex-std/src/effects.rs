//! Effect payloads.

use effex::{Effect, Fallback};

/// Write one line of output.
#[derive(Debug, Clone, PartialEq, Eq, Effect)]
pub struct Print(pub String);

/// Read one line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Effect)]
#[effect(output = String)]
pub struct Read;

/// Hand the result of a fallible step to the handler.
///
/// `Ok` values pass straight through; what happens on `Err` is up to the
/// bundle.
#[derive(Debug, Clone, PartialEq, Eq, Effect)]
#[effect(output = T)]
pub struct Attempt<T>(pub Result<T, String>);

/// Severity of a [`Log`] line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
}

/// A log line; any bundle with a catch-all rule forwards it to `tracing`.
#[derive(Debug, Clone, PartialEq, Eq, Effect)]
pub struct Log {
    pub level: Level,
    pub message: String,
}

impl Log {
    pub fn debug(message: impl Into<String>) -> Self {
        Self {
            level: Level::Debug,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            message: message.into(),
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            level: Level::Warn,
            message: message.into(),
        }
    }
}

impl Fallback for Log {
    fn fallback(self) {
        match self.level {
            Level::Debug => tracing::debug!(target: "effex::log", "{}", self.message),
            Level::Info => tracing::info!(target: "effex::log", "{}", self.message),
            Level::Warn => tracing::warn!(target: "effex::log", "{}", self.message),
        }
    }
}
