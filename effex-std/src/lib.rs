//! # Effex Standard Effects
//!
//! Small, concrete effects and handler bundles built on `effex`, used by the
//! demo binary and as a reference for writing your own.
//!
//! ## Effects
//!
//! - [`Print`] - write one line
//! - [`Read`] - read one line
//! - [`Attempt`] - surface a fallible step to the handler
//! - [`Log`] - structured log line, handled by default through `tracing`
//!
//! ## Bundles
//!
//! - [`Console`] - real stdin/stdout
//! - [`Scripted`] - in-memory input queue and transcript ([`script`])
//! - [`Lenient`] - `Scripted` I/O, but failed attempts resume with a default
//!
//! All bundles suspend with a [`Failure`] and resume with a `String`.

pub mod bundles;
pub mod effects;
pub mod error;
pub mod programs;
pub mod scenario;
pub mod script;

pub use bundles::{Console, Lenient, Scripted};
pub use effects::{Attempt, Level, Log, Print, Read};
pub use error::Failure;
pub use programs::pizza;
pub use scenario::Scenario;
