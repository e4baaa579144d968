//! Demo scenarios loaded from TOML.
//!
//! ```toml
//! input = ["cheese"]
//! resume = ["pineapple on"]
//! ```

use std::fs;
use std::path::Path;

use effex::{Bundle, Chain, Outcome, Run, Suspended, Widen};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Failure;
use crate::script;

/// Input for one run of a program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Lines queued for `Read` before the run starts.
    pub input: Vec<String>,

    /// Replies used, in order, to resume each suspension.
    pub resume: Vec<String>,
}

impl Scenario {
    /// The built-in pizza run: echo `cheese`, then name the topping.
    pub fn pizza() -> Self {
        Self {
            input: vec!["cheese".to_string()],
            resume: vec!["pineapple on".to_string()],
        }
    }

    /// Parse a scenario from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, Failure> {
        Ok(toml::from_str(text)?)
    }

    /// Load a scenario file.
    pub fn load(path: &Path) -> Result<Self, Failure> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Resolve `chain` with `H`, resuming each suspension with the next
    /// reply. `input` is fed to the thread's script first.
    ///
    /// Returns the last suspension if the replies run out, or as soon as a
    /// suspension's fault is not one a line of input recovers from.
    pub fn play<H, C>(&self, chain: C) -> Outcome<C::Output, <C as Run<H>>::Stop>
    where
        H: Bundle<Fault = Failure, Input = String>,
        C: Run<H>,
    {
        script::feed(self.input.iter().cloned());
        let mut replies = self.resume.iter();
        let mut outcome = chain.handle::<H>();
        loop {
            let stop = match outcome {
                Outcome::Complete(value) => return Outcome::Complete(value),
                Outcome::Suspended(stop) => stop,
            };
            if !stop.fault().wants_input() {
                warn!(effect = %stop.kind(), fault = %stop.fault(), "not resumable with a reply");
                return Outcome::Suspended(stop);
            }
            let Some(reply) = replies.next() else {
                return Outcome::Suspended(stop);
            };
            info!(effect = %stop.kind(), fault = %stop.fault(), %reply, "resuming");
            outcome = stop
                .resume(reply.clone())
                .map_suspended(<<C as Run<H>>::Stop as Widen>::widen);
        }
    }
}
