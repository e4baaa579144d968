//! Handler bundles for the standard effects.
//!
//! Every bundle here suspends with [`Failure`] and resumes with a `String`
//! line, so the same driver (see [`Scenario::play`]) works with all of
//! them. Each also has a catch-all rule, so any effect implementing
//! [`Fallback`] (such as [`Log`]) is handled without a dedicated rule.
//!
//! [`Scenario::play`]: crate::Scenario::play
//! [`Log`]: crate::Log

use std::io::{self, BufRead, Write};

use effex::{delegate, Bundle, Control, Effect, Fallback, Handle};
use tracing::{debug, warn};

use crate::effects::{Attempt, Print, Read};
use crate::error::Failure;
use crate::script;

type Rule<E> = Control<<E as Effect>::Output, Failure, String>;

/// Surface a failed attempt as a suspension; resuming supplies the value.
fn attempt_or_suspend<T: From<String>>(effect: Attempt<T>) -> Rule<Attempt<T>> {
    match effect.0 {
        Ok(value) => Control::Resume(value),
        Err(reason) => {
            debug!(%reason, "attempt failed, suspending");
            Control::suspend(Failure::Attempt(reason))
        }
    }
}

/// Terminal I/O.
pub struct Console;

impl Bundle for Console {
    type Fault = Failure;
    type Input = String;
}

impl Handle<Print> for Console {
    fn handle(effect: Print) -> Rule<Print> {
        let mut out = io::stdout().lock();
        match writeln!(out, "{}", effect.0).and_then(|()| out.flush()) {
            Ok(()) => Control::Resume(()),
            Err(err) => Control::suspend_with(Failure::Io(err), |_| ()),
        }
    }
}

impl Handle<Read> for Console {
    fn handle(_: Read) -> Rule<Read> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => Control::suspend(Failure::EndOfInput),
            Ok(_) => Control::Resume(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(err) => Control::suspend(Failure::Io(err)),
        }
    }
}

impl<T: From<String>> Handle<Attempt<T>> for Console {
    fn handle(effect: Attempt<T>) -> Rule<Attempt<T>> {
        attempt_or_suspend(effect)
    }
}

impl<E: Fallback> Handle<E> for Console {
    fn handle(effect: E) -> Rule<E> {
        Control::Resume(effect.fallback())
    }
}

/// In-memory I/O over the thread's [`script`].
///
/// `Read` on an empty queue suspends with [`Failure::EndOfInput`]; resume
/// with the line that should have been read.
pub struct Scripted;

impl Bundle for Scripted {
    type Fault = Failure;
    type Input = String;
}

impl Handle<Print> for Scripted {
    fn handle(effect: Print) -> Rule<Print> {
        debug!(line = %effect.0, "print");
        script::write_line(effect.0);
        Control::Resume(())
    }
}

impl Handle<Read> for Scripted {
    fn handle(_: Read) -> Rule<Read> {
        match script::next_line() {
            Some(line) => {
                debug!(%line, "read");
                Control::Resume(line)
            }
            None => Control::suspend(Failure::EndOfInput),
        }
    }
}

impl<T: From<String>> Handle<Attempt<T>> for Scripted {
    fn handle(effect: Attempt<T>) -> Rule<Attempt<T>> {
        attempt_or_suspend(effect)
    }
}

impl<E: Fallback> Handle<E> for Scripted {
    fn handle(effect: E) -> Rule<E> {
        Control::Resume(effect.fallback())
    }
}

/// [`Scripted`] I/O that never stops on a failed attempt: it logs the
/// reason and continues with `T::default()`.
pub struct Lenient;

impl Bundle for Lenient {
    type Fault = Failure;
    type Input = String;
}

delegate!(Lenient => Scripted: Print, Read);

impl<T: Default> Handle<Attempt<T>> for Lenient {
    fn handle(effect: Attempt<T>) -> Rule<Attempt<T>> {
        match effect.0 {
            Ok(value) => Control::Resume(value),
            Err(reason) => {
                warn!(%reason, "attempt failed, continuing with default");
                Control::Resume(T::default())
            }
        }
    }
}

impl<E: Fallback> Handle<E> for Lenient {
    fn handle(effect: E) -> Rule<E> {
        Control::Resume(effect.fallback())
    }
}
