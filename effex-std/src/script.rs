//! Thread-local input queue and transcript backing the [`Scripted`]
//! bundle.
//!
//! Bundles are types, not values, so their state lives beside them. Each
//! thread has its own script; tests running in parallel never see each
//! other's lines.
//!
//! [`Scripted`]: crate::Scripted

use std::cell::RefCell;
use std::collections::VecDeque;

#[derive(Default)]
struct Script {
    input: VecDeque<String>,
    transcript: Vec<String>,
}

thread_local! {
    static SCRIPT: RefCell<Script> = RefCell::new(Script::default());
}

/// Queue lines for `Read` to return, after any already queued.
pub fn feed<I, S>(lines: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    SCRIPT.with(|script| {
        script
            .borrow_mut()
            .input
            .extend(lines.into_iter().map(Into::into));
    });
}

/// Take everything printed so far, leaving the transcript empty.
pub fn take_output() -> Vec<String> {
    SCRIPT.with(|script| std::mem::take(&mut script.borrow_mut().transcript))
}

/// Number of queued lines not yet read.
pub fn pending() -> usize {
    SCRIPT.with(|script| script.borrow().input.len())
}

/// Clear both the input queue and the transcript.
pub fn reset() {
    SCRIPT.with(|script| *script.borrow_mut() = Script::default());
}

pub(crate) fn next_line() -> Option<String> {
    SCRIPT.with(|script| script.borrow_mut().input.pop_front())
}

pub(crate) fn write_line(line: String) {
    SCRIPT.with(|script| script.borrow_mut().transcript.push(line));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_come_back_in_order() {
        reset();
        feed(["a", "b"]);
        feed(vec![String::from("c")]);
        assert_eq!(pending(), 3);
        assert_eq!(next_line().as_deref(), Some("a"));
        assert_eq!(next_line().as_deref(), Some("b"));
        assert_eq!(next_line().as_deref(), Some("c"));
        assert_eq!(next_line(), None);
    }

    #[test]
    fn test_take_output_drains() {
        reset();
        write_line("one".into());
        write_line("two".into());
        assert_eq!(take_output(), vec!["one", "two"]);
        assert!(take_output().is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        feed(["left over"]);
        write_line("noise".into());
        reset();
        assert_eq!(pending(), 0);
        assert!(take_output().is_empty());
    }
}
