//! # Handler Resolution Engine
//!
//! Resolution unwinds a chain one link at a time. For each [`Perform`] the
//! rule `H: Handle<E>` is chosen by monomorphisation, runs once, and either
//! feeds its result to the continuation or stops with a suspension:
//!
//! ```text
//! Perform<Print, _, Perform<Read, _, Done<T>>>
//!   -> Handle<Print>::handle  -> Resume(())
//!   -> Handle<Read>::handle   -> Resume(line)
//!   -> Done(t)                => Outcome::Complete(t)
//! ```
//!
//! Every place a chain may stop is part of its static type (`Run::Stop`),
//! so suspensions need no boxing or type erasure either.

use crate::descriptor::{Chain, Done, Fork, Perform};
use crate::effect::Effect;
use crate::handler::{Bundle, Control, Handle};
use crate::suspend::{Never, Stopped, Suspension, Widen};

/// The result of resolving (or resuming) a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, S> {
    /// Every effect was handled; this is the final result.
    Complete(T),
    /// A rule declined to resume.
    Suspended(S),
}

impl<T, S> Outcome<T, S> {
    /// Whether resolution ran to completion.
    pub fn is_complete(&self) -> bool {
        matches!(self, Outcome::Complete(_))
    }

    /// The final result, if any.
    pub fn complete(self) -> Option<T> {
        match self {
            Outcome::Complete(value) => Some(value),
            Outcome::Suspended(_) => None,
        }
    }

    /// The suspension, if any.
    pub fn suspended(self) -> Option<S> {
        match self {
            Outcome::Complete(_) => None,
            Outcome::Suspended(stop) => Some(stop),
        }
    }

    /// Treat a suspension as the error case.
    pub fn into_result(self) -> Result<T, S> {
        match self {
            Outcome::Complete(value) => Ok(value),
            Outcome::Suspended(stop) => Err(stop),
        }
    }

    /// Lift the suspension into an enclosing suspension set.
    pub fn map_suspended<U>(self, f: impl FnOnce(S) -> U) -> Outcome<T, U> {
        match self {
            Outcome::Complete(value) => Outcome::Complete(value),
            Outcome::Suspended(stop) => Outcome::Suspended(f(stop)),
        }
    }
}

/// Resolution of a chain by the bundle `H`.
///
/// Implemented only when `H` has a rule for every effect the chain can
/// reach, so an incomplete bundle is rejected at compile time.
pub trait Run<H: Bundle>: Chain {
    /// Every point at which resolution may stop.
    type Stop: Widen<Output = Self::Output, Fault = H::Fault, Input = H::Input>;

    /// Handle each effect outer-to-inner until the chain completes or a rule
    /// suspends.
    fn run(self) -> Outcome<Self::Output, Self::Stop>;
}

impl<H: Bundle, T> Run<H> for Done<T> {
    type Stop = Never<T, H>;

    fn run(self) -> Outcome<T, Self::Stop> {
        Outcome::Complete(self.0)
    }
}

impl<H, E, C, N> Run<H> for Perform<E, C, N>
where
    H: Handle<E>,
    E: Effect,
    C: Clone,
    N: Run<H>,
{
    type Stop = Stopped<Suspension<E, C, N, H>, N::Stop>;

    fn run(self) -> Outcome<Self::Output, Self::Stop> {
        let (payload, context, resume) = self.into_parts();
        match H::handle(payload) {
            Control::Resume(value) => {
                tracing::trace!(effect = E::KIND.name(), "resumed");
                <N as Run<H>>::run(resume(context, value)).map_suspended(Stopped::Later)
            }
            Control::Suspend(brk) => {
                tracing::debug!(effect = E::KIND.name(), "suspended");
                Outcome::Suspended(Stopped::Here(Suspension::new(context, resume, brk)))
            }
        }
    }
}

impl<H, L, R> Run<H> for Fork<L, R>
where
    H: Bundle,
    L: Run<H>,
    R: Run<H, Output = L::Output>,
{
    type Stop = Fork<L::Stop, R::Stop>;

    fn run(self) -> Outcome<Self::Output, Self::Stop> {
        match self {
            Fork::Left(left) => <L as Run<H>>::run(left).map_suspended(Fork::Left),
            Fork::Right(right) => <R as Run<H>>::run(right).map_suspended(Fork::Right),
        }
    }
}
