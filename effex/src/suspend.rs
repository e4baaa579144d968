//! # Resumable Suspensions
//!
//! When a rule declines to resume, resolution stops and returns a
//! [`Suspension`]: the residual context and continuation of the effect that
//! stopped, plus the rule's domain fault.
//!
//! ## States
//!
//! ```text
//!            rule returns Control::Suspend
//!   Running ------------------------------> Suspended
//!      ^                                        |
//!      +---------- Suspended::resume(input) ----+
//! ```
//!
//! Resuming borrows the suspension and clones its context, so one suspension
//! can be resumed any number of times, each run independent of the others.
//! Dropping a suspension simply discards the rest of the computation.
//!
//! ## Suspension Sets
//!
//! Which effect stopped is known only at run time, but the set of effects
//! that *could* have stopped is static. A chain's `Run::Stop` type spells
//! that set out:
//!
//! - [`Stopped`] - stopped at this effect (`Here`) or further down (`Later`)
//! - [`Fork`] - stopped inside one arm of a branch
//! - [`Never`] - no effects left; uninhabited

use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;

use crate::descriptor::Fork;
use crate::effect::{Effect, Kind};
use crate::engine::{Outcome, Run};
use crate::handler::{Break, Bundle};

/// Something that can be resumed with a bundle's input.
pub trait Suspended: Sized {
    /// Final result of the whole computation.
    type Output;
    /// Domain payload explaining the stop.
    type Fault;
    /// Value supplied on resumption.
    type Input;
    /// The suspension set of the computation that remains after resuming.
    type Rest: Widen<Output = Self::Output, Fault = Self::Fault, Input = Self::Input>;

    /// The fault the rule suspended with.
    fn fault(&self) -> &Self::Fault;

    /// The kind of the effect that suspended.
    fn kind(&self) -> Kind;

    /// Re-enter resolution as if the rule had resumed with `input`.
    fn resume(&self, input: Self::Input) -> Outcome<Self::Output, Self::Rest>;
}

/// A suspension set that can absorb the suspensions of its own remainder.
pub trait Widen: Suspended {
    /// Embed a suspension raised after resuming back into this set.
    fn widen(rest: Self::Rest) -> Self;
}

/// The residual of a chain stopped at effect `E` under bundle `H`.
pub struct Suspension<E: Effect, C, N, H: Bundle> {
    context: C,
    resume: fn(C, E::Output) -> N,
    fault: H::Fault,
    adapt: fn(H::Input) -> E::Output,
}

impl<E: Effect, C, N, H: Bundle> Suspension<E, C, N, H> {
    pub(crate) fn new(
        context: C,
        resume: fn(C, E::Output) -> N,
        brk: Break<E::Output, H::Fault, H::Input>,
    ) -> Self {
        Self {
            context,
            resume,
            fault: brk.fault,
            adapt: brk.adapt,
        }
    }

    /// The bindings the stopped continuation captured.
    pub fn context(&self) -> &C {
        &self.context
    }
}

impl<E, C, N, H> Suspended for Suspension<E, C, N, H>
where
    E: Effect,
    C: Clone,
    N: Run<H>,
    H: Bundle,
{
    type Output = N::Output;
    type Fault = H::Fault;
    type Input = H::Input;
    type Rest = N::Stop;

    fn fault(&self) -> &H::Fault {
        &self.fault
    }

    fn kind(&self) -> Kind {
        E::KIND
    }

    fn resume(&self, input: H::Input) -> Outcome<N::Output, N::Stop> {
        tracing::debug!(effect = E::KIND.name(), "resuming suspension");
        let value = (self.adapt)(input);
        <N as Run<H>>::run((self.resume)(self.context.clone(), value))
    }
}

impl<E, C, N, H> fmt::Debug for Suspension<E, C, N, H>
where
    E: Effect,
    C: fmt::Debug,
    H: Bundle,
    H::Fault: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suspension")
            .field("kind", &E::KIND.name())
            .field("fault", &self.fault)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// Stopped at this link, or somewhere after it.
#[derive(Debug)]
pub enum Stopped<S, D> {
    /// The effect at this link suspended.
    Here(S),
    /// A later effect suspended.
    Later(D),
}

impl<S, D> Suspended for Stopped<S, D>
where
    S: Suspended<Rest = D>,
    D: Widen<Output = S::Output, Fault = S::Fault, Input = S::Input>,
{
    type Output = S::Output;
    type Fault = S::Fault;
    type Input = S::Input;
    type Rest = D;

    fn fault(&self) -> &S::Fault {
        match self {
            Stopped::Here(here) => here.fault(),
            Stopped::Later(later) => later.fault(),
        }
    }

    fn kind(&self) -> Kind {
        match self {
            Stopped::Here(here) => here.kind(),
            Stopped::Later(later) => later.kind(),
        }
    }

    fn resume(&self, input: S::Input) -> Outcome<S::Output, D> {
        match self {
            Stopped::Here(here) => here.resume(input),
            Stopped::Later(later) => later.resume(input).map_suspended(D::widen),
        }
    }
}

impl<S, D> Widen for Stopped<S, D>
where
    S: Suspended<Rest = D>,
    D: Widen<Output = S::Output, Fault = S::Fault, Input = S::Input>,
{
    fn widen(rest: D) -> Self {
        Stopped::Later(rest)
    }
}

impl<A, B> Suspended for Fork<A, B>
where
    A: Widen,
    B: Widen<Output = A::Output, Fault = A::Fault, Input = A::Input>,
{
    type Output = A::Output;
    type Fault = A::Fault;
    type Input = A::Input;
    type Rest = Fork<A::Rest, B::Rest>;

    fn fault(&self) -> &A::Fault {
        match self {
            Fork::Left(left) => left.fault(),
            Fork::Right(right) => right.fault(),
        }
    }

    fn kind(&self) -> Kind {
        match self {
            Fork::Left(left) => left.kind(),
            Fork::Right(right) => right.kind(),
        }
    }

    fn resume(&self, input: A::Input) -> Outcome<A::Output, Self::Rest> {
        match self {
            Fork::Left(left) => left.resume(input).map_suspended(Fork::Left),
            Fork::Right(right) => right.resume(input).map_suspended(Fork::Right),
        }
    }
}

impl<A, B> Widen for Fork<A, B>
where
    A: Widen,
    B: Widen<Output = A::Output, Fault = A::Fault, Input = A::Input>,
{
    fn widen(rest: Self::Rest) -> Self {
        match rest {
            Fork::Left(left) => Fork::Left(A::widen(left)),
            Fork::Right(right) => Fork::Right(B::widen(right)),
        }
    }
}

/// The empty suspension set of a finished chain.
pub struct Never<T, H> {
    void: Infallible,
    _marker: PhantomData<fn() -> (T, H)>,
}

impl<T, H: Bundle> Suspended for Never<T, H> {
    type Output = T;
    type Fault = H::Fault;
    type Input = H::Input;
    type Rest = Never<T, H>;

    fn fault(&self) -> &H::Fault {
        match self.void {}
    }

    fn kind(&self) -> Kind {
        match self.void {}
    }

    fn resume(&self, _input: H::Input) -> Outcome<T, Self> {
        match self.void {}
    }
}

impl<T, H: Bundle> Widen for Never<T, H> {
    fn widen(rest: Self) -> Self {
        rest
    }
}

impl<T, H> fmt::Debug for Never<T, H> {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.void {}
    }
}
