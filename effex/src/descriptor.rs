//! # Effect Descriptors
//!
//! The value representation of "an effect request, the bindings the rest of
//! the computation needs, and the rest of the computation".
//!
//! ```text
//! Perform<Print, (),        fn((), ())        -> Perform<Read, (u8,), ...>>
//!         payload context   continuation
//! ```
//!
//! A chain is built from three links:
//!
//! - [`Perform`] - one effect request with its captured context
//! - [`Fork`] - a run-time branch whose arms continue with different effects
//! - [`Done`] - the plain result
//!
//! The nesting of these types *is* the effect signature of a computation.
//! The continuation is a plain `fn` pointer: contexts are passed by value and
//! nothing is boxed.

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::mem;

use crate::effect::Effect;
use crate::engine::{Outcome, Run};
use crate::handler::Bundle;
use crate::row::{Conforms, Row, RowSpec, Step};

/// A single effect request and the computation that follows it.
pub struct Perform<E: Effect, C, N> {
    payload: E,
    context: C,
    resume: fn(C, E::Output) -> N,
}

impl<E: Effect, C, N> Perform<E, C, N> {
    /// Create a descriptor from a payload, its context record and the
    /// continuation that consumes both.
    pub fn new(payload: E, context: C, resume: fn(C, E::Output) -> N) -> Self {
        Self {
            payload,
            context,
            resume,
        }
    }

    /// The effect-specific request data.
    pub fn payload(&self) -> &E {
        &self.payload
    }

    /// The bindings captured for the continuation.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Split the descriptor into payload, context and continuation.
    pub fn into_parts(self) -> (E, C, fn(C, E::Output) -> N) {
        (self.payload, self.context, self.resume)
    }

    /// Advance past this effect by supplying its result.
    pub fn continue_with(self, value: E::Output) -> N {
        (self.resume)(self.context, value)
    }
}

impl<E, C, N> fmt::Debug for Perform<E, C, N>
where
    E: Effect + fmt::Debug,
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Perform")
            .field("kind", &E::KIND.name())
            .field("payload", &self.payload)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// The end of a chain: a computation with no effects left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Done<T>(pub T);

impl<T> Done<T> {
    /// Unwrap the final result.
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// A chain that continues down one of two statically known sub-chains.
///
/// Also used as the suspension set of a forked chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fork<L, R> {
    /// The first arm was taken.
    Left(L),
    /// The second arm was taken.
    Right(R),
}

/// Static description of an effect chain type.
pub trait Chain: Sized {
    /// The plain result produced once every effect has been handled.
    type Output;

    /// Every path through the chain with the kind and context size of each
    /// step. Evaluated only when a row constraint asks for it.
    const ROW: Row;

    /// Write the human-readable nested signature of this chain.
    fn write_signature(f: &mut fmt::Formatter<'_>) -> fmt::Result;

    /// Displayable signature, e.g. `Print(Read(i32))`.
    fn signature() -> Signature<Self> {
        Signature(PhantomData)
    }

    /// Resolve this chain with the handler bundle `H`.
    fn handle<H>(self) -> Outcome<Self::Output, <Self as Run<H>>::Stop>
    where
        H: Bundle,
        Self: Run<H>,
    {
        <Self as Run<H>>::run(self)
    }

    /// Assert at compile time that this chain satisfies the row constraint
    /// `S`; a violation fails the build at the monomorphised call site.
    fn conform<S: RowSpec>(self) -> Self
    where
        Self: Conforms<S>,
    {
        #[allow(clippy::let_unit_value)]
        let () = <Self as Conforms<S>>::PROOF;
        self
    }
}

impl<T> Chain for Done<T> {
    type Output = T;

    const ROW: Row = Row::pure();

    fn write_signature(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&short_type_name(type_name::<T>()))
    }
}

impl<E: Effect, C, N: Chain> Chain for Perform<E, C, N> {
    type Output = N::Output;

    const ROW: Row = N::ROW.prepend(Step::new(E::KIND, mem::size_of::<C>()));

    fn write_signature(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", E::KIND.name())?;
        N::write_signature(f)?;
        f.write_str(")")
    }
}

impl<L, R> Chain for Fork<L, R>
where
    L: Chain,
    R: Chain<Output = L::Output>,
{
    type Output = L::Output;

    const ROW: Row = L::ROW.fork(R::ROW);

    fn write_signature(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        L::write_signature(f)?;
        f.write_str(" | ")?;
        R::write_signature(f)?;
        f.write_str("]")
    }
}

/// Displayable chain signature returned by [`Chain::signature`].
pub struct Signature<C>(PhantomData<fn() -> C>);

impl<C: Chain> fmt::Display for Signature<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        C::write_signature(f)
    }
}

impl<C: Chain> fmt::Debug for Signature<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        C::write_signature(f)
    }
}

/// Strip module paths from a `type_name` string:
/// `core::option::Option<alloc::string::String>` becomes `Option<String>`.
fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            segment.push(ch);
        } else {
            out.push_str(segment.rsplit("::").next().unwrap_or(""));
            segment.clear();
            out.push(ch);
        }
    }
    out.push_str(segment.rsplit("::").next().unwrap_or(""));
    out
}
