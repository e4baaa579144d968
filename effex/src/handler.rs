//! # Handler Capability Bundles
//!
//! A bundle is a *type*, never a value: it is named at the resolution site
//! (`chain.handle::<Console>()`) and carries its whole rule set through the
//! trait system. Each rule is one `Handle<E>` impl.
//!
//! ## Rule Selection
//!
//! Rules are selected by monomorphisation on the concrete effect type:
//!
//! - an exact rule is an `impl Handle<Print> for Bundle`
//! - a catch-all is a blanket `impl<E: Fallback> Handle<E> for Bundle`
//!
//! Coherence guarantees at most one applicable rule per effect type. An
//! effect with an exact rule that also opts into [`Fallback`] makes the two
//! impls overlap, which is a build error, so a catch-all never shadows or
//! competes with an exact rule. A missing rule is also a build error:
//!
//! ```compile_fail
//! use effex::{effectful, perform, Bundle, Chain, Effect};
//!
//! #[derive(Effect)]
//! struct Ping;
//!
//! struct Empty;
//! impl Bundle for Empty {
//!     type Fault = ();
//!     type Input = ();
//! }
//!
//! let chain = effectful! { perform!(Ping); };
//! let _ = chain.handle::<Empty>();
//! ```
//!
//! and so is an effect with both an exact rule and a catch-all:
//!
//! ```compile_fail
//! use effex::{Bundle, Control, Effect, Fallback, Handle};
//!
//! #[derive(Effect)]
//! struct Ping;
//! impl Fallback for Ping {
//!     fn fallback(self) {}
//! }
//!
//! struct Both;
//! impl Bundle for Both {
//!     type Fault = ();
//!     type Input = ();
//! }
//! impl Handle<Ping> for Both {
//!     fn handle(_: Ping) -> Control<(), (), ()> {
//!         Control::Resume(())
//!     }
//! }
//! impl<E: Fallback> Handle<E> for Both {
//!     fn handle(effect: E) -> Control<E::Output, (), ()> {
//!         Control::Resume(effect.fallback())
//!     }
//! }
//! ```
//!
//! ## Suspending
//!
//! A rule answers with [`Control`]: either a value to resume with, or a
//! [`Break`] that stops resolution and hands a resumable suspension back to
//! the caller.

/// A named rule set that can resolve effect chains.
pub trait Bundle: 'static {
    /// Domain payload carried by a suspension (for example an error).
    type Fault;

    /// The value external code supplies when resuming a suspension.
    type Input;
}

/// The rule a bundle uses for one effect type.
#[diagnostic::on_unimplemented(
    message = "handler bundle `{Self}` has no rule for effect `{E}`",
    label = "no `Handle<{E}>` impl for this bundle",
    note = "add `impl Handle<{E}> for {Self}`, delegate it, or implement `Fallback` for the effect"
)]
pub trait Handle<E: crate::Effect>: Bundle {
    /// Inspect the payload, perform the action and decide whether to resume.
    fn handle(effect: E) -> Control<E::Output, Self::Fault, Self::Input>;
}

/// Default-handling capability for catch-all rules.
///
/// Bundles opt in with a blanket `impl<E: Fallback> Handle<E>`.
pub trait Fallback: crate::Effect {
    /// Handle the effect without any bundle-specific logic.
    fn fallback(self) -> Self::Output;
}

/// A rule's decision.
pub enum Control<T, F, I> {
    /// Continue the computation with this result.
    Resume(T),
    /// Stop resolution and return a suspension.
    Suspend(Break<T, F, I>),
}

/// The payload of a suspending decision.
pub struct Break<T, F, I> {
    pub(crate) fault: F,
    pub(crate) adapt: fn(I) -> T,
}

impl<T, F, I> Break<T, F, I> {
    /// The domain payload.
    pub fn fault(&self) -> &F {
        &self.fault
    }
}

impl<T, F, I> Control<T, F, I> {
    /// Suspend; a later resumption input converts into the effect's result
    /// with `From`.
    pub fn suspend(fault: F) -> Self
    where
        T: From<I>,
    {
        Control::Suspend(Break {
            fault,
            adapt: <T as From<I>>::from,
        })
    }

    /// Suspend with an explicit conversion from resumption input to result.
    pub fn suspend_with(fault: F, adapt: fn(I) -> T) -> Self {
        Control::Suspend(Break { fault, adapt })
    }

    /// Whether the rule chose to resume.
    pub fn is_resume(&self) -> bool {
        matches!(self, Control::Resume(_))
    }

    /// Convert the fault, keeping the resumption adapter.
    pub fn map_fault<G>(self, f: impl FnOnce(F) -> G) -> Control<T, G, I> {
        match self {
            Control::Resume(value) => Control::Resume(value),
            Control::Suspend(Break { fault, adapt }) => Control::Suspend(Break {
                fault: f(fault),
                adapt,
            }),
        }
    }
}

/// Delegate rules of one bundle to another.
///
/// ```text
/// delegate!(Lenient => Scripted: Print, Read);
/// ```
///
/// Both bundles must share `Input`; faults convert with `From`.
#[macro_export]
macro_rules! delegate {
    ($outer:ty => $inner:ty: $($effect:ty),+ $(,)?) => {
        $(
            impl $crate::Handle<$effect> for $outer {
                fn handle(
                    effect: $effect,
                ) -> $crate::Control<
                    <$effect as $crate::Effect>::Output,
                    <$outer as $crate::Bundle>::Fault,
                    <$outer as $crate::Bundle>::Input,
                > {
                    <$inner as $crate::Handle<$effect>>::handle(effect)
                        .map_fault(::core::convert::Into::into)
                }
            }
        )+
    };
}
