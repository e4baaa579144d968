//! # Effex
//!
//! Direct-style algebraic effects with no heap allocation and no run-time
//! dispatch.
//!
//! An effectful block is compiled into a chain of effect descriptors whose
//! *type* is its effect signature; a handler bundle (a type) resolves that
//! chain with one statically chosen rule per effect.
//!
//! ```
//! use effex::{effectful, perform, Bundle, Chain, Control, Effect, Handle};
//!
//! #[derive(Effect)]
//! #[effect(output = u32)]
//! struct Roll;
//!
//! struct Loaded;
//! impl Bundle for Loaded {
//!     type Fault = ();
//!     type Input = u32;
//! }
//! impl Handle<Roll> for Loaded {
//!     fn handle(_: Roll) -> Control<u32, (), u32> {
//!         Control::Resume(6)
//!     }
//! }
//!
//! let bonus = 10u32;
//! let game = effectful! {
//!     let bonus = bonus;
//!     let first = perform!(Roll);
//!     let second = perform!(Roll);
//!     first + second + bonus
//! };
//! assert_eq!(game.handle::<Loaded>().complete(), Some(22));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! effectful! { .. }           effex-macros: live-capture transform
//!        |
//!        v
//! Perform<E, C, N> / Fork / Done      descriptor: the effect chain
//!        |                                   |
//!        | chain.handle::<H>()               | Chain::ROW
//!        v                                   v
//! Run<H> + Handle<E>          row: Conforms<S> (compile time only)
//!        |
//!        v
//! Outcome::Complete(T) | Outcome::Suspended(S: Suspended)
//! ```
//!
//! ## Module Structure
//!
//! - [`effect`] - effect payloads and kinds
//! - [`descriptor`] - `Perform`, `Fork`, `Done` and the `Chain` trait
//! - [`handler`] - bundles, rules, catch-alls and delegation
//! - [`engine`] - handler resolution
//! - [`suspend`] - resumable suspensions
//! - [`row`] - effect row constraints

#![warn(rust_2018_idioms)]

extern crate self as effex;

pub mod descriptor;
pub mod effect;
pub mod engine;
pub mod handler;
pub mod row;
pub mod suspend;

pub use descriptor::{Chain, Done, Fork, Perform, Signature};
pub use effect::{Effect, Kind};
pub use engine::{Outcome, Run};
pub use handler::{Break, Bundle, Control, Fallback, Handle};
pub use row::{AnyOutput, Conforms, Constraint, Returns, RowSpec, Violation};
pub use suspend::{Never, Stopped, Suspended, Suspension, Widen};

#[cfg(feature = "macros")]
pub use effex_macros::{effectful, row, Effect};

/// Perform an effect inside an `effectful!` block.
///
/// `effectful!` rewrites every `perform!` it finds; one that survives to
/// expansion is outside such a block.
///
/// ```compile_fail
/// let x = effex::perform!(());
/// ```
///
/// Inside a block it must stand on its own, not inside a larger expression:
///
/// ```compile_fail
/// use effex::{effectful, perform, Effect};
///
/// #[derive(Effect)]
/// #[effect(output = u32)]
/// struct Roll;
///
/// let chain = effectful! {
///     let total = 1 + perform!(Roll);
///     total
/// };
/// ```
#[macro_export]
macro_rules! perform {
    ($($payload:tt)*) => {
        ::core::compile_error!(
            "`perform!` can only be used directly inside an `effectful!` block"
        )
    };
}
