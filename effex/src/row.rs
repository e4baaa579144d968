//! # Effect Row Constraints
//!
//! Compile-time predicates over the *type* of an effect chain.
//!
//! ## Rows
//!
//! Every [`Chain`] exposes a `const ROW: Row`, computed from its link types:
//! one path per way through its forks, each path listing the effect kind and
//! context size of every step in order.
//!
//! ```text
//! Perform<Print, (String,), Fork<Perform<Read, (), Done<T>>, Done<T>>>
//!   path 0: Print[24] Read[0]
//!   path 1: Print[24]
//! ```
//!
//! ## Constraints
//!
//! A [`Constraint`] bundles the recognized options:
//!
//! | option | field | rule |
//! |--------|-------|------|
//! | `can(..)` | `can` | every step's kind is listed |
//! | `cannot(..)` | `cannot` | no step's kind is listed |
//! | `before(A => B)` | `before` | every `B` step is preceded by an `A` step on its path |
//! | `never_before(A => B)` | `never_before` | no path has an `A` step anywhere before a `B` step |
//! | `max_context(N)` | `max_context` | no step captures more than `N` bytes |
//! | `returns(T)` | [`RowSpec::Returns`] | the chain's output is `T` |
//!
//! Ordering is judged by reachability along a path, not adjacency.
//!
//! ## Enforcement
//!
//! [`Conforms::PROOF`] evaluates [`check`] during monomorphisation; a
//! violation is a `const` panic, which is a build error at the call site of
//! [`Chain::conform`]. Nothing is evaluated at run time.
//!
//! Rows have fixed capacity ([`MAX_DEPTH`] steps, [`MAX_PATHS`] paths).
//! A chain that does not fit yields a truncated row, which every constraint
//! rejects.
//!
//! ```
//! use effex::{effectful, perform, row, Chain, Effect};
//!
//! #[derive(Effect)]
//! #[effect(output = u8)]
//! struct Roll;
//!
//! row! { SmallDice: returns(u8), can(Roll), max_context(8) }
//!
//! let chain = effectful! {
//!     let bonus = 2u8;
//!     let n = perform!(Roll);
//!     n + bonus
//! };
//! let _checked = chain.conform::<SmallDice>();
//! ```
//!
//! The output rule is an ordinary trait bound, so a mismatch is reported
//! by the type checker:
//!
//! ```compile_fail
//! use effex::{effectful, perform, row, Chain, Effect};
//!
//! #[derive(Effect)]
//! #[effect(output = u8)]
//! struct Roll;
//!
//! row! { Numeric: returns(u8) }
//!
//! let chain = effectful! {
//!     let n = perform!(Roll);
//!     n.to_string()
//! };
//! let _checked = chain.conform::<Numeric>();
//! ```
//!
//! Membership, ordering and size violations are `const` panics raised
//! while the `conform` call is monomorphised. They stop any build that
//! generates code for it, doctests included, but not a metadata-only
//! `cargo check`. The chain below prints, reads a name, then prints again
//! with the name (a `String`) in its context:
//!
//! ```
//! # use effex::{effectful, perform, row, Chain, Effect};
//! # #[derive(Effect)] struct Print(&'static str);
//! # #[derive(Effect)] #[effect(output = String)] struct Read;
//! # fn greet() -> impl Chain<Output = usize> {
//! #     effectful! {
//! #         perform!(Print("name?"));
//! #         let name = perform!(Read);
//! #         perform!(Print("thanks"));
//! #         name.len()
//! #     }
//! # }
//! row! { Greeting: can(Print, Read), before(Print => Read), max_context(32) }
//! let _checked = greet().conform::<Greeting>();
//! ```
//!
//! A kind outside `can` is rejected:
//!
//! ```compile_fail
//! # use effex::{effectful, perform, row, Chain, Effect};
//! # #[derive(Effect)] struct Print(&'static str);
//! # #[derive(Effect)] #[effect(output = String)] struct Read;
//! # fn greet() -> impl Chain<Output = usize> {
//! #     effectful! {
//! #         perform!(Print("name?"));
//! #         let name = perform!(Read);
//! #         perform!(Print("thanks"));
//! #         name.len()
//! #     }
//! # }
//! row! { PrintOnly: can(Print) }
//! let _checked = greet().conform::<PrintOnly>();
//! ```
//!
//! So is a kind listed in `cannot`:
//!
//! ```compile_fail
//! # use effex::{effectful, perform, row, Chain, Effect};
//! # #[derive(Effect)] struct Print(&'static str);
//! # #[derive(Effect)] #[effect(output = String)] struct Read;
//! # fn greet() -> impl Chain<Output = usize> {
//! #     effectful! {
//! #         perform!(Print("name?"));
//! #         let name = perform!(Read);
//! #         perform!(Print("thanks"));
//! #         name.len()
//! #     }
//! # }
//! row! { Mute: cannot(Read) }
//! let _checked = greet().conform::<Mute>();
//! ```
//!
//! `before` wants every `Print` preceded by a `Read`, and the first one is not:
//!
//! ```compile_fail
//! # use effex::{effectful, perform, row, Chain, Effect};
//! # #[derive(Effect)] struct Print(&'static str);
//! # #[derive(Effect)] #[effect(output = String)] struct Read;
//! # fn greet() -> impl Chain<Output = usize> {
//! #     effectful! {
//! #         perform!(Print("name?"));
//! #         let name = perform!(Read);
//! #         perform!(Print("thanks"));
//! #         name.len()
//! #     }
//! # }
//! row! { ReadFirst: before(Read => Print) }
//! let _checked = greet().conform::<ReadFirst>();
//! ```
//!
//! `never_before` forbids any `Read` ahead of a `Print` on the same path:
//!
//! ```compile_fail
//! # use effex::{effectful, perform, row, Chain, Effect};
//! # #[derive(Effect)] struct Print(&'static str);
//! # #[derive(Effect)] #[effect(output = String)] struct Read;
//! # fn greet() -> impl Chain<Output = usize> {
//! #     effectful! {
//! #         perform!(Print("name?"));
//! #         let name = perform!(Read);
//! #         perform!(Print("thanks"));
//! #         name.len()
//! #     }
//! # }
//! row! { NoEcho: never_before(Read => Print) }
//! let _checked = greet().conform::<NoEcho>();
//! ```
//!
//! The second `Print` carries the name, which exceeds the limit:
//!
//! ```compile_fail
//! # use effex::{effectful, perform, row, Chain, Effect};
//! # #[derive(Effect)] struct Print(&'static str);
//! # #[derive(Effect)] #[effect(output = String)] struct Read;
//! # fn greet() -> impl Chain<Output = usize> {
//! #     effectful! {
//! #         perform!(Print("name?"));
//! #         let name = perform!(Read);
//! #         perform!(Print("thanks"));
//! #         name.len()
//! #     }
//! # }
//! row! { Tiny: max_context(8) }
//! let _checked = greet().conform::<Tiny>();
//! ```

use std::fmt;
use std::marker::PhantomData;

use crate::descriptor::Chain;
use crate::effect::Kind;

/// Longest path a row can describe.
pub const MAX_DEPTH: usize = 32;

/// Most paths (fork combinations) a row can describe.
pub const MAX_PATHS: usize = 16;

/// One effect boundary: its kind and context record size in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// The effect performed at this boundary.
    pub kind: Kind,
    /// `size_of` the context captured at this boundary.
    pub context: usize,
}

impl Step {
    /// Create a step.
    pub const fn new(kind: Kind, context: usize) -> Self {
        Self { kind, context }
    }

    const VACANT: Step = Step::new(Kind::VACANT, 0);
}

/// One way through a chain.
#[derive(Debug, Clone, Copy)]
pub struct Path {
    steps: [Step; MAX_DEPTH],
    len: usize,
}

impl Path {
    const EMPTY: Path = Path {
        steps: [Step::VACANT; MAX_DEPTH],
        len: 0,
    };

    /// The steps of this path, outermost first.
    pub fn steps(&self) -> &[Step] {
        &self.steps[..self.len]
    }
}

/// Static summary of all paths through a chain.
#[derive(Debug, Clone, Copy)]
pub struct Row {
    paths: [Path; MAX_PATHS],
    count: usize,
    truncated: bool,
}

impl Row {
    /// The row of a chain with no effects.
    pub const fn pure() -> Self {
        Self {
            paths: [Path::EMPTY; MAX_PATHS],
            count: 1,
            truncated: false,
        }
    }

    /// Put `step` in front of every path.
    pub const fn prepend(self, step: Step) -> Self {
        let mut row = self;
        let mut p = 0;
        while p < row.count {
            let mut path = row.paths[p];
            if path.len == MAX_DEPTH {
                row.truncated = true;
            } else {
                path.len += 1;
            }
            let mut i = path.len - 1;
            while i > 0 {
                path.steps[i] = path.steps[i - 1];
                i -= 1;
            }
            path.steps[0] = step;
            row.paths[p] = path;
            p += 1;
        }
        row
    }

    /// The row of a chain that continues as either `self` or `other`.
    pub const fn fork(self, other: Row) -> Self {
        let mut row = self;
        row.truncated = self.truncated || other.truncated;
        let mut p = 0;
        while p < other.count {
            if row.count == MAX_PATHS {
                row.truncated = true;
                return row;
            }
            row.paths[row.count] = other.paths[p];
            row.count += 1;
            p += 1;
        }
        row
    }

    /// Whether the chain was too large to describe completely.
    pub const fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Number of distinct paths.
    pub const fn path_count(&self) -> usize {
        self.count
    }

    /// Largest context record across all steps.
    pub const fn max_context(&self) -> usize {
        let mut max = 0;
        let mut p = 0;
        while p < self.count {
            let path = &self.paths[p];
            let mut i = 0;
            while i < path.len {
                if path.steps[i].context > max {
                    max = path.steps[i].context;
                }
                i += 1;
            }
            p += 1;
        }
        max
    }

    /// Whether any path performs `kind`.
    pub const fn contains(&self, kind: &Kind) -> bool {
        let mut p = 0;
        while p < self.count {
            let path = &self.paths[p];
            let mut i = 0;
            while i < path.len {
                if path.steps[i].kind.same(kind) {
                    return true;
                }
                i += 1;
            }
            p += 1;
        }
        false
    }

    /// The recorded paths.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.paths[..self.count].iter()
    }
}

/// A set of row requirements.
#[derive(Debug, Clone, Copy)]
pub struct Constraint {
    /// Allowed kinds; `None` allows any kind not in `cannot`.
    pub can: Option<&'static [Kind]>,
    /// Forbidden kinds.
    pub cannot: &'static [Kind],
    /// `(a, b)`: every `b` must be preceded by an `a` on its path.
    pub before: &'static [(Kind, Kind)],
    /// `(a, b)`: no `a` may occur before a `b` on any path.
    pub never_before: &'static [(Kind, Kind)],
    /// Upper bound on any single context record, in bytes.
    pub max_context: Option<usize>,
}

impl Constraint {
    /// A constraint every untruncated row satisfies.
    pub const UNCONSTRAINED: Constraint = Constraint {
        can: None,
        cannot: &[],
        before: &[],
        never_before: &[],
        max_context: None,
    };

    /// Restrict the chain to `kinds`.
    pub const fn can(mut self, kinds: &'static [Kind]) -> Self {
        self.can = Some(kinds);
        self
    }

    /// Forbid `kinds`.
    pub const fn cannot(mut self, kinds: &'static [Kind]) -> Self {
        self.cannot = kinds;
        self
    }

    /// Require ordering pairs.
    pub const fn before(mut self, pairs: &'static [(Kind, Kind)]) -> Self {
        self.before = pairs;
        self
    }

    /// Forbid ordering pairs.
    pub const fn never_before(mut self, pairs: &'static [(Kind, Kind)]) -> Self {
        self.never_before = pairs;
        self
    }

    /// Bound the largest context record.
    pub const fn max_context(mut self, bytes: usize) -> Self {
        self.max_context = Some(bytes);
        self
    }
}

/// Why a row failed a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The chain is too large for a fixed-capacity row.
    Truncated,
    /// A kind outside `can` is performed.
    NotAllowed { kind: Kind },
    /// A kind in `cannot` is performed.
    Forbidden { kind: Kind },
    /// `then` is reachable without passing `first`.
    MissingPredecessor { first: Kind, then: Kind },
    /// `then` is reachable after `first`.
    ForbiddenSequence { first: Kind, then: Kind },
    /// A context record exceeds the bound.
    ContextTooLarge { kind: Kind, size: usize, limit: usize },
}

impl Violation {
    /// Static description used for compile-time rejections.
    pub const fn message(&self) -> &'static str {
        match self {
            Violation::Truncated => {
                "effect row violation: chain exceeds the analyzable row capacity"
            }
            Violation::NotAllowed { .. } => {
                "effect row violation: chain performs an effect outside the allowed set"
            }
            Violation::Forbidden { .. } => {
                "effect row violation: chain performs a forbidden effect"
            }
            Violation::MissingPredecessor { .. } => {
                "effect row violation: an effect is reachable before its required predecessor"
            }
            Violation::ForbiddenSequence { .. } => {
                "effect row violation: chain contains a forbidden effect sequence"
            }
            Violation::ContextTooLarge { .. } => {
                "effect row violation: a captured context exceeds the size bound"
            }
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Truncated => f.write_str(self.message()),
            Violation::NotAllowed { kind } => write!(f, "effect `{kind}` is not allowed"),
            Violation::Forbidden { kind } => write!(f, "effect `{kind}` is forbidden"),
            Violation::MissingPredecessor { first, then } => {
                write!(f, "`{then}` is reachable without a preceding `{first}`")
            }
            Violation::ForbiddenSequence { first, then } => {
                write!(f, "`{then}` is reachable after `{first}`")
            }
            Violation::ContextTooLarge { kind, size, limit } => write!(
                f,
                "context captured at `{kind}` is {size} bytes (limit {limit})"
            ),
        }
    }
}

impl std::error::Error for Violation {}

/// Check `row` against `constraint`.
pub const fn check(constraint: &Constraint, row: &Row) -> Result<(), Violation> {
    if row.truncated {
        return Err(Violation::Truncated);
    }
    let mut p = 0;
    while p < row.count {
        if let Err(violation) = check_path(constraint, &row.paths[p]) {
            return Err(violation);
        }
        p += 1;
    }
    Ok(())
}

const fn check_path(constraint: &Constraint, path: &Path) -> Result<(), Violation> {
    let mut i = 0;
    while i < path.len {
        let step = path.steps[i];
        let kind = step.kind;

        if let Some(allowed) = constraint.can {
            if !kind.is_in(allowed) {
                return Err(Violation::NotAllowed { kind });
            }
        }
        if kind.is_in(constraint.cannot) {
            return Err(Violation::Forbidden { kind });
        }
        if let Some(limit) = constraint.max_context {
            if step.context > limit {
                return Err(Violation::ContextTooLarge {
                    kind,
                    size: step.context,
                    limit,
                });
            }
        }

        let mut r = 0;
        while r < constraint.before.len() {
            let (first, then) = constraint.before[r];
            if kind.same(&then) && !seen_before(path, i, &first) {
                return Err(Violation::MissingPredecessor { first, then });
            }
            r += 1;
        }
        let mut r = 0;
        while r < constraint.never_before.len() {
            let (first, then) = constraint.never_before[r];
            if kind.same(&then) && seen_before(path, i, &first) {
                return Err(Violation::ForbiddenSequence { first, then });
            }
            r += 1;
        }
        i += 1;
    }
    Ok(())
}

const fn seen_before(path: &Path, end: usize, kind: &Kind) -> bool {
    let mut j = 0;
    while j < end {
        if path.steps[j].kind.same(kind) {
            return true;
        }
        j += 1;
    }
    false
}

/// A named row constraint, usually declared with `row!`.
pub trait RowSpec {
    /// [`AnyOutput`] or [`Returns<T>`].
    type Returns;

    /// The membership, ordering and size requirements.
    const SPEC: Constraint;
}

/// Output rule of a [`RowSpec`].
#[diagnostic::on_unimplemented(
    message = "effect chain returns `{T}`, which the row constraint does not accept",
    label = "`returns(..)` mismatch"
)]
pub trait Accepts<T> {}

/// Accept any final result type.
pub struct AnyOutput;

impl<T> Accepts<T> for AnyOutput {}

/// Require the final result type `T`.
pub struct Returns<T>(PhantomData<fn() -> T>);

impl<T> Accepts<T> for Returns<T> {}

/// Proof that a chain satisfies the row constraint `S`.
pub trait Conforms<S: RowSpec>: Chain {
    /// Evaluating this constant performs the check.
    const PROOF: ();
}

impl<C, S> Conforms<S> for C
where
    C: Chain,
    S: RowSpec,
    S::Returns: Accepts<C::Output>,
{
    const PROOF: () = match check(&S::SPEC, &C::ROW) {
        Ok(()) => (),
        Err(violation) => panic!("{}", violation.message()),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const PRINT: Kind = Kind::new("Print", "t::Print");
    const READ: Kind = Kind::new("Read", "t::Read");
    const FAIL: Kind = Kind::new("Fail", "t::Fail");
    const KINDS: [Kind; 3] = [PRINT, READ, FAIL];

    fn row_of(steps: &[(Kind, usize)]) -> Row {
        steps
            .iter()
            .rev()
            .fold(Row::pure(), |row, &(kind, size)| row.prepend(Step::new(kind, size)))
    }

    #[test]
    fn test_prepend_keeps_order() {
        let row = row_of(&[(PRINT, 0), (READ, 8), (PRINT, 24)]);
        let path = row.paths().next().unwrap();
        let names: Vec<_> = path.steps().iter().map(|s| s.kind.name()).collect();
        assert_eq!(names, vec!["Print", "Read", "Print"]);
        assert_eq!(row.max_context(), 24);
        assert!(row.contains(&READ));
        assert!(!row.contains(&FAIL));
    }

    #[test]
    fn test_fork_collects_paths() {
        let row = row_of(&[(PRINT, 0)]).prepend(Step::new(READ, 0));
        let forked = row.fork(Row::pure()).prepend(Step::new(FAIL, 4));
        assert_eq!(forked.path_count(), 2);
        let lens: Vec<_> = forked.paths().map(|p| p.steps().len()).collect();
        assert_eq!(lens, vec![3, 1]);
    }

    #[test]
    fn test_membership() {
        let row = row_of(&[(PRINT, 0), (READ, 0)]);
        const PR: &[Kind] = &[PRINT, READ];
        const P: &[Kind] = &[PRINT];
        const R: &[Kind] = &[READ];
        assert_eq!(check(&Constraint::UNCONSTRAINED.can(PR), &row), Ok(()));
        assert_eq!(
            check(&Constraint::UNCONSTRAINED.can(P), &row),
            Err(Violation::NotAllowed { kind: READ })
        );
        assert_eq!(
            check(&Constraint::UNCONSTRAINED.cannot(R), &row),
            Err(Violation::Forbidden { kind: READ })
        );
        assert_eq!(check(&Constraint::UNCONSTRAINED.cannot(&[FAIL]), &row), Ok(()));
    }

    #[test]
    fn test_required_predecessor() {
        const READ_THEN_PRINT: &[(Kind, Kind)] = &[(READ, PRINT)];
        let spec = Constraint::UNCONSTRAINED.before(READ_THEN_PRINT);
        assert_eq!(check(&spec, &row_of(&[(READ, 0), (FAIL, 0), (PRINT, 0)])), Ok(()));
        assert_eq!(check(&spec, &row_of(&[(FAIL, 0)])), Ok(()));
        assert_eq!(
            check(&spec, &row_of(&[(PRINT, 0), (READ, 0), (PRINT, 0)])),
            Err(Violation::MissingPredecessor { first: READ, then: PRINT })
        );
    }

    #[test]
    fn test_forbidden_sequence_is_by_reachability() {
        const FAIL_THEN_PRINT: &[(Kind, Kind)] = &[(FAIL, PRINT)];
        let spec = Constraint::UNCONSTRAINED.never_before(FAIL_THEN_PRINT);
        assert_eq!(check(&spec, &row_of(&[(PRINT, 0), (FAIL, 0)])), Ok(()));
        assert_eq!(
            check(&spec, &row_of(&[(FAIL, 0), (READ, 0), (PRINT, 0)])),
            Err(Violation::ForbiddenSequence { first: FAIL, then: PRINT })
        );
    }

    #[test]
    fn test_ordering_is_checked_per_path() {
        const READ_THEN_PRINT: &[(Kind, Kind)] = &[(READ, PRINT)];
        let spec = Constraint::UNCONSTRAINED.before(READ_THEN_PRINT);
        let good = row_of(&[(PRINT, 0)]).prepend(Step::new(READ, 0));
        let bad = row_of(&[(PRINT, 0)]);
        assert_eq!(check(&spec, &good.fork(Row::pure())), Ok(()));
        assert!(check(&spec, &good.fork(bad)).is_err());
    }

    #[test]
    fn test_context_bound() {
        let row = row_of(&[(PRINT, 8), (READ, 32)]);
        assert_eq!(check(&Constraint::UNCONSTRAINED.max_context(32), &row), Ok(()));
        assert_eq!(
            check(&Constraint::UNCONSTRAINED.max_context(16), &row),
            Err(Violation::ContextTooLarge { kind: READ, size: 32, limit: 16 })
        );
    }

    #[test]
    fn test_overflow_truncates_and_rejects() {
        let mut row = Row::pure();
        for _ in 0..=MAX_DEPTH {
            row = row.prepend(Step::new(PRINT, 0));
        }
        assert!(row.is_truncated());
        assert_eq!(check(&Constraint::UNCONSTRAINED, &row), Err(Violation::Truncated));

        let mut wide = Row::pure();
        for _ in 0..MAX_PATHS {
            wide = wide.fork(Row::pure());
        }
        assert!(wide.is_truncated());
    }

    #[test]
    fn test_violation_display() {
        let v = Violation::ContextTooLarge { kind: READ, size: 40, limit: 8 };
        assert_eq!(v.to_string(), "context captured at `Read` is 40 bytes (limit 8)");
        assert!(v.message().starts_with("effect row violation"));
    }

    fn arb_path() -> impl Strategy<Value = Vec<(usize, usize)>> {
        prop::collection::vec((0..KINDS.len(), 0usize..64), 0..12)
    }

    proptest! {
        #[test]
        fn prop_checker_agrees_with_reference(
            path in arb_path(),
            allowed in prop::collection::vec(any::<bool>(), 3),
            limit in 0usize..64,
            first in 0..3usize,
            then in 0..3usize,
        ) {
            let steps: Vec<(Kind, usize)> = path.iter().map(|&(k, s)| (KINDS[k], s)).collect();
            let row = row_of(&steps);

            let allowed_kinds: Vec<Kind> =
                KINDS.iter().zip(&allowed).filter(|(_, a)| **a).map(|(k, _)| *k).collect();
            let allowed_kinds: &'static [Kind] = Box::leak(allowed_kinds.into_boxed_slice());
            let pair: &'static [(Kind, Kind)] = Box::leak(Box::new([(KINDS[first], KINDS[then])]));

            let membership = steps.iter().all(|(k, _)| k.is_in(allowed_kinds));
            prop_assert_eq!(
                check(&Constraint::UNCONSTRAINED.can(allowed_kinds), &row).is_ok(),
                membership
            );

            let size = steps.iter().all(|&(_, s)| s <= limit);
            prop_assert_eq!(
                check(&Constraint::UNCONSTRAINED.max_context(limit), &row).is_ok(),
                size
            );

            let ordered = steps.iter().enumerate().all(|(i, (k, _))| {
                !k.same(&KINDS[then]) || steps[..i].iter().any(|(p, _)| p.same(&KINDS[first]))
            });
            prop_assert_eq!(check(&Constraint::UNCONSTRAINED.before(pair), &row).is_ok(), ordered);

            let clean = steps.iter().enumerate().all(|(i, (k, _))| {
                !k.same(&KINDS[then]) || !steps[..i].iter().any(|(p, _)| p.same(&KINDS[first]))
            });
            prop_assert_eq!(
                check(&Constraint::UNCONSTRAINED.never_before(pair), &row).is_ok(),
                clean
            );
        }
    }
}
