//! Row constraints over chains produced by `effectful!`.
//!
//! Accepting cases go through `Chain::conform`, which is checked while
//! building this test. Rejecting cases call the same `check` at run time to
//! inspect the reported `Violation`; each rejection is also a build failure,
//! covered by the `compile_fail` doctests on the `row` module.

use effex::row::check;
use effex::{effectful, perform, row, Chain, Effect, RowSpec, Violation};
use pretty_assertions::assert_eq;

#[derive(Effect)]
struct Print(&'static str);

#[derive(Effect)]
#[effect(output = String)]
struct Read;

#[derive(Effect)]
#[effect(output = T)]
struct Attempt<T>(Result<T, String>);

fn verdict<S: RowSpec, C: Chain>(_: &C) -> Result<(), Violation> {
    check(&S::SPEC, &C::ROW)
}

fn console() -> impl Chain<Output = usize> {
    effectful! {
        perform!(Print("name?"));
        let name = perform!(Read);
        perform!(Print("thanks"));
        name.len()
    }
}

fn risky() -> impl Chain<Output = u8> {
    effectful! {
        let n = perform!(Attempt(Ok::<u8, String>(4)));
        perform!(Print("done"));
        n
    }
}

row! {
    /// Console programs only.
    ConsoleOnly: can(Print, Read)
}

row! { NoFailures: cannot(Attempt<u8>) }

row! { AskFirst: sequence_can(Read => Print) }

row! { QuietAfterFailure: never_before(Attempt<u8> => Print) }

row! { Tiny: max_context(8) }

row! { Counted: returns(usize), can(Print, Read), max_context_size(32) }

#[test]
fn test_membership_accepts_and_rejects() {
    let _ = console().conform::<ConsoleOnly>();
    assert_eq!(verdict::<ConsoleOnly, _>(&console()), Ok(()));
    assert_eq!(
        verdict::<ConsoleOnly, _>(&risky()),
        Err(Violation::NotAllowed {
            kind: <Attempt<u8> as Effect>::KIND
        })
    );
}

#[test]
fn test_exclusion_accepts_and_rejects() {
    let _ = console().conform::<NoFailures>();
    assert_eq!(verdict::<NoFailures, _>(&console()), Ok(()));
    assert!(matches!(
        verdict::<NoFailures, _>(&risky()),
        Err(Violation::Forbidden { .. })
    ));
}

#[test]
fn test_generic_effects_share_one_kind() {
    assert!(<Attempt<u8> as Effect>::KIND.same(&<Attempt<String> as Effect>::KIND));
    assert_eq!(<Attempt<u8> as Effect>::KIND.name(), "Attempt");
}

#[test]
fn test_required_order_accepts_and_rejects() {
    let asks_first = || {
        effectful! {
            let name = perform!(Read);
            perform!(Print("hi"));
            name
        }
    };
    let _ = asks_first().conform::<AskFirst>();
    assert_eq!(verdict::<AskFirst, _>(&asks_first()), Ok(()));
    assert!(matches!(
        verdict::<AskFirst, _>(&console()),
        Err(Violation::MissingPredecessor { .. })
    ));
}

#[test]
fn test_forbidden_order_accepts_and_rejects() {
    let prints_first = || {
        effectful! {
            perform!(Print("starting"));
            let n = perform!(Attempt(Ok::<u8, String>(1)));
            n
        }
    };
    let _ = prints_first().conform::<QuietAfterFailure>();
    assert_eq!(verdict::<QuietAfterFailure, _>(&prints_first()), Ok(()));
    assert!(matches!(
        verdict::<QuietAfterFailure, _>(&risky()),
        Err(Violation::ForbiddenSequence { .. })
    ));
}

#[test]
fn test_forbidden_order_is_not_adjacency() {
    let gap = || {
        effectful! {
            let n = perform!(Attempt(Ok::<u8, String>(1)));
            let _line = perform!(Read);
            perform!(Print("late"));
            n
        }
    };
    assert!(verdict::<QuietAfterFailure, _>(&gap()).is_err());
}

#[test]
fn test_size_bound_accepts_and_rejects() {
    let small = || {
        effectful! {
            let a = 1u64;
            let x = perform!(Read);
            x.len() as u64 + a
        }
    };
    let large = || {
        effectful! {
            let a = 1u64;
            let b = 2u64;
            let x = perform!(Read);
            x.len() as u64 + a + b
        }
    };
    let _ = small().conform::<Tiny>();
    assert_eq!(verdict::<Tiny, _>(&small()), Ok(()));
    assert_eq!(
        verdict::<Tiny, _>(&large()),
        Err(Violation::ContextTooLarge {
            kind: <Read as Effect>::KIND,
            size: 16,
            limit: 8
        })
    );
}

#[test]
fn test_branches_are_checked_per_path() {
    fn program(ask: bool) -> impl Chain<Output = String> {
        effectful! {
            if ask {
                let name = perform!(Read);
                perform!(Print("hi"));
                name
            } else {
                perform!(Print("no name"));
                String::new()
            }
        }
    }
    // the else arm prints without reading first
    assert!(matches!(
        verdict::<AskFirst, _>(&program(true)),
        Err(Violation::MissingPredecessor { .. })
    ));
    let _ = program(true).conform::<ConsoleOnly>();
}

#[test]
fn test_returns_and_combined_options() {
    let chain = console().conform::<Counted>();
    assert_eq!(Counted::SPEC.max_context, Some(32));
    assert!(Counted::SPEC.can.is_some());
    let _ = chain;
}
