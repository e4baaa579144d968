//! Context minimality and chain fidelity of `effectful!` blocks.
//!
//! Contexts are inspected directly through `Perform::context`, and chain
//! shapes through the printable signature.

use std::mem::size_of_val;

use effex::{effectful, perform, Chain, Done, Effect};
use pretty_assertions::assert_eq;

#[derive(Effect, Debug, Clone, PartialEq)]
#[effect(output = u64)]
struct Fetch(u8);

#[derive(Effect, Debug, Clone, PartialEq)]
#[effect(output = String)]
struct Ask;

#[derive(Effect, Debug, Clone, PartialEq)]
struct Note(&'static str);

fn signature_of<C: Chain>(_: &C) -> String {
    C::signature().to_string()
}

#[test]
fn test_context_holds_only_live_bindings() {
    let chain = effectful! {
        let a = 1u64;
        let unused = [0u8; 64];
        let c = 2u64;
        let x = perform!(Fetch(unused[0]));
        a + c + x
    };
    assert_eq!(chain.context(), &(1, 2));
    assert_eq!(size_of_val(chain.context()), 16);
    assert_eq!(chain.continue_with(5), Done(8));
}

#[test]
fn test_unused_local_does_not_change_context_size() {
    let lean = effectful! {
        let a = 3u32;
        let x = perform!(Fetch(0));
        u64::from(a) + x
    };
    let padded = effectful! {
        let a = 3u32;
        let _padding = [7u64; 32];
        let _label = String::from("not needed later");
        let x = perform!(Fetch(0));
        u64::from(a) + x
    };
    assert_eq!(size_of_val(lean.context()), size_of_val(padded.context()));
    assert_eq!(lean.context(), padded.context());
}

#[test]
fn test_each_boundary_is_computed_independently() {
    let chain = effectful! {
        let a = 10u64;
        let b = 20u64;
        let x = perform!(Fetch(1));
        let z = a * 2;
        let y = perform!(Fetch(2));
        b + x + y + z
    };
    // first boundary needs a and b
    assert_eq!(chain.context(), &(10, 20));
    let next = chain.continue_with(100);
    // a is dead after `z` is computed; b and x are still needed
    assert_eq!(next.context(), &(20, 100, 20));
    assert_eq!(next.continue_with(1000), Done(1140));
}

#[test]
fn test_nothing_live_gives_zero_sized_context() {
    let chain = effectful! {
        let label = "discarded";
        perform!(Note(label));
        let answer = perform!(Ask);
        answer.len()
    };
    assert_eq!(size_of_val(chain.context()), 0);
    assert_eq!(chain.payload(), &Note("discarded"));
}

#[test]
fn test_shadowed_binding_is_not_carried() {
    let chain = effectful! {
        let line = String::from("old");
        let line = perform!(Ask);
        line
    };
    assert_eq!(size_of_val(chain.context()), 0);
    assert_eq!(chain.continue_with("new".to_string()), Done("new".to_string()));
}

#[test]
fn test_mut_bindings_stay_mutable() {
    let chain = effectful! {
        let mut total = 1u64;
        let x = perform!(Fetch(0));
        total += x;
        total *= 2;
        total
    };
    assert_eq!(chain.context(), &(1,));
    assert_eq!(chain.continue_with(4), Done(10));
}

#[test]
fn test_signature_follows_textual_order() {
    let chain = effectful! {
        perform!(Note("init"));
        let w = perform!(Ask);
        perform!(Note("echo"));
        let n = perform!(Fetch(w.len() as u8));
        n
    };
    assert_eq!(signature_of(&chain), "Note(Ask(Note(Fetch(u64))))");
}

#[test]
fn test_branch_signature_and_capture() {
    fn program(flag: bool) -> impl Chain<Output = u64> {
        effectful! {
            let base = 10u64;
            let spare = 99u64;
            let extra = if flag {
                let v = perform!(Fetch(1));
                v + spare
            } else {
                0
            };
            base + extra
        }
    }
    assert_eq!(signature_of(&program(true)), "[Fetch(u64) | u64]");
}

#[test]
fn test_branch_arms_capture_their_own_needs() {
    let left = |flag: bool| {
        effectful! {
            let base = 10u64;
            let spare = 99u64;
            if flag {
                let v = perform!(Fetch(1));
                base + v
            } else {
                spare
            }
        }
    };
    match left(true) {
        effex::Fork::Left(chain) => {
            assert_eq!(chain.context(), &(10,));
            assert_eq!(chain.continue_with(1), Done(11));
        }
        effex::Fork::Right(_) => panic!("flag selects the left arm"),
    }
    assert!(matches!(left(false), effex::Fork::Right(Done(99))));
}

#[test]
fn test_match_arms_become_nested_forks() {
    fn program(n: u8) -> impl Chain<Output = String> {
        effectful! {
            let prefix = String::from("got ");
            let tail = match n {
                0 => perform!(Ask),
                1 => {
                    perform!(Note("one"));
                    String::from("one")
                }
                _ => String::from("many"),
            };
            prefix + &tail
        }
    }
    assert_eq!(
        signature_of(&program(0)),
        "[Ask(String) | [Note(String) | String]]"
    );
}

#[test]
fn test_macro_arguments_count_as_reads() {
    let chain = effectful! {
        let who = String::from("world");
        let count = 3u8;
        let x = perform!(Fetch(0));
        format!("hello {who} x{}", x + u64::from(count))
    };
    assert_eq!(chain.context(), &(String::from("world"), 3));
}

#[test]
fn test_boundary_before_branch_captures_every_arm() {
    let program = |flag: bool| {
        effectful! {
            let flag = flag;
            let a = 1u64;
            let b = 2u64;
            perform!(Note("before"));
            if flag {
                let x = perform!(Fetch(0));
                a + x
            } else {
                b
            }
        }
    };
    let chain = program(true);
    assert_eq!(chain.context(), &(true, 1, 2));
    match chain.continue_with(()) {
        effex::Fork::Left(next) => {
            assert_eq!(next.context(), &(1,));
            assert_eq!(next.continue_with(40), Done(41));
        }
        effex::Fork::Right(_) => panic!("flag selects the left arm"),
    }
    assert!(matches!(
        program(false).continue_with(()),
        effex::Fork::Right(Done(2))
    ));
}

#[test]
fn test_let_in_if_arm_does_not_leak() {
    let program = |flag: bool| {
        effectful! {
            let a = 1u64;
            if flag {
                let a = 5u64;
                perform!(Note("inner"));
                assert_eq!(a, 5);
            }
            a
        }
    };
    match program(true) {
        effex::Fork::Left(chain) => {
            assert_eq!(chain.context(), &(5, 1));
            assert_eq!(chain.continue_with(()), Done(1));
        }
        effex::Fork::Right(_) => panic!("flag selects the left arm"),
    }
    assert!(matches!(program(false), effex::Fork::Right(Done(1))));
}

#[test]
fn test_if_let_pattern_does_not_leak() {
    let program = |slot: Option<u64>| {
        effectful! {
            let a = 1u64;
            if let Some(a) = slot {
                perform!(Note("some"));
                assert_eq!(a, 9);
            }
            a
        }
    };
    match program(Some(9)) {
        effex::Fork::Left(chain) => assert_eq!(chain.continue_with(()), Done(1)),
        effex::Fork::Right(_) => panic!("`Some` selects the left arm"),
    }
    assert!(matches!(program(None), effex::Fork::Right(Done(1))));
}

#[test]
fn test_match_arm_bindings_do_not_leak() {
    let program = |n: Option<u64>| {
        effectful! {
            let a = 1u64;
            let b = 10u64;
            match n {
                Some(a) => {
                    let b = a * 2;
                    perform!(Fetch(0));
                    assert_eq!((a, b), (7, 14));
                }
                None => {}
            }
            a + b
        }
    };
    match program(Some(7)) {
        effex::Fork::Left(chain) => assert_eq!(chain.continue_with(0), Done(11)),
        effex::Fork::Right(_) => panic!("`Some` selects the first arm"),
    }
    assert!(matches!(program(None), effex::Fork::Right(Done(11))));
}

#[test]
fn test_arm_value_reads_arm_binding_before_restore() {
    let program = |flag: bool| {
        effectful! {
            let a = String::from("outer");
            let picked = if flag {
                let a = String::from("inner");
                perform!(Note("pick"));
                a
            } else {
                String::from("none")
            };
            format!("{a}/{picked}")
        }
    };
    match program(true) {
        effex::Fork::Left(chain) => {
            assert_eq!(chain.continue_with(()), Done("outer/inner".to_string()))
        }
        effex::Fork::Right(_) => panic!("flag selects the left arm"),
    }
    assert!(matches!(
        program(false),
        effex::Fork::Right(Done(text)) if text == "outer/none"
    ));
}
