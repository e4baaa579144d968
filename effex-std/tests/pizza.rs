//! The pizza program end to end under each scripted bundle.

use std::io;

use effex::{effectful, perform, Bundle, Chain, Control, Handle, Outcome, Suspended};
use effex_std::{pizza, script, Failure, Lenient, Log, Print, Read, Scenario, Scripted};
use pretty_assertions::assert_eq;

#[test]
fn test_failed_step_suspends_then_resumes_to_19() {
    script::reset();
    script::feed(["cheese"]);

    let stop = match pizza().handle::<Scripted>() {
        Outcome::Complete(n) => panic!("completed with {n} despite the failed pick"),
        Outcome::Suspended(stop) => stop,
    };
    assert_eq!(script::take_output(), vec!["init", "cheese"]);
    assert_eq!(stop.kind().name(), "Attempt");
    assert!(matches!(stop.fault(), Failure::Attempt(reason) if reason == "out of toppings"));

    let out = stop.resume("pineapple on".to_string());
    assert_eq!(out.complete(), Some(19));
    assert_eq!(script::take_output(), vec!["pineapple on pizza"]);
}

#[test]
fn test_suspension_resumes_with_different_toppings() {
    script::reset();
    script::feed(["cheese"]);
    let stop = pizza().handle::<Scripted>().suspended().expect("pick fails");
    script::take_output();

    assert_eq!(stop.resume("ham and".to_string()).complete(), Some(19));
    assert_eq!(stop.resume("pineapple on".to_string()).complete(), Some(19));
    assert_eq!(
        script::take_output(),
        vec!["ham and pizza", "pineapple on pizza"]
    );
}

#[test]
fn test_empty_script_suspends_at_read() {
    script::reset();
    let stop = pizza().handle::<Scripted>().suspended().expect("no input");
    assert_eq!(stop.kind().name(), "Read");
    assert!(matches!(stop.fault(), Failure::EndOfInput));

    // the resumed run stops again at the failed pick
    let again = stop
        .resume("typed late".to_string())
        .suspended()
        .expect("pick fails");
    assert_eq!(again.kind().name(), "Attempt");
    assert_eq!(script::take_output(), vec!["init", "typed late"]);
}

#[test]
fn test_lenient_continues_with_default() {
    script::reset();
    script::feed(["cheese"]);
    assert_eq!(pizza().handle::<Lenient>().complete(), Some(19));
    assert_eq!(script::take_output(), vec!["init", "cheese", " pizza"]);
}

#[test]
fn test_scenario_replies_drive_the_run() {
    script::reset();
    let out = Scenario::pizza().play::<Scripted, _>(pizza());
    assert_eq!(out.complete(), Some(19));
    assert_eq!(
        script::take_output(),
        vec!["init", "cheese", "pineapple on pizza"]
    );
    assert_eq!(script::pending(), 0);
}

#[test]
fn test_scenario_without_replies_returns_suspension() {
    script::reset();
    let scenario = Scenario::from_toml("input = [\"cheese\"]").unwrap();
    let stop = scenario
        .play::<Scripted, _>(pizza())
        .suspended()
        .expect("no reply for the failed pick");
    assert_eq!(stop.kind().name(), "Attempt");
}

#[test]
fn test_log_uses_the_catch_all_rule() {
    script::reset();
    script::feed(["margherita"]);
    let chain = effectful! {
        perform!(Log::info("taking order"));
        let order = perform!(Read);
        perform!(Log::debug(format!("ordered {order}")));
        perform!(Print(order.clone()));
        order.len()
    };
    assert_eq!(chain.handle::<Scripted>().complete(), Some(10));
    assert_eq!(script::take_output(), vec!["margherita"]);
}

/// Every read fails the way a closed terminal does.
struct Unplugged;

impl Bundle for Unplugged {
    type Fault = Failure;
    type Input = String;
}

impl Handle<Read> for Unplugged {
    fn handle(_: Read) -> Control<String, Failure, String> {
        Control::suspend(Failure::Io(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "terminal closed",
        )))
    }
}

#[test]
fn test_scenario_does_not_answer_io_failures() {
    script::reset();
    let scenario = Scenario::from_toml("resume = [\"never used\"]").unwrap();
    let chain = effectful! {
        let line = perform!(Read);
        line.len()
    };
    let stop = scenario
        .play::<Unplugged, _>(chain)
        .suspended()
        .expect("an I/O failure is not answered with a reply");
    assert_eq!(stop.kind().name(), "Read");
    assert!(matches!(stop.fault(), Failure::Io(_)));
    assert!(!stop.fault().wants_input());
}

#[test]
fn test_scenario_answers_end_of_input() {
    script::reset();
    let scenario = Scenario::from_toml("resume = [\"late\"]").unwrap();
    let chain = effectful! {
        let line = perform!(Read);
        line.len()
    };
    assert_eq!(scenario.play::<Scripted, _>(chain).complete(), Some(4));
}
