//! Effex Demo Binary
//!
//! Run with: `effex-demo [--bundle console|scripted|lenient] [--scenario FILE]`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use effex::{Chain, Outcome, Suspended};
use tracing::info;
use tracing_subscriber::EnvFilter;

use effex_std::{pizza, script, Console, Failure, Lenient, Scenario, Scripted};

#[derive(Parser)]
#[command(name = "effex-demo")]
#[command(about = "Run the pizza program against a handler bundle")]
#[command(version)]
struct Cli {
    /// Handler bundle to resolve the program with
    #[arg(short, long, value_enum, default_value_t = Choice::Scripted)]
    bundle: Choice,

    /// Scenario file with `input` and `resume` lists (default: built-in)
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Choice {
    Console,
    Scripted,
    Lenient,
}

fn signature_of<C: Chain>(_: &C) -> String {
    C::signature().to_string()
}

/// Print the transcript, then the result or the suspension that ended the run.
fn report<S: Suspended<Fault = Failure>>(outcome: Outcome<S::Output, S>) -> Result<S::Output> {
    for line in script::take_output() {
        println!("{line}");
    }
    match outcome {
        Outcome::Complete(value) => Ok(value),
        Outcome::Suspended(stop) if stop.fault().wants_input() => {
            bail!("suspended at {} with no reply left: {}", stop.kind(), stop.fault())
        }
        Outcome::Suspended(stop) => bail!("{} failed: {}", stop.kind(), stop.fault()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let scenario = match &cli.scenario {
        Some(path) => Scenario::load(path)
            .with_context(|| format!("failed to load scenario {}", path.display()))?,
        None => Scenario::pizza(),
    };

    let program = pizza();
    info!(signature = %signature_of(&program), "running");

    let result = match cli.bundle {
        Choice::Console => report(scenario.play::<Console, _>(program))?,
        Choice::Scripted => report(scenario.play::<Scripted, _>(program))?,
        Choice::Lenient => report(scenario.play::<Lenient, _>(program))?,
    };
    println!("result: {result}");

    Ok(())
}
