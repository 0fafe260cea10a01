//! platcheck - gem platform round-trip property harness
//!
//! Feeds adversarial generated platform strings through parse → format →
//! parse and reports the first stable counterexample, if any.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use platcheck::cli::Cli;
use platcheck::runner::{HarnessOptions, RoundTripRunner, RunReport};
use platcheck::Result;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            if cli.robot {
                // Robot mode: JSON error output to stdout
                let error_json = serde_json::json!({
                    "error": true,
                    "message": e.to_string(),
                });
                println!("{}", serde_json::to_string(&error_json).unwrap_or_default());
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<bool> {
    let options = HarnessOptions {
        seed: cli.seed,
        ..HarnessOptions::default()
    };
    let report = RoundTripRunner::new(options).run()?;

    if cli.robot {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !cli.quiet {
        print_report(&report);
    }

    Ok(report.success())
}

fn print_report(report: &RunReport) {
    match &report.failure {
        None => {
            println!(
                "ok: {} trials, {} discarded, {} ms",
                report.trials_run, report.discarded, report.duration_ms
            );
        }
        Some(failure) => {
            eprintln!("FAILED after {} passing trials", report.trials_run);
            eprintln!("  candidate: {:?}", failure.candidate);
            eprintln!("  detail:    {}", failure.detail);
            eprintln!(
                "  shrunk:    {:?} ({} probes)",
                failure.shrunk, failure.shrink_iters
            );
            eprintln!("  shrunk detail: {}", failure.shrunk_detail);
        }
    }
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,platcheck=info",
        1 => "info,platcheck=debug",
        2 => "debug,platcheck=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.robot {
        // JSON logging for robot mode
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        // Human-readable logging
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
