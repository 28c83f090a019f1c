//! Zone Sandbox
//!
//! Replays a scripted overlap scenario through zone trackers and trigger
//! rules, then prints every activation and the final zone occupancy.
//!
//! Run with: cargo run -p zone_sandbox -- crates/zone_sandbox/scenarios/vault.toml
//!
//! # Configuration Sources (in priority order)
//!
//! 1. First positional argument: scenario path
//! 2. Environment variable: `ZONE_SANDBOX_SCENARIO=path/to/scenario.toml`
//! 3. `--json` flag or `ZONE_SANDBOX_JSON=1` prints the report as JSON
//!
//! Logging follows `RUST_LOG` (default `info`); use `RUST_LOG=debug` to see
//! every logical zone event.

mod error;
mod replay;
mod scenario;

use crate::error::Result;
use crate::replay::{Replay, Report};
use crate::scenario::Scenario;
use std::path::PathBuf;

/// Command line / environment options
#[derive(Debug, Default)]
struct Options {
    scenario: Option<PathBuf>,
    json: bool,
}

impl Options {
    fn load() -> Self {
        let mut options = Self::default();

        for arg in std::env::args().skip(1) {
            if arg == "--json" {
                options.json = true;
            } else if !arg.starts_with("--") && options.scenario.is_none() {
                options.scenario = Some(PathBuf::from(arg));
            }
        }

        if options.scenario.is_none() {
            if let Ok(path) = std::env::var("ZONE_SANDBOX_SCENARIO") {
                if !path.is_empty() {
                    options.scenario = Some(PathBuf::from(path));
                }
            }
        }

        if std::env::var("ZONE_SANDBOX_JSON").map(|v| v == "1" || v == "true").unwrap_or(false) {
            options.json = true;
        }

        options
    }
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = Options::load();
    let Some(path) = options.scenario.clone() else {
        log::error!(
            "No scenario given. Usage: zone-sandbox [--json] <scenario.toml|scenario.json>"
        );
        std::process::exit(2);
    };

    match run(&path) {
        Ok(report) => {
            if options.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        log::error!("Failed to serialize report: {}", e);
                        std::process::exit(1);
                    }
                }
            } else {
                print_report(&report);
            }
        }
        Err(e) => {
            log::error!("Replay of {} failed: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn run(path: &std::path::Path) -> Result<Report> {
    log::info!("Loading scenario {}", path.display());
    let scenario = Scenario::load(path)?;
    Replay::new(&scenario)?.run(&scenario)
}

fn print_report(report: &Report) {
    println!(
        "Replayed {} step(s), {} logical zone event(s)",
        report.steps, report.logical_events
    );

    for rule in &report.rules {
        println!();
        println!(
            "Rule '{}': {} activation(s), {} inside, {} invariant violation(s)",
            rule.name,
            rule.activations.len(),
            rule.occupancy_count,
            rule.invariant_violations
        );
        for (i, activation) in rule.activations.iter().enumerate() {
            let [x, y, z] = activation.point;
            println!(
                "  #{:<3} at ({:.2}, {:.2}, {:.2}) entities [{}]",
                i + 1,
                x,
                y,
                z,
                activation.entities.join(", ")
            );
        }
    }

    println!();
    for zone in &report.zones {
        println!("Zone '{}': [{}]", zone.name, zone.occupants.join(", "));
    }
}
