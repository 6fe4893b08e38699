//! `ssi-sim` — runs an instruction script against a simulated replicated
//! database and prints commit/abort outcomes and dump snapshots (§4.5, §6).

mod format;
mod parse;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ssi_sim::{Cluster, Instruction};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Run a replicated-database instruction script under Serializable
/// Snapshot Isolation.
#[derive(Debug, Parser)]
#[command(name = "ssi-sim", version, about)]
struct Cli {
    /// Path to the instruction script to run.
    script: PathBuf,

    /// Raise log verbosity; repeat for more (-v, -vv, ...).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all but warnings and errors.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let contents = match fs::read_to_string(&cli.script) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to read {}: {e}", cli.script.display());
            return ExitCode::FAILURE;
        }
    };

    let mut cluster = Cluster::new();
    let mut clock: u64 = 0;

    for raw_line in contents.lines() {
        match parse::parse_line(raw_line) {
            Ok(None) => {}
            Ok(Some(instruction)) => {
                clock += 1;
                dispatch(&mut cluster, instruction, clock);
            }
            Err(e) => {
                clock += 1;
                warn!(line = raw_line, error = %e, "skipping unrecognized instruction");
            }
        }
    }

    ExitCode::SUCCESS
}

fn dispatch(cluster: &mut Cluster, instruction: Instruction, t: u64) {
    match instruction {
        Instruction::Begin(txn) => cluster.begin(txn, t),
        Instruction::Read(txn, var) => match cluster.read(txn, var, t) {
            Ok(ssi_sim::ReadOutcome::Value(value)) => {
                info!(%txn, %var, value, "read served");
            }
            Ok(ssi_sim::ReadOutcome::Waiting) => {
                info!(%txn, %var, "transaction waiting on site recovery");
            }
            Ok(ssi_sim::ReadOutcome::Aborted(outcome)) => {
                report_outcome(txn, &outcome);
            }
            Err(e) => warn!(%txn, %var, error = %e, "read failed"),
        },
        Instruction::Write(txn, var, value) => match cluster.write(txn, var, value, t) {
            Ok(ssi_sim::WriteOutcome::Staged) => {
                info!(%txn, %var, value, "write staged");
            }
            Ok(ssi_sim::WriteOutcome::Aborted(outcome)) => {
                report_outcome(txn, &outcome);
            }
            Err(e) => warn!(%txn, %var, error = %e, "write failed"),
        },
        Instruction::End(txn) => match cluster.end(txn, t) {
            Ok(outcome) => report_outcome(txn, &outcome),
            Err(e) => warn!(%txn, error = %e, "end failed"),
        },
        Instruction::Fail(site) => {
            if let Err(e) = cluster.fail(site, t) {
                warn!(%site, error = %e, "fail failed");
            } else {
                info!(%site, t, "site failed");
            }
        }
        Instruction::Recover(site) => {
            if let Err(e) = cluster.recover(site, t) {
                warn!(%site, error = %e, "recover failed");
            } else {
                info!(%site, t, "site recovered");
            }
        }
        Instruction::Dump => {
            let dump = cluster.dump();
            println!("{}", format::format_dump(&dump));
        }
    }
}

fn report_outcome(txn: ssi_sim::TxnId, outcome: &ssi_sim::Outcome) {
    info!(%txn, %outcome, "transaction ended");
    println!("{}", format::format_outcome(txn, outcome));
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_directive = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
