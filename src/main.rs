mod diag;
mod fsm;
mod input;
mod threshold;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::diag::TracingSink;
use crate::fsm::mod3::mod3_machine_with_diagnostics;
use crate::threshold::{DEFAULT_TARGET_RECALL, ThresholdFinder};

#[derive(Debug, Parser)]
#[command(
    name = "cutpoint",
    version,
    about = "Deterministic CLI for recall-constrained threshold selection and table-driven sequence classification"
)]
struct Cli {
    /// Diagnostic verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Pick the threshold with the best F1 score among those meeting the recall floor
    Threshold {
        /// JSON file with per-threshold TP/FP/TN/FN counts
        #[arg(long)]
        data: PathBuf,

        /// Minimum recall the chosen threshold must reach
        #[arg(long, default_value_t = DEFAULT_TARGET_RECALL, value_parser = parse_target_recall)]
        target_recall: f64,
    },
    /// Reduce a binary string modulo 3 with the remainder automaton
    Mod3 {
        /// Binary digits, most significant bit first
        input: String,
    },
}

fn parse_target_recall(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("not a number: {raw}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("target recall must be within [0, 1], got {value}"))
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(err) = run(cli.command) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Threshold {
            data,
            target_recall,
        } => {
            let mut finder =
                ThresholdFinder::with_diagnostics(target_recall, Box::new(TracingSink));
            let best = finder.process(&data)?;
            println!("{best}");
        }
        Command::Mod3 { input } => {
            let mut machine = mod3_machine_with_diagnostics(Box::new(TracingSink));
            let remainder = machine.process(input.chars())?;
            println!("{remainder}");
        }
    }
    Ok(())
}
