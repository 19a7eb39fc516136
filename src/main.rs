//! Point Ledger CLI
//!
//! Replays point charge/use operations from a CSV file through the ledger and
//! prints the resulting balances (or history) to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > balances.csv
//! cargo run -- --strategy sequential operations.csv > balances.csv
//! cargo run -- --report history operations.csv > history.csv
//! cargo run -- --batch-size 2000 --max-concurrent 8 --lock-timeout-ms 500 operations.csv
//! RUST_LOG=point_ledger=debug cargo run -- operations.csv
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use point_ledger::cli;
use point_ledger::strategy::{self, ReplayOptions};
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = cli::parse_args();

    // RUST_LOG wins over --log-level; logs go to stderr so stdout stays a clean report
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Concurrent) {
            Some(args.to_batch_config())
        } else {
            None
        };
        let options = ReplayOptions {
            ledger: args.to_ledger_config(),
            report: args.report,
        };
        strategy::create_strategy(args.strategy.clone(), config, options)
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
