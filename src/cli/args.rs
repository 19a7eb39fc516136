use crate::core::LedgerConfig;
use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Replay point charge/use operations through the ledger
#[derive(Parser, Debug)]
#[command(name = "point-ledger")]
#[command(about = "Replay point charge/use operations through the ledger", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing operation records
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Processing strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "concurrent",
        help = "Processing strategy: 'sequential' for file order on one thread or 'concurrent' for per-user parallelism"
    )]
    pub strategy: StrategyType,

    /// Report written to stdout
    #[arg(
        long = "report",
        value_name = "REPORT",
        default_value = "balances",
        help = "Report to print: 'balances' or 'history'"
    )]
    pub report: ReportKind,

    /// Number of operations per batch (concurrent mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of operations per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Maximum number of worker threads (concurrent mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of worker threads (default: CPU cores)"
    )]
    pub worker_threads: Option<usize>,

    /// Upper bound on waiting for a user's lock
    #[arg(
        long = "lock-timeout-ms",
        value_name = "MILLIS",
        help = "Fail an operation that waits longer than this for its user's lock (default: wait indefinitely)"
    )]
    pub lock_timeout_ms: Option<u64>,

    /// Log filter directive
    #[arg(
        long = "log-level",
        value_name = "FILTER",
        default_value = "warn",
        help = "Log filter, e.g. 'info' or 'point_ledger=debug' (RUST_LOG takes precedence)"
    )]
    pub log_level: String,
}

/// Available processing strategies
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sequential,
    Concurrent,
}

/// Available reports
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    Balances,
    History,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values fall back to defaults; zero values are replaced by
    /// defaults with a warning (see `BatchConfig::new`).
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.worker_threads.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.worker_threads
                    .unwrap_or(default.worker_threads),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Create a LedgerConfig from CLI arguments
    pub fn to_ledger_config(&self) -> LedgerConfig {
        match self.lock_timeout_ms {
            Some(millis) => LedgerConfig::default().with_lock_timeout(Duration::from_millis(millis)),
            None => LedgerConfig::default(),
        }
    }
}
