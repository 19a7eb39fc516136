//! Processing strategy module for operation replay
//!
//! A strategy is a complete pipeline: read operation records from CSV, apply
//! them through a `Ledger`, and write a report. Strategies can be selected at
//! runtime.

use crate::cli::{ReportKind, StrategyType};
use crate::core::{BalanceStore, HistoryStore, Ledger, LedgerConfig};
use crate::io::csv_format::{write_balances_csv, write_history_csv};
use crate::types::{LedgerError, OperationRecord, UserId};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

pub mod concurrent;
pub mod sequential;

pub use concurrent::{BatchConfig, ConcurrentProcessingStrategy};
pub use sequential::SequentialProcessingStrategy;

/// Processing strategy trait for complete replay pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Replay operations from `input_path` and write the report to `output`
    ///
    /// # Returns
    ///
    /// * `Ok(())` if processing completed (individual rejected operations are
    ///   logged, not returned)
    /// * `Err(String)` if a fatal error occurred (file not found, runtime
    ///   creation, store failure while reporting, output write failure)
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Options shared by every strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOptions {
    /// Configuration of the ledger the strategy builds
    pub ledger: LedgerConfig,

    /// Which report to write
    pub report: ReportKind,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            report: ReportKind::Balances,
        }
    }
}

/// Create a processing strategy based on the specified strategy type
///
/// `config` only applies to the concurrent strategy; defaults are used when it is `None`.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
    options: ReplayOptions,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sequential => Box::new(SequentialProcessingStrategy::new(options)),
        StrategyType::Concurrent => {
            let config = config.unwrap_or_default();
            Box::new(ConcurrentProcessingStrategy::new(config, options))
        }
    }
}

/// Log a rejected operation
///
/// Validation failures are expected input errors; anything else is an anomaly.
pub(crate) fn log_rejection(record: &OperationRecord, error: &LedgerError) {
    if error.is_validation() {
        info!(user = record.user, kind = %record.kind, amount = record.amount, error = %error, "operation rejected");
    } else {
        warn!(user = record.user, kind = %record.kind, amount = record.amount, error = %error, "operation failed");
    }
}

/// Read back every user in `users` through the ledger and write the report
pub(crate) async fn write_report<B, H>(
    ledger: &Ledger<B, H>,
    users: &BTreeSet<UserId>,
    report: ReportKind,
    output: &mut dyn Write,
) -> Result<(), String>
where
    B: BalanceStore,
    H: HistoryStore,
{
    match report {
        ReportKind::Balances => {
            let mut balances = Vec::with_capacity(users.len());
            for &user in users {
                let balance = ledger
                    .get_balance(user)
                    .await
                    .map_err(|e| format!("Failed to read balance of user {}: {}", user, e))?;
                balances.push(balance);
            }
            write_balances_csv(&balances, output)
        }
        ReportKind::History => {
            let mut histories = Vec::with_capacity(users.len());
            for &user in users {
                let entries = ledger
                    .get_history(user)
                    .await
                    .map_err(|e| format!("Failed to read history of user {}: {}", user, e))?;
                histories.push((user, entries));
            }
            write_history_csv(&histories, output)
        }
    }
}
