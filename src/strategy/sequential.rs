//! Sequential processing strategy
//!
//! Applies operations one at a time, in file order, on a single-threaded
//! runtime. The output is the reference the concurrent strategy must match.

use crate::core::Ledger;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{log_rejection, write_report, ProcessingStrategy, ReplayOptions};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Sequential processing strategy
///
/// # Examples
///
/// ```no_run
/// use point_ledger::strategy::{ProcessingStrategy, ReplayOptions, SequentialProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SequentialProcessingStrategy::new(ReplayOptions::default());
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("operations.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone)]
pub struct SequentialProcessingStrategy {
    options: ReplayOptions,
}

impl SequentialProcessingStrategy {
    pub fn new(options: ReplayOptions) -> Self {
        Self { options }
    }
}

impl ProcessingStrategy for SequentialProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let reader = SyncReader::new(input_path)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let ledger = Ledger::in_memory(self.options.ledger.clone());
            let mut users = BTreeSet::new();
            let mut applied = 0usize;
            let mut rejected = 0usize;

            for result in reader {
                match result {
                    Ok(record) => {
                        users.insert(record.user);
                        match ledger.apply(record.user, record.kind, record.amount).await {
                            Ok(_) => applied += 1,
                            Err(e) => {
                                rejected += 1;
                                log_rejection(&record, &e);
                            }
                        }
                    }
                    Err(e) => warn!(error = %e, "skipping invalid operation record"),
                }
            }

            info!(applied, rejected, users = users.len(), "sequential replay finished");

            write_report(&ledger, &users, self.options.report, output).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ReportKind;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn run(content: &str, report: ReportKind) -> String {
        let file = create_temp_csv(content);
        let strategy = SequentialProcessingStrategy::new(ReplayOptions {
            report,
            ..ReplayOptions::default()
        });
        let mut output = Vec::new();

        strategy.process(file.path(), &mut output).unwrap();

        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_sequential_strategy_applies_in_order() {
        let output = run(
            "type,user,amount\ncharge,1,100\nuse,1,100\nuse,1,1\ncharge,2,5\n",
            ReportKind::Balances,
        );

        assert_eq!(output, "user,amount\n1,0\n2,5\n");
    }

    #[test]
    fn test_sequential_strategy_history_report() {
        let output = run(
            "type,user,amount\ncharge,1,100\nuse,1,500\nuse,1,40\n",
            ReportKind::History,
        );

        assert_eq!(output, "user,seq,type,amount\n1,1,charge,100\n1,2,use,40\n");
    }

    #[test]
    fn test_sequential_strategy_reports_users_with_only_rejections() {
        let output = run("type,user,amount\nuse,9,10\n", ReportKind::Balances);

        assert_eq!(output, "user,amount\n9,0\n");
    }

    #[test]
    fn test_sequential_strategy_handles_missing_file() {
        let strategy = SequentialProcessingStrategy::new(ReplayOptions::default());
        let mut output = Vec::new();

        let result = strategy.process(Path::new("nonexistent.csv"), &mut output);

        assert!(result.unwrap_err().contains("Failed to open file"));
    }

    #[test]
    fn test_sequential_strategy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SequentialProcessingStrategy>();
    }
}
