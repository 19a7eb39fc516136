//! Concurrent batch processing strategy
//!
//! Processes operations on a multi-threaded tokio runtime against one shared
//! ledger.
//!
//! # Architecture
//!
//! ```text
//! ConcurrentProcessingStrategy
//!     ├── BatchConfig (batch_size, worker_threads)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── BatchProcessor (user partitioning + one task per user)
//!     └── Ledger (per-user locks over the in-memory stores)
//! ```
//!
//! Batches are read and processed one after another, so a user's operations
//! keep their file order even when they span batches. Inside a batch, users
//! run in parallel.

use crate::core::{BatchProcessor, Ledger};
use crate::io::async_reader::AsyncReader;
use crate::strategy::{log_rejection, write_report, ProcessingStrategy, ReplayOptions};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Configuration for batch processing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of operations per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub worker_threads: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            worker_threads: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig, replacing zero values with defaults
    pub fn new(batch_size: usize, worker_threads: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let worker_threads = if worker_threads == 0 {
            warn!(
                worker_threads,
                default = default.worker_threads,
                "invalid worker_threads, using default"
            );
            default.worker_threads
        } else {
            worker_threads
        };

        Self {
            batch_size,
            worker_threads,
        }
    }
}

/// Concurrent batch processing strategy
#[derive(Debug, Clone)]
pub struct ConcurrentProcessingStrategy {
    config: BatchConfig,
    options: ReplayOptions,
}

impl ConcurrentProcessingStrategy {
    pub fn new(config: BatchConfig, options: ReplayOptions) -> Self {
        Self { config, options }
    }
}

impl ProcessingStrategy for ConcurrentProcessingStrategy {
    /// Replay operations concurrently and write the report
    ///
    /// 1. Creates a multi-threaded runtime with the configured worker count
    /// 2. Builds one shared in-memory ledger and a BatchProcessor over it
    /// 3. Reads batches with AsyncReader, waiting for each batch to finish
    ///    before reading the next
    /// 4. Reads every seen user back through the ledger for the report
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.worker_threads)
            .enable_time()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let ledger = Arc::new(Ledger::in_memory(self.options.ledger.clone()));
            let processor = BatchProcessor::new(Arc::clone(&ledger));

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            // csv-async reads from futures::io, tokio files need the compat layer
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let mut users = BTreeSet::new();
            let mut applied = 0usize;
            let mut rejected = 0usize;

            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                users.extend(batch.iter().map(|record| record.user));

                for outcome in processor.process_batch(batch).await {
                    match &outcome.result {
                        Ok(_) => applied += 1,
                        Err(e) => {
                            rejected += 1;
                            log_rejection(&outcome.record, e);
                        }
                    }
                }
            }

            info!(applied, rejected, users = users.len(), "concurrent replay finished");

            write_report(&ledger, &users, self.options.report, output).await
        })
    }
}
