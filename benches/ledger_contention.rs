//! Benchmark suite for ledger contention and replay strategies
//!
//! Compares many mutations piled onto a single user against the same
//! mutations spread across many users, and the two replay strategies over a
//! generated operations file.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```

use point_ledger::cli::StrategyType;
use point_ledger::strategy::{create_strategy, BatchConfig, ReplayOptions};
use point_ledger::{InMemoryLedger, LedgerConfig, UserId};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn main() {
    divan::main();
}

const MUTATIONS: usize = 2_000;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_time()
        .build()
        .expect("Failed to build runtime")
}

/// Spawn `MUTATIONS` charges spread round-robin over `users` users
async fn charge_spread(ledger: Arc<InMemoryLedger>, users: u64) {
    let mut handles = Vec::with_capacity(MUTATIONS);
    for i in 0..MUTATIONS as u64 {
        let ledger = Arc::clone(&ledger);
        let user: UserId = i % users;
        handles.push(tokio::spawn(async move { ledger.charge(user, 1).await }));
    }
    for handle in handles {
        handle
            .await
            .expect("Task panicked")
            .expect("Charge failed");
    }
}

/// All mutations on one key versus spread over many keys
#[divan::bench(args = [1, 16, 256])]
fn concurrent_charges(bencher: divan::Bencher, users: u64) {
    let runtime = runtime();
    bencher
        .with_inputs(|| Arc::new(InMemoryLedger::in_memory(LedgerConfig::default())))
        .bench_local_values(|ledger| runtime.block_on(charge_spread(ledger, users)));
}

/// Generate an operations file with `rows` rows over 64 users
fn operations_file(rows: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "type,user,amount").expect("Failed to write header");
    for i in 0..rows {
        let user = i % 64;
        if i % 4 == 3 {
            writeln!(file, "use,{},{}", user, 30 + i % 50).expect("Failed to write row");
        } else {
            writeln!(file, "charge,{},{}", user, 100 + i % 100).expect("Failed to write row");
        }
    }
    file.flush().expect("Failed to flush temp file");
    file
}

#[divan::bench(args = [1_000, 100_000])]
fn sequential_replay(bencher: divan::Bencher, rows: usize) {
    let file = operations_file(rows);
    let strategy = create_strategy(StrategyType::Sequential, None, ReplayOptions::default());

    bencher.bench_local(|| {
        let mut output = Vec::new();
        strategy
            .process(file.path(), &mut output)
            .expect("Processing failed");
    });
}

#[divan::bench(args = [1_000, 100_000])]
fn concurrent_replay(bencher: divan::Bencher, rows: usize) {
    let file = operations_file(rows);
    let strategy = create_strategy(
        StrategyType::Concurrent,
        Some(BatchConfig::default()),
        ReplayOptions::default(),
    );

    bencher.bench_local(|| {
        let mut output = Vec::new();
        strategy
            .process(file.path(), &mut output)
            .expect("Processing failed");
    });
}
