//! Point Ledger Library
//! # Overview
//!
//! This library maintains a per-user point balance with two mutations, charge
//! and use, plus an append-only history of every successful mutation.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Balance, HistoryEntry, errors)
//! - [`core`] - Business logic components:
//!   - [`core::ledger`] - Per-user serialized charge/use orchestration
//!   - [`core::lock_registry`] - Lazily created per-key FIFO locks
//!   - [`core::traits`] - Balance and history store collaborators
//!   - [`core::batch_processor`] - User-partitioned parallel application
//! - [`io`] - CSV input and report output
//! - [`strategy`] - Sequential and concurrent replay pipelines
//! - [`cli`] - CLI arguments parsing
//!
//! # Guarantees
//!
//! - Mutations for the same user are linearizable and served in request order
//! - Mutations for different users never wait on each other
//! - A balance always lies in `0..=MAX_AMOUNT`
//! - A user's balance always equals the signed sum of their history
//! - A rejected mutation writes nothing

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use crate::core::{
    BalanceStore, HistoryStore, InMemoryBalanceStore, InMemoryHistoryStore, InMemoryLedger, Ledger,
    LedgerConfig,
};
pub use crate::types::{
    Balance, ErrorKind, HistoryEntry, HistoryId, LedgerError, Points, StoreError, TransactionKind,
    UserId, MAX_AMOUNT,
};
