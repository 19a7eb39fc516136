//! Core business logic module
//!
//! This module contains the mutation engine and its collaborators:
//! - `traits` - Storage collaborator traits
//! - `lock_registry` - Per-key FIFO lock registry
//! - `ledger` - Per-user serialized charge/use orchestration
//! - `balance_store` - In-memory balance store
//! - `history_store` - In-memory append-only history store
//! - `batch_processor` - User-partitioned parallel batch application

pub mod balance_store;
pub mod batch_processor;
pub mod history_store;
pub mod ledger;
pub mod lock_registry;
pub mod traits;

pub use balance_store::InMemoryBalanceStore;
pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use history_store::InMemoryHistoryStore;
pub use ledger::{InMemoryLedger, Ledger, LedgerConfig};
pub use lock_registry::KeyLockRegistry;
pub use traits::{BalanceStore, HistoryStore};
