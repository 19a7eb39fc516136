//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `balance`: Balance snapshots and the charge/use rules
//! - `history`: History entries and transaction kinds
//! - `operation`: Operation records replayed from input
//! - `error`: Error types for the ledger

pub mod balance;
pub mod error;
pub mod history;
pub mod operation;

pub use balance::{now_millis, Balance, Points, UserId, MAX_AMOUNT};
pub use error::{ErrorKind, LedgerError, StoreError};
pub use history::{replay, HistoryEntry, HistoryId, TransactionKind};
pub use operation::OperationRecord;
