//! Operation records replayed against the ledger

use super::balance::{Points, UserId};
use super::history::TransactionKind;

/// Input operation record from CSV
///
/// One requested charge or use. The amount is passed through untouched so the
/// ledger, not the parser, decides whether it is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRecord {
    /// Whether to charge or use points
    pub kind: TransactionKind,

    /// The user whose balance is targeted
    pub user: UserId,

    /// Requested amount
    pub amount: Points,
}
