//! History-related types for the point ledger
//!
//! Every successful charge or use produces exactly one immutable HistoryEntry.

use super::balance::{Points, UserId};
use std::fmt;

/// History entry identifier, assigned by the history store
pub type HistoryId = u64;

/// Kind of balance mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    /// Credit points to a balance
    Charge,

    /// Debit points from a balance
    Use,
}

impl TransactionKind {
    /// Signed delta this kind applies for a positive `amount`
    pub fn signed(self, amount: Points) -> Points {
        match self {
            TransactionKind::Charge => amount,
            TransactionKind::Use => -amount,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Charge => f.write_str("charge"),
            TransactionKind::Use => f.write_str("use"),
        }
    }
}

/// Immutable record of one successful mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Store-assigned, monotonically increasing id
    pub id: HistoryId,

    /// The user whose balance was mutated
    pub user: UserId,

    /// Positive magnitude of the applied delta (never signed)
    pub amount: Points,

    /// Whether the delta was a charge or a use
    pub kind: TransactionKind,

    /// Time of the mutation in epoch milliseconds
    pub timestamp: i64,
}

impl HistoryEntry {
    /// Signed delta this entry contributed to the balance
    pub fn delta(&self) -> Points {
        self.kind.signed(self.amount)
    }
}

/// Replay a user's history from zero
///
/// The result must equal the user's current balance; this is the central
/// invariant the ledger maintains.
pub fn replay(entries: &[HistoryEntry]) -> Points {
    entries.iter().map(HistoryEntry::delta).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: HistoryId, amount: Points, kind: TransactionKind) -> HistoryEntry {
        HistoryEntry {
            id,
            user: 1,
            amount,
            kind,
            timestamp: 0,
        }
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(TransactionKind::Charge.to_string(), "charge");
        assert_eq!(TransactionKind::Use.to_string(), "use");
    }

    #[test]
    fn test_replay_sums_signed_deltas() {
        let entries = vec![
            entry(1, 1000, TransactionKind::Charge),
            entry(2, 1, TransactionKind::Charge),
            entry(3, 1001, TransactionKind::Use),
        ];
        assert_eq!(replay(&entries), 0);
        assert_eq!(replay(&entries[..2]), 1001);
    }

    #[test]
    fn test_replay_of_empty_history_is_zero() {
        assert_eq!(replay(&[]), 0);
    }
}
