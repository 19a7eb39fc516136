//! Batch processing with user-based partitioning
//!
//! `BatchProcessor` splits a batch of operations by user and spawns one tokio
//! task per user. Each task applies its user's operations in input order, so
//! per-user ordering is preserved while different users run in parallel
//! against the shared ledger.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     └── Arc<Ledger>  (shared, per-user serialized)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tracing::error;

use super::ledger::Ledger;
use super::traits::{BalanceStore, HistoryStore};
use crate::types::{Balance, LedgerError, OperationRecord, UserId};

/// Result of applying a single operation
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The operation that was applied
    pub record: OperationRecord,

    /// The resulting balance, or why the operation was rejected
    pub result: Result<Balance, LedgerError>,
}

/// Batch processor with user-based partitioning
#[derive(Debug)]
pub struct BatchProcessor<B, H> {
    ledger: Arc<Ledger<B, H>>,
}

impl<B, H> Clone for BatchProcessor<B, H> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<B, H> BatchProcessor<B, H>
where
    B: BalanceStore + 'static,
    H: HistoryStore + 'static,
{
    /// Create a new BatchProcessor over a shared ledger
    pub fn new(ledger: Arc<Ledger<B, H>>) -> Self {
        Self { ledger }
    }

    /// Partition a batch of operations by user ID
    ///
    /// # Guarantees
    ///
    /// - Each operation appears in exactly one sub-batch
    /// - Operations for each user keep their original order
    pub fn partition_by_user(
        &self,
        batch: Vec<OperationRecord>,
    ) -> HashMap<UserId, Vec<OperationRecord>> {
        let mut user_batches: HashMap<UserId, Vec<OperationRecord>> = HashMap::new();

        for record in batch {
            user_batches.entry(record.user).or_default().push(record);
        }

        user_batches
    }

    /// Apply all operations for a single user sequentially
    ///
    /// Failures are captured in the results and do not stop the sequence.
    pub async fn process_user_operations(
        &self,
        operations: Vec<OperationRecord>,
    ) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(operations.len());

        for record in operations {
            let result = self
                .ledger
                .apply(record.user, record.kind, record.amount)
                .await;
            results.push(ProcessingResult { record, result });
        }

        results
    }

    /// Apply a batch, one task per user
    ///
    /// Results for one user are in input order; results across users are in
    /// no particular order.
    pub async fn process_batch(&self, batch: Vec<OperationRecord>) -> Vec<ProcessingResult> {
        let user_batches = self.partition_by_user(batch);

        let mut tasks = Vec::with_capacity(user_batches.len());
        for (_user, operations) in user_batches {
            let processor = self.clone();
            tasks.push(tokio::spawn(async move {
                processor.process_user_operations(operations).await
            }));
        }

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(user_results) => results.extend(user_results),
                Err(e) => error!(error = %e, "user task panicked"),
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::balance_store::InMemoryBalanceStore;
    use crate::core::history_store::InMemoryHistoryStore;
    use crate::core::ledger::{InMemoryLedger, LedgerConfig};
    use crate::types::{ErrorKind, TransactionKind};

    fn op(kind: TransactionKind, user: UserId, amount: i64) -> OperationRecord {
        OperationRecord { kind, user, amount }
    }

    fn processor() -> (
        Arc<InMemoryLedger>,
        BatchProcessor<InMemoryBalanceStore, InMemoryHistoryStore>,
    ) {
        let ledger = Arc::new(Ledger::in_memory(LedgerConfig::default()));
        let processor = BatchProcessor::new(Arc::clone(&ledger));
        (ledger, processor)
    }

    #[test]
    fn test_partition_keeps_per_user_order() {
        let (_ledger, processor) = processor();
        let batch = vec![
            op(TransactionKind::Charge, 1, 100),
            op(TransactionKind::Charge, 2, 200),
            op(TransactionKind::Use, 1, 30),
            op(TransactionKind::Use, 2, 50),
            op(TransactionKind::Charge, 1, 5),
        ];

        let partitions = processor.partition_by_user(batch);

        assert_eq!(partitions.len(), 2);
        let user1: Vec<i64> = partitions[&1].iter().map(|r| r.amount).collect();
        let user2: Vec<i64> = partitions[&2].iter().map(|r| r.amount).collect();
        assert_eq!(user1, vec![100, 30, 5]);
        assert_eq!(user2, vec![200, 50]);
    }

    #[test]
    fn test_partition_empty_batch() {
        let (_ledger, processor) = processor();
        assert!(processor.partition_by_user(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_process_user_operations_continues_after_failure() {
        let (ledger, processor) = processor();
        let operations = vec![
            op(TransactionKind::Charge, 1, 100),
            op(TransactionKind::Use, 1, 500),
            op(TransactionKind::Use, 1, 40),
        ];

        let results = processor.process_user_operations(operations).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].result.as_ref().unwrap().amount, 100);
        assert_eq!(
            results[1].result.as_ref().unwrap_err().kind(),
            ErrorKind::InsufficientBalance
        );
        assert_eq!(results[2].result.as_ref().unwrap().amount, 60);
        assert_eq!(ledger.get_history(1).await.unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_process_batch_many_users() {
        let (ledger, processor) = processor();
        let mut batch = Vec::new();
        for round in 0..10 {
            for user in 0u64..8 {
                batch.push(op(TransactionKind::Charge, user, 10 + round));
            }
        }

        let results = processor.process_batch(batch).await;

        assert_eq!(results.len(), 80);
        assert!(results.iter().all(|r| r.result.is_ok()));
        // 10 + 11 + ... + 19
        for user in 0u64..8 {
            assert_eq!(ledger.get_balance(user).await.unwrap().amount, 145);
            assert_eq!(ledger.get_history(user).await.unwrap().len(), 10);
        }
    }

    #[test]
    fn test_processor_is_cloneable() {
        let (ledger, processor) = processor();

        let _clone = processor.clone();

        // Original + processor + clone
        assert_eq!(Arc::strong_count(&ledger), 3);
    }
}
