//! Asynchronous CSV reader with batch interface
//!
//! Reads operation records with csv-async and hands them out in batches so the
//! concurrent strategy can fan each batch out across users.
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of OperationRecords
//!                  ↓
//!           csv_format module
//!           (CsvRecord, convert_csv_record)
//! ```

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::OperationRecord;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

/// Asynchronous CSV reader
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader over any async byte source
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader }
    }

    /// Read up to `batch_size` operation records
    ///
    /// Malformed rows are logged and skipped. Returns an empty vector once the
    /// input is exhausted.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<OperationRecord> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CsvRecord>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(csv_record)) => match convert_csv_record(csv_record) {
                    Ok(record) => batch.push(record),
                    Err(e) => warn!(error = %e, "skipping invalid operation record"),
                },
                Some(Err(e)) => warn!(error = %e, "skipping unparseable CSV row"),
                None => break,
            }
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionKind;
    use futures::io::Cursor;

    #[tokio::test]
    async fn test_async_reader_read_batch() {
        let csv_content = "type,user,amount\ncharge,1,100\nuse,1,50\ncharge,2,200\n";
        let mut reader = AsyncReader::new(Cursor::new(csv_content.as_bytes()));

        let batch = reader.read_batch(2).await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].user, 1);
        assert_eq!(batch[0].kind, TransactionKind::Charge);
        assert_eq!(batch[1].kind, TransactionKind::Use);
        assert_eq!(batch[1].amount, 50);

        let batch = reader.read_batch(2).await;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].user, 2);

        assert!(reader.read_batch(2).await.is_empty());
    }

    #[tokio::test]
    async fn test_async_reader_empty_csv() {
        let mut reader = AsyncReader::new(Cursor::new("type,user,amount\n".as_bytes()));

        assert!(reader.read_batch(10).await.is_empty());
    }

    #[tokio::test]
    async fn test_async_reader_skips_invalid_records() {
        let csv_content = "type,user,amount\n\
            refund,1,100\n\
            charge,x,10\n\
            charge,1,\n\
            charge,1,50\n";
        let mut reader = AsyncReader::new(Cursor::new(csv_content.as_bytes()));

        let batch = reader.read_batch(10).await;

        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].amount, 50);
    }

    #[tokio::test]
    async fn test_async_reader_whitespace_and_case() {
        let csv_content = "type,user,amount\n  CHARGE  ,  7  ,  100  \n";
        let mut reader = AsyncReader::new(Cursor::new(csv_content.as_bytes()));

        let batch = reader.read_batch(10).await;

        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].user, 7);
        assert_eq!(batch[0].amount, 100);
    }
}
