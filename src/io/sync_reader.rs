//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over operation records from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding
//! `Result<OperationRecord, String>` for each CSV row:
//!
//! ```no_run
//! use point_ledger::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("operations.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(record) => println!("Applying operation: {:?}", record),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual record parsing errors are yielded as Err variants in the iterator
//! - Line numbers are included in error messages for debugging

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::OperationRecord;
use csv::{DeserializeRecordsIntoIter, ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Synchronous CSV reader
///
/// Reads one row at a time; memory use does not grow with file size.
pub struct SyncReader {
    records: DeserializeRecordsIntoIter<File, CsvRecord>,
    line_num: usize,
}

impl SyncReader {
    /// Open `path` for streaming iteration
    ///
    /// The CSV reader trims whitespace from all fields and allows flexible
    /// field counts (a trailing amount may be missing).
    ///
    /// # Returns
    ///
    /// * `Ok(SyncReader)` if file opened successfully
    /// * `Err(String)` if file could not be opened
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            records: reader.into_deserialize(),
            line_num: 1,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<OperationRecord, String>;

    /// Get the next operation record
    ///
    /// # Returns
    ///
    /// * `Some(Ok(OperationRecord))` - Successfully parsed record
    /// * `Some(Err(String))` - Parse or conversion error with line number
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        let next = self.records.next()?;
        // Line 1 is the header
        self.line_num += 1;

        match next {
            Ok(csv_record) => Some(
                convert_csv_record(csv_record).map_err(|e| format!("Line {}: {}", self.line_num, e)),
            ),
            Err(e) => Some(Err(format!(
                "Line {}: CSV parse error: {}",
                self.line_num, e
            ))),
        }
    }
}
