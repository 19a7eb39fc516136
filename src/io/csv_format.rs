//! CSV format handling for operation records and report output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to domain types
//! - Balance and history report serialization
//!
//! All functions are pure (no I/O beyond the given writer) for easy testing.

use crate::types::{Balance, HistoryEntry, OperationRecord, Points, TransactionKind, UserId};
use serde::Deserialize;
use std::io::Write;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns: type, user, amount
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub op_type: String,
    pub user: UserId,
    pub amount: Option<String>,
}

/// Convert a CsvRecord to an OperationRecord
///
/// The operation type is matched case-insensitively. The amount must be
/// present and parse as an integer; its sign is not checked here so that the
/// ledger reports non-positive amounts as `InvalidAmount`.
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<OperationRecord, String> {
    let kind = match csv_record.op_type.to_lowercase().as_str() {
        "charge" => TransactionKind::Charge,
        "use" => TransactionKind::Use,
        _ => {
            return Err(format!(
                "Invalid operation type: '{}' for user {}",
                csv_record.op_type, csv_record.user
            ))
        }
    };

    let amount = match csv_record.amount {
        Some(amount_str) if !amount_str.trim().is_empty() => {
            amount_str.trim().parse::<Points>().map_err(|_| {
                format!(
                    "Invalid amount '{}' for {} on user {}",
                    amount_str, kind, csv_record.user
                )
            })?
        }
        _ => {
            return Err(format!(
                "{} operation for user {} requires an amount",
                kind, csv_record.user
            ))
        }
    };

    Ok(OperationRecord {
        kind,
        user: csv_record.user,
        amount,
    })
}

/// Write balances to CSV format
///
/// Columns: user, amount. Sorted by user ID for deterministic output.
pub fn write_balances_csv(balances: &[Balance], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["user", "amount"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted = balances.to_vec();
    sorted.sort_by_key(|balance| balance.user);

    for balance in sorted {
        writer
            .write_record(&[balance.user.to_string(), balance.amount.to_string()])
            .map_err(|e| format!("Failed to write balance record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

/// Write history to CSV format
///
/// Columns: user, seq, type, amount. `seq` is the 1-based position of the
/// entry within its user's history. Users are sorted by ID and each user's
/// entries keep their insertion order. Store ids and timestamps are left out
/// because ids interleave across users differently from run to run.
pub fn write_history_csv(
    histories: &[(UserId, Vec<HistoryEntry>)],
    output: &mut dyn Write,
) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["user", "seq", "type", "amount"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted: Vec<&(UserId, Vec<HistoryEntry>)> = histories.iter().collect();
    sorted.sort_by_key(|(user, _)| *user);

    for (user, entries) in sorted {
        for (index, entry) in entries.iter().enumerate() {
            writer
                .write_record(&[
                    user.to_string(),
                    (index + 1).to_string(),
                    entry.kind.to_string(),
                    entry.amount.to_string(),
                ])
                .map_err(|e| format!("Failed to write history record: {}", e))?;
        }
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
