//! Tabular ingestion boundary.
//!
//! A `RawTable` is whatever the caller loaded (CSV, JSON records, a
//! dataframe export) reduced to named string columns. `TransactionTable`
//! validates it once and holds the typed, immutable ledger.

use crate::types::{Transaction, columns};
use amlkernel_core::{
    domain::Domain,
    error::{KernelError, Result},
    kernel::KernelMetadata,
    traits::{AnalyticsKernel, BatchKernel},
};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Untyped table of string cells.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTable {
    /// Column names.
    pub columns: Vec<String>,
    /// Rows; each row has one cell per column.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Create a table from column names and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// Build a table from JSON records.
    ///
    /// Columns are the union of record keys in first-seen order; absent or
    /// null values become empty cells.
    pub fn from_records(records: &[Map<String, Value>]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for record in records {
            for key in record.keys() {
                if seen.insert(key.as_str()) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(c).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Parse a JSON array of record objects.
    pub fn from_json(text: &str) -> Result<Self> {
        let records: Vec<Map<String, Value>> = serde_json::from_str(text)
            .map_err(|e| KernelError::SerializationError(format!("Invalid JSON records: {}", e)))?;
        Ok(Self::from_records(&records))
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Mandatory columns the table lacks.
    pub fn missing_required(&self) -> Vec<String> {
        columns::REQUIRED
            .iter()
            .filter(|name| !self.columns.iter().any(|c| c == *name))
            .map(|name| name.to_string())
            .collect()
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Validated, immutable transaction ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionTable {
    transactions: Vec<Transaction>,
}

impl TransactionTable {
    /// Wrap already-typed transactions, re-numbering ids in order.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let transactions = transactions
            .into_iter()
            .enumerate()
            .map(|(id, tx)| Transaction { id, ..tx })
            .collect();
        Self { transactions }
    }

    /// Validate a raw table and convert every row.
    ///
    /// Fails fast with `MissingColumns` before looking at any row. Rows with
    /// an empty sender or receiver fail with `MissingAccountIdentifier`; a
    /// non-numeric or negative amount fails with `InvalidField`. Unparseable
    /// optional cells are logged and left empty.
    pub fn from_raw(raw: &RawTable) -> Result<Self> {
        let missing = raw.missing_required();
        if !missing.is_empty() {
            return Err(KernelError::MissingColumns { missing });
        }

        let index: HashMap<&str, usize> = raw
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        let mut transactions = Vec::with_capacity(raw.rows.len());
        for (row_idx, row) in raw.rows.iter().enumerate() {
            let cell = |name: &str| -> Option<&str> {
                index
                    .get(name)
                    .and_then(|&i| row.get(i))
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
            };

            let sender = cell(columns::SENDER)
                .ok_or_else(|| KernelError::missing_account(row_idx, columns::SENDER))?;
            let receiver = cell(columns::RECEIVER)
                .ok_or_else(|| KernelError::missing_account(row_idx, columns::RECEIVER))?;
            let amount = parse_amount(row_idx, cell(columns::AMOUNT))?;

            let mut tx = Transaction::new(row_idx, sender, receiver, amount);
            tx.currency = cell(columns::CURRENCY).map(str::to_string);
            tx.payment_type = cell(columns::PAYMENT_TYPE).map(str::to_string);
            tx.bank_location_sender = cell(columns::SENDER_LOCATION).map(str::to_string);
            tx.bank_location_receiver = cell(columns::RECEIVER_LOCATION).map(str::to_string);
            tx.timestamp = parse_timestamp(row_idx, cell(columns::DATE), cell(columns::TIME));
            tx.is_laundering = cell(columns::IS_LAUNDERING).and_then(|s| parse_label(row_idx, s));

            transactions.push(tx);
        }

        debug!(rows = transactions.len(), "Ingested transaction table");
        Ok(Self { transactions })
    }

    /// All transactions in ingestion order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Look up a transaction by id.
    pub fn get(&self, id: usize) -> Option<&Transaction> {
        self.transactions.get(id)
    }

    /// Number of transactions.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Distinct accounts in first-seen order (sender before receiver).
    pub fn accounts(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for tx in &self.transactions {
            for account in [tx.sender_id.as_str(), tx.receiver_id.as_str()] {
                if seen.insert(account) {
                    out.push(account);
                }
            }
        }
        out
    }

    /// Sum of all amounts.
    pub fn total_amount(&self) -> f64 {
        self.transactions.iter().map(|t| t.amount).sum()
    }
}

fn parse_amount(row: usize, raw: Option<&str>) -> Result<f64> {
    let invalid = |reason: String| KernelError::InvalidField {
        row,
        column: columns::AMOUNT.to_string(),
        reason,
    };

    let text = raw.ok_or_else(|| invalid("empty amount".to_string()))?;
    let amount: f64 = text
        .replace(',', "")
        .parse()
        .map_err(|_| invalid(format!("not a number: {}", text)))?;

    if !amount.is_finite() || amount < 0.0 {
        return Err(invalid(format!("amount must be a finite non-negative number, got {}", text)));
    }
    Ok(amount)
}

fn parse_timestamp(row: usize, date: Option<&str>, time: Option<&str>) -> Option<NaiveDateTime> {
    let date_text = date?;
    let Ok(date) = NaiveDate::parse_from_str(date_text, "%Y-%m-%d") else {
        warn!(row, date = date_text, "Unparseable date, leaving timestamp empty");
        return None;
    };

    let time = match time {
        Some(t) => match NaiveTime::parse_from_str(t, "%H:%M:%S") {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(row, time = t, "Unparseable time, using midnight");
                NaiveTime::MIN
            }
        },
        None => NaiveTime::MIN,
    };

    Some(date.and_time(time))
}

fn parse_label(row: usize, raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        other => {
            warn!(row, label = other, "Unrecognised laundering label");
            None
        }
    }
}

/// Ledger validation kernel.
///
/// Wraps `TransactionTable::from_raw` so ingestion can be registered and
/// executed like every other stage.
#[derive(Debug, Clone)]
pub struct LedgerValidation {
    metadata: KernelMetadata,
}

impl Default for LedgerValidation {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerValidation {
    /// Create a new ledger validation kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::batch("ledger/validation", Domain::Ledger)
                .with_description("Mandatory column check and typed transaction conversion")
                .with_throughput(1_000_000)
                .with_latency_us(5.0),
        }
    }
}

impl AnalyticsKernel for LedgerValidation {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

#[async_trait]
impl BatchKernel<RawTable, TransactionTable> for LedgerValidation {
    async fn execute(&self, input: RawTable) -> Result<TransactionTable> {
        TransactionTable::from_raw(&input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_columns_listed() {
        let raw = RawTable::new(header(&["Sender_account", "Date"]), vec![]);
        let err = TransactionTable::from_raw(&raw).unwrap_err();
        match err {
            KernelError::MissingColumns { missing } => {
                assert_eq!(missing, vec!["Receiver_account".to_string(), "Amount".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_full_row_conversion() {
        let raw = RawTable::new(
            header(&[
                "Time",
                "Date",
                "Sender_account",
                "Receiver_account",
                "Amount",
                "Payment_currency",
                "Sender_bank_location",
                "Receiver_bank_location",
                "Payment_type",
                "Is_laundering",
            ]),
            vec![row(&[
                "10:35:19",
                "2022-10-07",
                "8724731955",
                "2769355426",
                "1459.15",
                "UK pounds",
                "UK",
                "UK",
                "Cash Deposit",
                "0",
            ])],
        );

        let table = TransactionTable::from_raw(&raw).unwrap();
        assert_eq!(table.len(), 1);
        let tx = table.get(0).unwrap();
        assert_eq!(tx.sender_id, "8724731955");
        assert_eq!(tx.receiver_id, "2769355426");
        assert!((tx.amount - 1459.15).abs() < 1e-9);
        assert_eq!(tx.currency.as_deref(), Some("UK pounds"));
        assert_eq!(tx.payment_type.as_deref(), Some("Cash Deposit"));
        assert_eq!(tx.timestamp.unwrap().hour(), 10);
        assert_eq!(tx.is_laundering, Some(false));
    }

    #[test]
    fn test_empty_sender_is_missing_account() {
        let raw = RawTable::new(
            header(&["Sender_account", "Receiver_account", "Amount"]),
            vec![row(&["A", "B", "10"]), row(&["  ", "B", "10"])],
        );
        let err = TransactionTable::from_raw(&raw).unwrap_err();
        assert!(matches!(err, KernelError::MissingAccountIdentifier { row: 1, .. }));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let raw = RawTable::new(
            header(&["Sender_account", "Receiver_account", "Amount"]),
            vec![row(&["A", "B", "-5"])],
        );
        assert!(matches!(
            TransactionTable::from_raw(&raw),
            Err(KernelError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_bad_optional_cells_do_not_abort() {
        let raw = RawTable::new(
            header(&["Sender_account", "Receiver_account", "Amount", "Date", "Is_laundering"]),
            vec![row(&["A", "B", "1,000", "07/10/2022", "maybe"])],
        );
        let table = TransactionTable::from_raw(&raw).unwrap();
        let tx = table.get(0).unwrap();
        assert_eq!(tx.amount, 1000.0);
        assert!(tx.timestamp.is_none());
        assert!(tx.is_laundering.is_none());
    }

    #[test]
    fn test_from_json_records() {
        let raw = RawTable::from_json(
            r#"[
                {"Sender_account": "A", "Receiver_account": "B", "Amount": 1000},
                {"Sender_account": "B", "Receiver_account": "C", "Amount": 2000.5, "Payment_type": null}
            ]"#,
        )
        .unwrap();
        assert_eq!(raw.columns.len(), 4);

        let table = TransactionTable::from_raw(&raw).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.accounts(), vec!["A", "B", "C"]);
        assert!((table.total_amount() - 3000.5).abs() < 1e-9);
        assert!(table.get(1).unwrap().payment_type.is_none());
    }

    #[test]
    fn test_from_transactions_renumbers() {
        let table = TransactionTable::from_transactions(vec![
            Transaction::new(10, "A", "B", 1.0),
            Transaction::new(20, "B", "C", 2.0),
        ]);
        assert_eq!(table.get(1).unwrap().id, 1);
    }

    #[test]
    fn test_accounts_first_seen_order() {
        let table = TransactionTable::from_transactions(vec![
            Transaction::new(0, "C", "A", 1.0),
            Transaction::new(1, "A", "B", 1.0),
            Transaction::new(2, "B", "C", 1.0),
        ]);
        assert_eq!(table.accounts(), vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_validation_kernel() {
        let kernel = LedgerValidation::new();
        assert_eq!(kernel.id(), "ledger/validation");

        let raw = RawTable::new(header(&["Amount"]), vec![]);
        assert!(kernel.execute(raw).await.is_err());
    }
}
