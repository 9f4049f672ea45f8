//! Ledger types.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// A single ledger transaction.
///
/// Immutable once ingested; `id` is the ingestion position and is the key
/// every downstream result uses to refer back to the transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Ingestion-order identifier.
    pub id: usize,
    /// Sending account.
    pub sender_id: String,
    /// Receiving account.
    pub receiver_id: String,
    /// Non-negative amount.
    pub amount: f64,
    /// Payment currency (e.g., "UK pounds").
    pub currency: Option<String>,
    /// Sender bank location.
    pub bank_location_sender: Option<String>,
    /// Receiver bank location.
    pub bank_location_receiver: Option<String>,
    /// Payment type (e.g., "Cash Deposit", "Cross-border").
    pub payment_type: Option<String>,
    /// Date and time of the payment.
    pub timestamp: Option<NaiveDateTime>,
    /// Ground-truth label when the ledger carries one.
    pub is_laundering: Option<bool>,
}

impl Transaction {
    /// Create a transaction with only the mandatory fields.
    pub fn new(
        id: usize,
        sender_id: impl Into<String>,
        receiver_id: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            id,
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
            amount,
            currency: None,
            bank_location_sender: None,
            bank_location_receiver: None,
            payment_type: None,
            timestamp: None,
            is_laundering: None,
        }
    }

    /// Set the currency.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Set the payment type.
    #[must_use]
    pub fn with_payment_type(mut self, payment_type: impl Into<String>) -> Self {
        self.payment_type = Some(payment_type.into());
        self
    }

    /// Set both bank locations.
    #[must_use]
    pub fn with_locations(mut self, sender: impl Into<String>, receiver: impl Into<String>) -> Self {
        self.bank_location_sender = Some(sender.into());
        self.bank_location_receiver = Some(receiver.into());
        self
    }

    /// Set the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set the laundering label.
    #[must_use]
    pub fn with_label(mut self, is_laundering: bool) -> Self {
        self.is_laundering = Some(is_laundering);
        self
    }

    /// Hour of day, when a timestamp is present.
    #[must_use]
    pub fn hour(&self) -> Option<u32> {
        self.timestamp.map(|ts| ts.hour())
    }
}

/// Column names recognised by the ingestion boundary.
pub mod columns {
    /// Sending account (mandatory).
    pub const SENDER: &str = "Sender_account";
    /// Receiving account (mandatory).
    pub const RECEIVER: &str = "Receiver_account";
    /// Amount (mandatory).
    pub const AMOUNT: &str = "Amount";
    /// Payment currency.
    pub const CURRENCY: &str = "Payment_currency";
    /// Payment type.
    pub const PAYMENT_TYPE: &str = "Payment_type";
    /// Sender bank location.
    pub const SENDER_LOCATION: &str = "Sender_bank_location";
    /// Receiver bank location.
    pub const RECEIVER_LOCATION: &str = "Receiver_bank_location";
    /// Payment date (`YYYY-MM-DD`).
    pub const DATE: &str = "Date";
    /// Payment time (`HH:MM:SS`).
    pub const TIME: &str = "Time";
    /// Ground-truth laundering label.
    pub const IS_LAUNDERING: &str = "Is_laundering";

    /// Columns every input table must carry.
    pub const REQUIRED: &[&str] = &[SENDER, RECEIVER, AMOUNT];
}
