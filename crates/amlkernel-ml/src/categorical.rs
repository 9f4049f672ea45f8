//! Categorical encoding of transactions.
//!
//! CLOPE works on sets of categorical items. A transaction becomes the set of
//! `field=value` tokens for the fields it carries; tokens are interned to
//! `u32` ids before clustering.

use amlkernel_ledger::types::Transaction;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// A transaction rewritten as a set of tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalTransaction {
    /// Id of the source transaction.
    pub transaction_id: usize,
    /// Distinct tokens, in field order.
    pub tokens: Vec<String>,
}

impl CategoricalTransaction {
    /// Tokenize one transaction.
    ///
    /// Amounts fall into bins of `amount_bin_width`; a non-positive width
    /// puts every amount into bin 0.
    pub fn from_transaction(tx: &Transaction, amount_bin_width: f64) -> Self {
        let bin = if amount_bin_width > 0.0 {
            (tx.amount / amount_bin_width).floor() as u64
        } else {
            0
        };

        let mut tokens = vec![
            format!("sender={}", tx.sender_id),
            format!("receiver={}", tx.receiver_id),
            format!("amount_bin={}", bin),
        ];
        if let Some(currency) = &tx.currency {
            tokens.push(format!("currency={}", currency));
        }
        if let Some(payment_type) = &tx.payment_type {
            tokens.push(format!("type={}", payment_type));
        }
        if let Some(hour) = tx.hour() {
            tokens.push(format!("hour={}", hour));
        }
        if let Some(loc) = &tx.bank_location_sender {
            tokens.push(format!("sender_loc={}", loc));
        }
        if let Some(loc) = &tx.bank_location_receiver {
            tokens.push(format!("receiver_loc={}", loc));
        }

        Self {
            transaction_id: tx.id,
            tokens,
        }
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the transaction carries no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Bidirectional token/id table.
#[derive(Debug, Clone, Default)]
pub struct TokenInterner {
    ids: HashMap<String, u32>,
    tokens: Vec<String>,
}

impl TokenInterner {
    /// Create an empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `token`, assigning the next id on first sight.
    pub fn intern(&mut self, token: &str) -> u32 {
        if let Some(&id) = self.ids.get(token) {
            return id;
        }
        let id = self.tokens.len() as u32;
        self.tokens.push(token.to_string());
        self.ids.insert(token.to_string(), id);
        id
    }

    /// Id of a known token.
    pub fn get(&self, token: &str) -> Option<u32> {
        self.ids.get(token).copied()
    }

    /// Token of a known id.
    pub fn resolve(&self, id: u32) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Intern a categorical transaction into a sorted, duplicate-free id set.
    pub fn encode(&mut self, tx: &CategoricalTransaction) -> Vec<u32> {
        let mut ids: Vec<u32> = tx.tokens.iter().map(|t| self.intern(t)).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Tokenize and intern a batch of transactions.
pub fn encode_transactions(
    transactions: &[Transaction],
    amount_bin_width: f64,
) -> (Vec<Vec<u32>>, TokenInterner) {
    let mut interner = TokenInterner::new();
    let items = transactions
        .iter()
        .map(|tx| interner.encode(&CategoricalTransaction::from_transaction(tx, amount_bin_width)))
        .collect();
    (items, interner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_tokens_for_present_fields() {
        let ts = NaiveDate::from_ymd_opt(2022, 10, 7)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();
        let tx = Transaction::new(3, "A", "B", 2500.0)
            .with_currency("UK pounds")
            .with_payment_type("Cash Deposit")
            .with_timestamp(ts);

        let cat = CategoricalTransaction::from_transaction(&tx, 1000.0);
        assert_eq!(cat.transaction_id, 3);
        assert_eq!(
            cat.tokens,
            vec![
                "sender=A",
                "receiver=B",
                "amount_bin=2",
                "currency=UK pounds",
                "type=Cash Deposit",
                "hour=14",
            ]
        );
    }

    #[test]
    fn test_minimal_transaction() {
        let cat = CategoricalTransaction::from_transaction(&Transaction::new(0, "A", "B", 10.0), 1000.0);
        assert_eq!(cat.len(), 3);
    }

    #[test]
    fn test_interner_roundtrip() {
        let mut interner = TokenInterner::new();
        let a = interner.intern("sender=A");
        let b = interner.intern("receiver=B");
        assert_eq!(interner.intern("sender=A"), a);
        assert_ne!(a, b);
        assert_eq!(interner.resolve(b), Some("receiver=B"));
        assert_eq!(interner.get("missing"), None);
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn test_shared_tokens_share_ids() {
        let txs = vec![
            Transaction::new(0, "A", "B", 100.0),
            Transaction::new(1, "A", "C", 150.0),
        ];
        let (items, interner) = encode_transactions(&txs, 1000.0);
        // sender=A and amount_bin=0 are shared
        assert_eq!(interner.len(), 4);
        let shared: Vec<&u32> = items[0].iter().filter(|id| items[1].contains(id)).collect();
        assert_eq!(shared.len(), 2);
    }
}
