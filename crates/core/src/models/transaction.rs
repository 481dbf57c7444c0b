use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

use super::holding::{normalize_symbol, validate_trade_input};

/// Side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Buy => write!(f, "buy"),
            TransactionType::Sell => write!(f, "sell"),
        }
    }
}

/// One executed buy or sell. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Stable identity. Older snapshots carry no id, so one is assigned on load.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    pub symbol: String,

    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    /// Shares traded (always positive)
    pub quantity: u64,

    /// Execution price per share (always positive)
    pub price: Decimal,

    /// Execution time; serialized as RFC 3339
    pub date: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        symbol: &str,
        transaction_type: TransactionType,
        quantity: u64,
        price: Decimal,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: normalize_symbol(symbol),
            transaction_type,
            quantity,
            price,
            date,
        }
    }

    pub fn buy(symbol: &str, quantity: u64, price: Decimal, date: DateTime<Utc>) -> Self {
        Self::new(symbol, TransactionType::Buy, quantity, price, date)
    }

    pub fn sell(symbol: &str, quantity: u64, price: Decimal, date: DateTime<Utc>) -> Self {
        Self::new(symbol, TransactionType::Sell, quantity, price, date)
    }

    /// Gross amount of the trade (`price * quantity`), saturating for
    /// out-of-range snapshot rows.
    pub fn amount(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Append-only record of every executed trade.
///
/// Insertion order is chronological order for trades recorded through the
/// executor, since timestamps are assigned at append time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TransactionLog {
    entries: Vec<Transaction>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from a loaded snapshot. Symbols are normalized; entries are
    /// kept in their stored order.
    pub fn from_snapshot(entries: Vec<Transaction>) -> Self {
        let entries = entries
            .into_iter()
            .map(|mut t| {
                t.symbol = normalize_symbol(&t.symbol);
                t
            })
            .collect();
        Self { entries }
    }

    /// Append a transaction after checking symbol, quantity and price.
    pub fn append(&mut self, transaction: Transaction) -> Result<&Transaction, CoreError> {
        validate_trade_input(&transaction.symbol, transaction.quantity, transaction.price)?;
        self.entries.push(transaction);
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Every transaction in insertion order.
    pub fn all(&self) -> &[Transaction] {
        &self.entries
    }

    /// Transactions sorted by date ascending. The sort is stable, so trades
    /// with identical timestamps keep their insertion order.
    pub fn chronological(&self) -> Vec<&Transaction> {
        let mut ordered: Vec<&Transaction> = self.entries.iter().collect();
        ordered.sort_by_key(|t| t.date);
        ordered
    }

    /// Newest first, for the history view.
    pub fn history(&self) -> Vec<&Transaction> {
        let mut ordered = self.chronological();
        ordered.reverse();
        ordered
    }

    /// Transactions for one symbol (case-insensitive), in insertion order.
    pub fn for_symbol(&self, symbol: &str) -> Vec<&Transaction> {
        let symbol = normalize_symbol(symbol);
        self.entries.iter().filter(|t| t.symbol == symbol).collect()
    }

    pub fn get(&self, id: Uuid) -> Option<&Transaction> {
        self.entries.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
