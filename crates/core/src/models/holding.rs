use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// A current, non-zero position in one stock symbol.
///
/// Field names are camelCase on the wire so snapshots stay readable by the
/// mobile app that writes the same `portfolio` blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// Ticker symbol, uppercased (e.g., "RELIANCE", "TCS")
    pub symbol: String,

    /// Human-readable company name
    pub company_name: String,

    /// Most recently entered unit price
    pub last_price: Decimal,

    /// Shares currently held (always > 0 inside a `HoldingStore`)
    pub quantity: u64,

    /// `last_price * quantity`, refreshed on every mutation
    pub total_value: Decimal,

    /// Price of the buy that opened this holding. Not re-averaged by later trades.
    pub average_price: Decimal,

    /// Kept for schema compatibility; realized P&L is derived by `PnlService`.
    #[serde(default)]
    pub realized_profit: Decimal,
}

impl Holding {
    fn open(
        symbol: String,
        company_name: String,
        quantity: u64,
        price: Decimal,
        total_value: Decimal,
    ) -> Self {
        Self {
            symbol,
            company_name,
            last_price: price,
            quantity,
            total_value,
            average_price: price,
            realized_profit: Decimal::ZERO,
        }
    }

    /// Snapshot repair only; trades go through `position_value`.
    fn revalue(&mut self) {
        self.total_value = self.last_price.saturating_mul(Decimal::from(self.quantity));
    }
}

/// `price * quantity`, or a validation error when it exceeds `Decimal` range.
fn position_value(symbol: &str, quantity: u64, price: Decimal) -> Result<Decimal, CoreError> {
    price
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(|| CoreError::Validation(format!("Value overflow for {symbol}")))
}

/// Normalize a ticker symbol: trimmed and uppercased.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Shared input checks for buys and sells.
pub(crate) fn validate_trade_input(
    symbol: &str,
    quantity: u64,
    price: Decimal,
) -> Result<(), CoreError> {
    if symbol.is_empty() {
        return Err(CoreError::Validation("Symbol must not be empty".into()));
    }
    if quantity == 0 {
        return Err(CoreError::Validation(format!(
            "Quantity for {symbol} must be positive"
        )));
    }
    if price <= Decimal::ZERO {
        return Err(CoreError::Validation(format!(
            "Price for {symbol} must be positive, got {price}"
        )));
    }
    position_value(symbol, quantity, price)?;
    Ok(())
}

/// In-memory collection of current positions, one per symbol.
///
/// Invariant: no holding with `quantity == 0` is ever stored. Insertion order
/// is preserved so the persisted snapshot lists holdings in the order they were opened.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HoldingStore {
    holdings: Vec<Holding>,
}

impl HoldingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a loaded snapshot.
    ///
    /// Zero-quantity rows are dropped, duplicate rows for one symbol are
    /// merged into the first (quantities summed, later price wins) and
    /// `total_value` is recomputed, so a stale snapshot cannot break the
    /// store invariants.
    pub fn from_snapshot(rows: Vec<Holding>) -> Self {
        let mut store = Self::new();
        for mut row in rows.into_iter().filter(|h| h.quantity > 0) {
            row.symbol = normalize_symbol(&row.symbol);
            match store.position(&row.symbol) {
                Some(idx) => {
                    let existing = &mut store.holdings[idx];
                    existing.quantity = existing.quantity.saturating_add(row.quantity);
                    existing.last_price = row.last_price;
                    existing.revalue();
                }
                None => {
                    row.revalue();
                    store.holdings.push(row);
                }
            }
        }
        store
    }

    /// Record a buy: grow an existing holding or open a new one.
    ///
    /// A new holding needs a non-empty company name; for an existing one the
    /// name argument is ignored. Nothing is mutated when validation fails.
    pub fn upsert_buy(
        &mut self,
        symbol: &str,
        company_name: &str,
        quantity: u64,
        price: Decimal,
    ) -> Result<&Holding, CoreError> {
        let symbol = normalize_symbol(symbol);
        validate_trade_input(&symbol, quantity, price)?;

        match self.position(&symbol) {
            Some(idx) => {
                let holding = &mut self.holdings[idx];
                let new_quantity = holding.quantity.checked_add(quantity).ok_or_else(|| {
                    CoreError::Validation(format!("Quantity overflow for {symbol}"))
                })?;
                let new_total = position_value(&symbol, new_quantity, price)?;
                holding.quantity = new_quantity;
                holding.last_price = price;
                holding.total_value = new_total;
                Ok(&self.holdings[idx])
            }
            None => {
                let company_name = company_name.trim();
                if company_name.is_empty() {
                    return Err(CoreError::Validation(format!(
                        "Company name is required when adding {symbol}"
                    )));
                }
                let total_value = position_value(&symbol, quantity, price)?;
                self.holdings.push(Holding::open(
                    symbol,
                    company_name.to_string(),
                    quantity,
                    price,
                    total_value,
                ));
                Ok(&self.holdings[self.holdings.len() - 1])
            }
        }
    }

    /// Record a sell. Returns the remaining holding, or `None` when the sell
    /// closed the position and the holding was removed.
    ///
    /// Selling more than is held fails with `InsufficientQuantity` and leaves
    /// the store untouched; there are no partial sells.
    pub fn apply_sell(
        &mut self,
        symbol: &str,
        quantity: u64,
        price: Decimal,
    ) -> Result<Option<&Holding>, CoreError> {
        let symbol = normalize_symbol(symbol);
        validate_trade_input(&symbol, quantity, price)?;

        let idx = match self.position(&symbol) {
            Some(idx) => idx,
            None => {
                return Err(CoreError::InsufficientQuantity {
                    symbol,
                    requested: quantity,
                    held: 0,
                })
            }
        };

        let held = self.holdings[idx].quantity;
        if held < quantity {
            return Err(CoreError::InsufficientQuantity {
                symbol,
                requested: quantity,
                held,
            });
        }

        let remaining = held - quantity;
        if remaining == 0 {
            self.holdings.remove(idx);
            return Ok(None);
        }

        let total_value = position_value(&symbol, remaining, price)?;
        let holding = &mut self.holdings[idx];
        holding.quantity = remaining;
        holding.last_price = price;
        holding.total_value = total_value;
        Ok(Some(&self.holdings[idx]))
    }

    /// Look up a holding by symbol (case-insensitive).
    pub fn get(&self, symbol: &str) -> Option<&Holding> {
        let symbol = normalize_symbol(symbol);
        self.holdings.iter().find(|h| h.symbol == symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Holding> {
        self.holdings.iter()
    }

    pub fn as_slice(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Sum of `total_value` over all holdings, saturating at `Decimal::MAX`.
    pub fn total_value(&self) -> Decimal {
        self.holdings
            .iter()
            .fold(Decimal::ZERO, |acc, h| acc.saturating_add(h.total_value))
    }

    pub fn clear(&mut self) {
        self.holdings.clear();
    }

    fn position(&self, symbol: &str) -> Option<usize> {
        self.holdings.iter().position(|h| h.symbol == symbol)
    }
}
