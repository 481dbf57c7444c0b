use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::holding::normalize_symbol;
use super::transaction::TransactionType;

/// A buy or sell request as entered on the trade form.
///
/// `QuoteService::prepare_trade` returns one prefilled from a live quote;
/// the user may override quantity and price before it is executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOrder {
    pub symbol: String,
    /// Needed only when a buy opens a new holding
    pub company_name: String,
    pub side: TransactionType,
    pub quantity: u64,
    pub price: Decimal,
}

impl TradeOrder {
    pub fn buy(
        symbol: &str,
        company_name: impl Into<String>,
        quantity: u64,
        price: Decimal,
    ) -> Self {
        Self {
            symbol: normalize_symbol(symbol),
            company_name: company_name.into(),
            side: TransactionType::Buy,
            quantity,
            price,
        }
    }

    pub fn sell(symbol: &str, quantity: u64, price: Decimal) -> Self {
        Self {
            symbol: normalize_symbol(symbol),
            company_name: String::new(),
            side: TransactionType::Sell,
            quantity,
            price,
        }
    }

    pub fn with_quantity(mut self, quantity: u64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = price;
        self
    }
}
