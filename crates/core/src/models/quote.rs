use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current price snapshot for one symbol, as returned by a `QuoteProvider`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub company_name: String,
    pub last_price: Decimal,
}
