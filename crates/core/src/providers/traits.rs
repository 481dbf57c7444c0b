use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::quote::Quote;

/// Source of current price snapshots (exchange feed, broker API, mock).
///
/// The ledger only uses quotes to prefill trade forms; it never depends on a
/// quote being available to execute a trade.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Latest quote for `symbol`.
    async fn get_quote(&self, symbol: &str) -> Result<Quote, CoreError>;
}
