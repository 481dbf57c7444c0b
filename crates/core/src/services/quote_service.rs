use log::{debug, warn};
use rust_decimal::Decimal;

use crate::errors::CoreError;
use crate::models::holding::{normalize_symbol, Holding};
use crate::models::order::TradeOrder;
use crate::models::quote::Quote;
use crate::models::transaction::TransactionType;
use crate::providers::registry::QuoteProviderRegistry;

/// Looks up quotes to prefill the trade form.
///
/// Providers are tried in registration order; the first valid quote wins.
pub struct QuoteService {
    registry: QuoteProviderRegistry,
}

impl QuoteService {
    pub fn new(registry: QuoteProviderRegistry) -> Self {
        Self { registry }
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Fetch a quote with automatic fallback. Quotes with a non-positive
    /// price are treated as provider errors.
    pub async fn get_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return Err(CoreError::Validation("Symbol must not be empty".into()));
        }
        if self.registry.is_empty() {
            return Err(CoreError::NoProvider(symbol));
        }

        let mut last_error = None;
        for provider in self.registry.providers() {
            match provider.get_quote(&symbol).await {
                Ok(quote) if quote.last_price > Decimal::ZERO => return Ok(quote),
                Ok(quote) => {
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!(
                            "Invalid price returned for {symbol}: {} (must be positive)",
                            quote.last_price
                        ),
                    });
                }
                Err(e) => {
                    debug!("Quote provider {} failed for {symbol}: {e}", provider.name());
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(CoreError::NoProvider(symbol)))
    }

    /// Build a trade form for `symbol`, quantity 1, priced at the live quote.
    ///
    /// When no quote can be had but the symbol is already held, the holding's
    /// last price is used instead. Without either the lookup error is returned.
    pub async fn prepare_trade(
        &self,
        symbol: &str,
        side: TransactionType,
        holding: Option<&Holding>,
    ) -> Result<TradeOrder, CoreError> {
        let symbol = normalize_symbol(symbol);
        match self.get_quote(&symbol).await {
            Ok(quote) => {
                let company_name = match holding {
                    Some(h) => h.company_name.clone(),
                    None if quote.company_name.trim().is_empty() => symbol.clone(),
                    None => quote.company_name,
                };
                Ok(TradeOrder {
                    symbol,
                    company_name,
                    side,
                    quantity: 1,
                    price: quote.last_price,
                })
            }
            Err(e) => match holding {
                Some(h) => {
                    warn!("No quote for {symbol} ({e}), using last traded price {}", h.last_price);
                    Ok(TradeOrder {
                        symbol,
                        company_name: h.company_name.clone(),
                        side,
                        quantity: 1,
                        price: h.last_price,
                    })
                }
                None => Err(CoreError::QuoteUnavailable {
                    symbol,
                    message: e.to_string(),
                }),
            },
        }
    }
}
