use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::errors::CoreError;
use crate::models::order::TradeOrder;
use crate::models::portfolio::Portfolio;
use crate::models::transaction::{Transaction, TransactionType};
use crate::storage::manager::StorageManager;
use crate::storage::traits::KeyValueStore;

/// Applies buy/sell orders to the holdings and the trade log together.
///
/// Every trade is staged on a copy of the portfolio, persisted, and only then
/// swapped into the live state. A failed validation or a failed write leaves
/// the caller's `Portfolio` exactly as it was.
pub struct TradeExecutor;

impl TradeExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Dispatch on the order's side.
    pub async fn execute<S: KeyValueStore>(
        &self,
        portfolio: &mut Portfolio,
        storage: &StorageManager<S>,
        order: &TradeOrder,
        at: DateTime<Utc>,
    ) -> Result<Transaction, CoreError> {
        match order.side {
            TransactionType::Buy => self.execute_buy(portfolio, storage, order, at).await,
            TransactionType::Sell => self.execute_sell(portfolio, storage, order, at).await,
        }
    }

    /// Grow or open a holding and record a buy.
    ///
    /// The holding step runs first; if it fails no transaction is created.
    pub async fn execute_buy<S: KeyValueStore>(
        &self,
        portfolio: &mut Portfolio,
        storage: &StorageManager<S>,
        order: &TradeOrder,
        at: DateTime<Utc>,
    ) -> Result<Transaction, CoreError> {
        let mut staged = portfolio.clone();
        staged.holdings.upsert_buy(
            &order.symbol,
            &order.company_name,
            order.quantity,
            order.price,
        )?;

        let transaction = Transaction::buy(&order.symbol, order.quantity, order.price, at);
        staged.transactions.append(transaction.clone())?;

        Self::commit(portfolio, staged, storage).await?;
        debug!(
            "Bought {} {} @ {}",
            transaction.quantity, transaction.symbol, transaction.price
        );
        Ok(transaction)
    }

    /// Shrink or close a holding and record a sell.
    ///
    /// Selling more than is held fails with `InsufficientQuantity`; nothing is
    /// written and no transaction is recorded.
    pub async fn execute_sell<S: KeyValueStore>(
        &self,
        portfolio: &mut Portfolio,
        storage: &StorageManager<S>,
        order: &TradeOrder,
        at: DateTime<Utc>,
    ) -> Result<Transaction, CoreError> {
        let mut staged = portfolio.clone();
        if let Err(e) = staged
            .holdings
            .apply_sell(&order.symbol, order.quantity, order.price)
        {
            debug!("Sell of {} {} rejected: {e}", order.quantity, order.symbol);
            return Err(e);
        }

        let transaction = Transaction::sell(&order.symbol, order.quantity, order.price, at);
        staged.transactions.append(transaction.clone())?;

        Self::commit(portfolio, staged, storage).await?;
        debug!(
            "Sold {} {} @ {}",
            transaction.quantity, transaction.symbol, transaction.price
        );
        Ok(transaction)
    }

    async fn commit<S: KeyValueStore>(
        portfolio: &mut Portfolio,
        staged: Portfolio,
        storage: &StorageManager<S>,
    ) -> Result<(), CoreError> {
        if let Err(e) = storage.commit(portfolio, &staged).await {
            warn!("Trade rolled back, snapshot write failed: {e}");
            return Err(e);
        }
        *portfolio = staged;
        Ok(())
    }
}

impl Default for TradeExecutor {
    fn default() -> Self {
        Self::new()
    }
}
