pub mod errors;
pub mod format;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;

use errors::CoreError;
use format::FormattedAmount;
use models::{
    holding::{normalize_symbol, Holding},
    order::TradeOrder,
    portfolio::Portfolio,
    settings::LedgerSettings,
    summary::{PortfolioSummary, SymbolPnl},
    transaction::{Transaction, TransactionType},
};
use services::{
    pnl_service::PnlService, quote_service::QuoteService, trade_service::TradeExecutor,
};
use storage::{manager::StorageManager, traits::KeyValueStore};

/// Main entry point for the portfolio screen.
/// Owns the ledger state and the store it is persisted to.
///
/// Mutating methods take `&mut self` and return only after both snapshots
/// are written, so trades are applied and persisted strictly one at a time.
#[must_use]
pub struct PortfolioLedger<S: KeyValueStore> {
    portfolio: Portfolio,
    storage: StorageManager<S>,
    settings: LedgerSettings,
    executor: TradeExecutor,
    pnl_service: PnlService,
}

impl<S: KeyValueStore> std::fmt::Debug for PortfolioLedger<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioLedger")
            .field("holdings", &self.portfolio.holdings.len())
            .field("transactions", &self.portfolio.transactions.len())
            .field("settings", &self.settings)
            .finish()
    }
}

impl<S: KeyValueStore> PortfolioLedger<S> {
    /// Open the ledger persisted in `store` with default settings.
    /// An empty store yields an empty ledger.
    pub async fn open(store: S) -> Result<Self, CoreError> {
        Self::open_with_settings(store, LedgerSettings::default()).await
    }

    pub async fn open_with_settings(store: S, settings: LedgerSettings) -> Result<Self, CoreError> {
        settings.validate()?;
        let storage = StorageManager::new(store, &settings);
        let portfolio = storage.load().await?;
        Ok(Self {
            portfolio,
            storage,
            settings,
            executor: TradeExecutor::new(),
            pnl_service: PnlService::new(),
        })
    }

    // ── Trading ─────────────────────────────────────────────────────

    /// Add a stock to the portfolio: opens a new holding, or tops up an
    /// existing one, and records a buy.
    pub async fn add_stock(
        &mut self,
        symbol: &str,
        company_name: &str,
        quantity: u64,
        price: Decimal,
    ) -> Result<Transaction, CoreError> {
        let order = TradeOrder::buy(symbol, company_name, quantity, price);
        self.execute_at(&order, Utc::now()).await
    }

    /// Buy more of a symbol that is already held.
    pub async fn buy(
        &mut self,
        symbol: &str,
        quantity: u64,
        price: Decimal,
    ) -> Result<Transaction, CoreError> {
        let company_name = self
            .portfolio
            .holdings
            .get(symbol)
            .map(|h| h.company_name.clone())
            .ok_or_else(|| CoreError::HoldingNotFound(normalize_symbol(symbol)))?;
        let order = TradeOrder::buy(symbol, company_name, quantity, price);
        self.execute_at(&order, Utc::now()).await
    }

    /// Sell shares of a held symbol. Selling more than is held is rejected
    /// with `InsufficientQuantity` and records nothing.
    pub async fn sell(
        &mut self,
        symbol: &str,
        quantity: u64,
        price: Decimal,
    ) -> Result<Transaction, CoreError> {
        let order = TradeOrder::sell(symbol, quantity, price);
        self.execute_at(&order, Utc::now()).await
    }

    /// Execute a buy or sell order, e.g. one prepared by `prepare_trade`.
    pub async fn execute(&mut self, order: &TradeOrder) -> Result<Transaction, CoreError> {
        self.execute_at(order, Utc::now()).await
    }

    /// Execute an order with an explicit timestamp (imports, replays, tests).
    pub async fn execute_at(
        &mut self,
        order: &TradeOrder,
        at: DateTime<Utc>,
    ) -> Result<Transaction, CoreError> {
        self.executor
            .execute(&mut self.portfolio, &self.storage, order, at)
            .await
    }

    /// Prefill a trade form from a live quote, falling back to the held
    /// position's last price when no quote is available.
    pub async fn prepare_trade(
        &self,
        quotes: &QuoteService,
        symbol: &str,
        side: TransactionType,
    ) -> Result<TradeOrder, CoreError> {
        quotes
            .prepare_trade(symbol, side, self.portfolio.holdings.get(symbol))
            .await
    }

    // ── Holdings & History ──────────────────────────────────────────

    #[must_use]
    pub fn holdings(&self) -> &[Holding] {
        self.portfolio.holdings.as_slice()
    }

    #[must_use]
    pub fn holding(&self, symbol: &str) -> Option<&Holding> {
        self.portfolio.holdings.get(symbol)
    }

    /// All transactions in the order they were recorded.
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        self.portfolio.transactions.all()
    }

    /// Transactions newest first, for the history view.
    #[must_use]
    pub fn history(&self) -> Vec<&Transaction> {
        self.portfolio.transactions.history()
    }

    #[must_use]
    pub fn transactions_for(&self, symbol: &str) -> Vec<&Transaction> {
        self.portfolio.transactions.for_symbol(symbol)
    }

    #[must_use]
    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    // ── Profit & Loss ───────────────────────────────────────────────

    /// Recompute totals and realized P&L from the current state.
    #[must_use]
    pub fn summary(&self) -> PortfolioSummary {
        self.pnl_service.compute_summary(&self.portfolio)
    }

    /// Realized P&L for one symbol, including symbols no longer held.
    #[must_use]
    pub fn realized_for(&self, symbol: &str) -> Option<SymbolPnl> {
        self.summary().symbol(symbol).cloned()
    }

    /// Format an amount with the configured currency symbol.
    #[must_use]
    pub fn format_amount(&self, amount: Decimal) -> FormattedAmount {
        format::format_amount_with_symbol(amount, &self.settings.currency_symbol)
    }

    // ── Settings & Storage ──────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        self.storage.store()
    }

    /// Delete both snapshots and start over with an empty ledger.
    /// In-memory state is cleared only after the store confirms the removal.
    pub async fn reset(&mut self) -> Result<(), CoreError> {
        self.storage.clear().await?;
        self.portfolio = Portfolio::new();
        debug!("Ledger reset");
        Ok(())
    }

    // ── Export ──────────────────────────────────────────────────────

    /// Export all transactions as a JSON array (same shape as the snapshot).
    pub fn export_transactions_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.portfolio.transactions).map_err(|e| {
            CoreError::Serialization(format!("Failed to serialize transactions to JSON: {e}"))
        })
    }

    /// Export all transactions as CSV in recorded order.
    /// Columns: id, date, type, symbol, quantity, price, amount
    #[must_use]
    pub fn export_transactions_csv(&self) -> String {
        let mut csv = String::from("id,date,type,symbol,quantity,price,amount\n");
        for tx in self.portfolio.transactions.all() {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                tx.id,
                tx.date.to_rfc3339(),
                tx.transaction_type,
                csv_field(&tx.symbol),
                tx.quantity,
                tx.price,
                tx.amount(),
            ));
        }
        csv
    }
}

/// Quote a CSV field containing commas, quotes, or newlines.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
