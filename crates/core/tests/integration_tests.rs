// ═══════════════════════════════════════════════════════════════════
// Integration Tests — PortfolioLedger end to end, amount formatting
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use trade_ledger_core::errors::CoreError;
use trade_ledger_core::format::{format_amount, format_amount_with_symbol};
use trade_ledger_core::models::order::TradeOrder;
use trade_ledger_core::models::quote::Quote;
use trade_ledger_core::models::settings::LedgerSettings;
use trade_ledger_core::models::transaction::TransactionType;
use trade_ledger_core::providers::registry::QuoteProviderRegistry;
use trade_ledger_core::providers::traits::QuoteProvider;
use trade_ledger_core::services::quote_service::QuoteService;
use trade_ledger_core::storage::file::FileStore;
use trade_ledger_core::storage::memory::MemoryStore;
use trade_ledger_core::PortfolioLedger;

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, day, 9, 30, 0).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Mock Quote Provider
// ═══════════════════════════════════════════════════════════════════

struct FixedQuoteProvider;

#[async_trait]
impl QuoteProvider for FixedQuoteProvider {
    fn name(&self) -> &str {
        "Fixed"
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        match symbol {
            "RELIANCE" => Ok(Quote {
                symbol: symbol.into(),
                company_name: "Reliance Industries".into(),
                last_price: dec!(2950.50),
            }),
            _ => Err(CoreError::Api {
                provider: "Fixed".into(),
                message: format!("no quote for {symbol}"),
            }),
        }
    }
}

fn quotes() -> QuoteService {
    let mut registry = QuoteProviderRegistry::new();
    registry.register(Box::new(FixedQuoteProvider));
    QuoteService::new(registry)
}

// ═══════════════════════════════════════════════════════════════════
// Trading through the facade
// ═══════════════════════════════════════════════════════════════════

mod trading {
    use super::*;

    #[tokio::test]
    async fn add_buy_sell_flow() {
        let mut ledger = PortfolioLedger::open(MemoryStore::new()).await.unwrap();
        assert!(ledger.holdings().is_empty());

        ledger
            .add_stock("tcs", "Tata Consultancy Services", 10, dec!(3500))
            .await
            .unwrap();
        ledger.buy("TCS", 5, dec!(3600)).await.unwrap();

        let tcs = ledger.holding("TCS").unwrap();
        assert_eq!(tcs.quantity, 15);
        assert_eq!(tcs.last_price, dec!(3600));
        assert_eq!(tcs.total_value, dec!(54000));
        assert_eq!(tcs.average_price, dec!(3500));
        assert_eq!(tcs.company_name, "Tata Consultancy Services");

        let sell = ledger.sell("tcs", 15, dec!(3700)).await.unwrap();
        assert_eq!(sell.transaction_type, TransactionType::Sell);
        assert!(ledger.holding("TCS").is_none());
        assert_eq!(ledger.transactions().len(), 3);

        let pnl = ledger.realized_for("TCS").unwrap();
        // (3700-3500)*10 + (3700-3600)*5
        assert_eq!(pnl.realized_profit, dec!(2500));
        assert_eq!(pnl.realized_loss, Decimal::ZERO);
    }

    #[tokio::test]
    async fn buy_requires_existing_holding() {
        let mut ledger = PortfolioLedger::open(MemoryStore::new()).await.unwrap();
        let err = ledger.buy("infy", 1, dec!(1500)).await.unwrap_err();
        match err {
            CoreError::HoldingNotFound(symbol) => assert_eq!(symbol, "INFY"),
            other => panic!("expected HoldingNotFound, got {other:?}"),
        }
        assert!(ledger.transactions().is_empty());
    }

    #[tokio::test]
    async fn oversell_rejected() {
        let mut ledger = PortfolioLedger::open(MemoryStore::new()).await.unwrap();
        ledger.add_stock("HDFC", "HDFC Bank", 3, dec!(1600)).await.unwrap();

        let err = ledger.sell("HDFC", 5, dec!(1650)).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot sell 5 HDFC — you only hold 3");
        assert_eq!(ledger.holding("HDFC").unwrap().quantity, 3);
        assert_eq!(ledger.transactions().len(), 1);
    }

    #[tokio::test]
    async fn invalid_inputs_record_nothing() {
        let mut ledger = PortfolioLedger::open(MemoryStore::new()).await.unwrap();
        assert!(matches!(
            ledger.add_stock("TCS", "Tata", 0, dec!(10)).await,
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            ledger.add_stock("TCS", "Tata", 1, dec!(-1)).await,
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            ledger.add_stock("  ", "Tata", 1, dec!(10)).await,
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            ledger.add_stock("TCS", "", 1, dec!(10)).await,
            Err(CoreError::Validation(_))
        ));
        assert!(ledger.portfolio().is_empty());
        assert!(ledger.store().is_empty());
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let mut ledger = PortfolioLedger::open(MemoryStore::new()).await.unwrap();
        ledger
            .execute_at(&TradeOrder::buy("A", "Alpha", 1, dec!(10)), at(1))
            .await
            .unwrap();
        ledger
            .execute_at(&TradeOrder::buy("B", "Beta", 1, dec!(20)), at(2))
            .await
            .unwrap();
        ledger
            .execute_at(&TradeOrder::sell("A", 1, dec!(12)), at(3))
            .await
            .unwrap();

        let history: Vec<_> = ledger
            .history()
            .iter()
            .map(|t| (t.symbol.as_str(), t.transaction_type))
            .collect();
        assert_eq!(
            history,
            vec![
                ("A", TransactionType::Sell),
                ("B", TransactionType::Buy),
                ("A", TransactionType::Buy),
            ]
        );
        assert_eq!(ledger.transactions_for("a").len(), 2);
    }

    #[tokio::test]
    async fn prepared_order_can_be_adjusted_and_executed() {
        let mut ledger = PortfolioLedger::open(MemoryStore::new()).await.unwrap();
        let order = ledger
            .prepare_trade(&quotes(), "reliance", TransactionType::Buy)
            .await
            .unwrap();
        assert_eq!(order.price, dec!(2950.50));
        assert_eq!(order.quantity, 1);

        ledger.execute(&order.with_quantity(4)).await.unwrap();
        let holding = ledger.holding("RELIANCE").unwrap();
        assert_eq!(holding.company_name, "Reliance Industries");
        assert_eq!(holding.total_value, dec!(11802));
    }

    #[tokio::test]
    async fn prepare_trade_falls_back_to_held_price() {
        let mut ledger = PortfolioLedger::open(MemoryStore::new()).await.unwrap();
        ledger.add_stock("ITC", "ITC Ltd", 10, dec!(430)).await.unwrap();

        let order = ledger
            .prepare_trade(&quotes(), "ITC", TransactionType::Sell)
            .await
            .unwrap();
        assert_eq!(order.price, dec!(430));

        let err = ledger
            .prepare_trade(&quotes(), "WIPRO", TransactionType::Buy)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::QuoteUnavailable { .. }));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Summary
// ═══════════════════════════════════════════════════════════════════

mod summary {
    use super::*;

    #[tokio::test]
    async fn dashboard_totals() {
        let mut ledger = PortfolioLedger::open(MemoryStore::new()).await.unwrap();
        ledger
            .execute_at(&TradeOrder::buy("X", "Xeno", 10, dec!(100)), at(1))
            .await
            .unwrap();
        ledger
            .execute_at(&TradeOrder::buy("X", "", 10, dec!(120)), at(2))
            .await
            .unwrap();
        ledger
            .execute_at(&TradeOrder::sell("X", 15, dec!(150)), at(3))
            .await
            .unwrap();
        ledger
            .execute_at(&TradeOrder::buy("Y", "Yotta", 10, dec!(100)), at(4))
            .await
            .unwrap();
        ledger
            .execute_at(&TradeOrder::sell("Y", 10, dec!(80)), at(5))
            .await
            .unwrap();

        let summary = ledger.summary();
        assert_eq!(summary.total_profit, dec!(650));
        assert_eq!(summary.total_loss, dec!(200));
        assert_eq!(summary.net_realized(), dec!(450));
        assert_eq!(summary.total_value, dec!(750));
        assert!(summary.is_consistent());
        assert_eq!(ledger.summary(), summary);
    }

    #[tokio::test]
    async fn unknown_symbol_has_no_pnl() {
        let ledger = PortfolioLedger::open(MemoryStore::new()).await.unwrap();
        assert!(ledger.realized_for("NOPE").is_none());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Persistence
// ═══════════════════════════════════════════════════════════════════

mod persistence {
    use super::*;

    #[tokio::test]
    async fn reopen_restores_state() {
        let dir = tempfile::tempdir().unwrap();

        let (holdings, transactions) = {
            let store = FileStore::open(dir.path()).await.unwrap();
            let mut ledger = PortfolioLedger::open(store).await.unwrap();
            ledger.add_stock("TCS", "Tata", 10, dec!(3500)).await.unwrap();
            ledger.sell("TCS", 4, dec!(3400)).await.unwrap();
            (ledger.holdings().to_vec(), ledger.transactions().to_vec())
        };

        let store = FileStore::open(dir.path()).await.unwrap();
        let reopened = PortfolioLedger::open(store).await.unwrap();
        assert_eq!(reopened.holdings(), holdings.as_slice());
        assert_eq!(reopened.transactions(), transactions.as_slice());
        assert_eq!(reopened.summary().total_loss, dec!(400));
    }

    #[tokio::test]
    async fn custom_keys_are_used() {
        let settings = LedgerSettings {
            portfolio_key: "demo_holdings".into(),
            transactions_key: "demo_trades".into(),
            ..LedgerSettings::default()
        };
        let mut ledger = PortfolioLedger::open_with_settings(MemoryStore::new(), settings)
            .await
            .unwrap();
        ledger.add_stock("TCS", "Tata", 1, dec!(10)).await.unwrap();

        assert!(ledger.store().snapshot("demo_holdings").is_some());
        assert!(ledger.store().snapshot("demo_trades").is_some());
        assert!(ledger.store().snapshot("portfolio").is_none());
    }

    #[tokio::test]
    async fn invalid_settings_rejected() {
        let settings = LedgerSettings {
            transactions_key: "portfolio".into(),
            ..LedgerSettings::default()
        };
        let result = PortfolioLedger::open_with_settings(MemoryStore::new(), settings).await;
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn corrupt_snapshot_fails_open() {
        let store = MemoryStore::with_blobs([("transactions", "[{\"oops\":")]);
        let result = PortfolioLedger::open(store).await;
        assert!(matches!(result, Err(CoreError::Deserialization(_))));
    }

    #[tokio::test]
    async fn reset_clears_store_and_state() {
        let mut ledger = PortfolioLedger::open(MemoryStore::new()).await.unwrap();
        ledger.add_stock("TCS", "Tata", 1, dec!(10)).await.unwrap();

        ledger.reset().await.unwrap();
        assert!(ledger.portfolio().is_empty());
        assert!(ledger.store().is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Export
// ═══════════════════════════════════════════════════════════════════

mod export {
    use super::*;

    #[tokio::test]
    async fn csv_export() {
        let mut ledger = PortfolioLedger::open(MemoryStore::new()).await.unwrap();
        let buy = ledger
            .execute_at(&TradeOrder::buy("TCS", "Tata", 2, dec!(3500.5)), at(1))
            .await
            .unwrap();

        let csv = ledger.export_transactions_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "id,date,type,symbol,quantity,price,amount");
        assert_eq!(
            lines[1],
            format!("{},2025-01-01T09:30:00+00:00,buy,TCS,2,3500.5,7001.0", buy.id)
        );
        assert_eq!(lines.len(), 2);
    }

    #[tokio::test]
    async fn json_export_matches_snapshot_shape() {
        let mut ledger = PortfolioLedger::open(MemoryStore::new()).await.unwrap();
        ledger
            .execute_at(&TradeOrder::buy("TCS", "Tata", 2, dec!(3500)), at(1))
            .await
            .unwrap();

        let json = ledger.export_transactions_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let row = &value[0];
        assert_eq!(row["symbol"], "TCS");
        assert_eq!(row["type"], "buy");
        assert_eq!(row["quantity"], 2);
        assert!(row["id"].is_string());
        assert!(row["date"].is_string());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Amount formatting
// ═══════════════════════════════════════════════════════════════════

mod formatting {
    use super::*;

    #[test]
    fn crore() {
        let f = format_amount(dec!(12345678));
        assert_eq!(f.truncated, "₹1.23Cr");
        assert_eq!(f.exact, "₹1,23,45,678.00");
    }

    #[test]
    fn lakh() {
        let f = format_amount(dec!(250000));
        assert_eq!(f.truncated, "₹2.50L");
        assert_eq!(f.exact, "₹2,50,000.00");
    }

    #[test]
    fn thousand() {
        let f = format_amount(dec!(1500));
        assert_eq!(f.truncated, "₹1.50K");
        assert_eq!(f.exact, "₹1,500.00");
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(format_amount(dec!(1000)).truncated, "₹1.00K");
        assert_eq!(format_amount(dec!(99999)).truncated, "₹100.00K");
        assert_eq!(format_amount(dec!(100000)).truncated, "₹1.00L");
        assert_eq!(format_amount(dec!(10000000)).truncated, "₹1.00Cr");
    }

    #[test]
    fn below_thousand() {
        let f = format_amount(dec!(999.99));
        assert_eq!(f.truncated, "₹999.99");
        assert_eq!(f.exact, "₹999.99");
    }

    #[test]
    fn zero() {
        let f = format_amount(Decimal::ZERO);
        assert_eq!(f.truncated, "₹0.00");
        assert_eq!(f.exact, "₹0.00");
    }

    #[test]
    fn negative_keeps_sign_in_both_forms() {
        let f = format_amount(dec!(-500));
        assert_eq!(f.truncated, "-₹500.00");
        assert_eq!(f.exact, "-₹500.00");

        let f = format_amount(dec!(-250000));
        assert_eq!(f.truncated, "-₹2.50L");
        assert_eq!(f.exact, "-₹2,50,000.00");
    }

    #[test]
    fn custom_symbol() {
        let f = format_amount_with_symbol(dec!(1234.5), "$");
        assert_eq!(f.truncated, "$1.23K");
        assert_eq!(f.exact, "$1,234.50");
    }

    #[tokio::test]
    async fn ledger_uses_configured_symbol() {
        let settings = LedgerSettings::from_json(r#"{"currency_symbol":"Rs."}"#).unwrap();
        let ledger = PortfolioLedger::open_with_settings(MemoryStore::new(), settings)
            .await
            .unwrap();
        assert_eq!(ledger.format_amount(dec!(1500)).exact, "Rs.1,500.00");
    }
}
