use std::collections::BTreeMap;

use log::warn;
use rust_decimal::Decimal;

use crate::models::lot::LotQueue;
use crate::models::portfolio::Portfolio;
use crate::models::summary::{DiscrepancyKind, LedgerDiscrepancy, PortfolioSummary, SymbolPnl};
use crate::models::transaction::TransactionType;

/// Derives realized profit/loss and portfolio totals from the ledger.
///
/// No I/O and no caching. Every call replays the whole
/// trade log, so the result always reflects the current state.
pub struct PnlService;

impl PnlService {
    pub fn new() -> Self {
        Self
    }

    /// Compute the dashboard summary.
    ///
    /// Sells are matched against buy lots of the same symbol oldest-first
    /// (FIFO). A sell with no lot left to match is not an error: its proceeds
    /// count as profit and the gap is reported in `discrepancies`. Totals
    /// saturate at `Decimal::MAX` instead of overflowing.
    pub fn compute_summary(&self, portfolio: &Portfolio) -> PortfolioSummary {
        let mut books: BTreeMap<&str, (LotQueue, SymbolPnl)> = BTreeMap::new();
        let mut discrepancies = Vec::new();

        for tx in portfolio.transactions.chronological() {
            let (queue, pnl) = books.entry(tx.symbol.as_str()).or_insert_with(|| {
                (
                    LotQueue::new(),
                    SymbolPnl {
                        symbol: tx.symbol.clone(),
                        ..SymbolPnl::default()
                    },
                )
            });

            match tx.transaction_type {
                TransactionType::Buy => queue.push(tx.quantity, tx.price),
                TransactionType::Sell => {
                    let matched = queue.consume(tx.quantity, tx.price);
                    pnl.realized_profit = pnl.realized_profit.saturating_add(matched.profit);
                    pnl.realized_loss = pnl.realized_loss.saturating_add(matched.loss);

                    if matched.unmatched > 0 {
                        warn!(
                            "Sell of {} {} on {} has {} shares without a matching buy",
                            tx.quantity, tx.symbol, tx.date, matched.unmatched
                        );
                        let proceeds = tx.price.saturating_mul(Decimal::from(matched.unmatched));
                        pnl.realized_profit = pnl.realized_profit.saturating_add(proceeds);
                        discrepancies.push(LedgerDiscrepancy {
                            symbol: tx.symbol.clone(),
                            kind: DiscrepancyKind::UnmatchedSell {
                                quantity: matched.unmatched,
                            },
                        });
                    }
                }
            }
        }

        let mut by_symbol = Vec::with_capacity(books.len());
        let mut total_profit = Decimal::ZERO;
        let mut total_loss = Decimal::ZERO;
        for (queue, mut pnl) in books.into_values() {
            pnl.open_quantity = queue.open_quantity();
            pnl.open_cost = queue.open_cost();
            total_profit = total_profit.saturating_add(pnl.realized_profit);
            total_loss = total_loss.saturating_add(pnl.realized_loss);
            by_symbol.push(pnl);
        }

        discrepancies.extend(Self::holding_mismatches(portfolio, &by_symbol));

        PortfolioSummary {
            total_value: portfolio.holdings.total_value(),
            total_profit,
            total_loss,
            by_symbol,
            discrepancies,
        }
    }

    /// Compare held quantities against what the trade log leaves open.
    fn holding_mismatches(portfolio: &Portfolio, by_symbol: &[SymbolPnl]) -> Vec<LedgerDiscrepancy> {
        let mut open: BTreeMap<&str, u64> = by_symbol
            .iter()
            .map(|p| (p.symbol.as_str(), p.open_quantity))
            .collect();
        let mut held: BTreeMap<&str, u64> = BTreeMap::new();
        for holding in portfolio.holdings.iter() {
            held.insert(holding.symbol.as_str(), holding.quantity);
            open.entry(holding.symbol.as_str()).or_insert(0);
        }

        let mut mismatches = Vec::new();
        for (symbol, open_quantity) in open {
            let held_quantity = held.get(symbol).copied().unwrap_or(0);
            if held_quantity != open_quantity {
                warn!(
                    "{symbol}: holding has {held_quantity} shares, trade log leaves {open_quantity} open"
                );
                mismatches.push(LedgerDiscrepancy {
                    symbol: symbol.to_string(),
                    kind: DiscrepancyKind::HoldingMismatch {
                        held: held_quantity,
                        open: open_quantity,
                    },
                });
            }
        }
        mismatches
    }
}

impl Default for PnlService {
    fn default() -> Self {
        Self::new()
    }
}
