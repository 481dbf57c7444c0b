use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::holding::normalize_symbol;

/// Portfolio totals for the dashboard cards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Sum of `total_value` over current holdings
    pub total_value: Decimal,

    /// Realized gains across all symbols (non-negative)
    pub total_profit: Decimal,

    /// Realized losses across all symbols, as a positive amount
    pub total_loss: Decimal,

    /// Per-symbol breakdown, sorted by symbol
    pub by_symbol: Vec<SymbolPnl>,

    /// Places where the trade log and the holdings disagree
    pub discrepancies: Vec<LedgerDiscrepancy>,
}

impl PortfolioSummary {
    /// `total_profit - total_loss`
    pub fn net_realized(&self) -> Decimal {
        self.total_profit - self.total_loss
    }

    pub fn symbol(&self, symbol: &str) -> Option<&SymbolPnl> {
        let symbol = normalize_symbol(symbol);
        self.by_symbol.iter().find(|s| s.symbol == symbol)
    }

    pub fn is_consistent(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

/// Realized P&L and open FIFO position for one symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolPnl {
    pub symbol: String,
    pub realized_profit: Decimal,
    pub realized_loss: Decimal,
    /// Shares still open in the FIFO lot queue
    pub open_quantity: u64,
    /// Buy cost of the open shares
    pub open_cost: Decimal,
}

impl SymbolPnl {
    /// FIFO cost basis per open share, if any shares remain open.
    pub fn open_average_cost(&self) -> Option<Decimal> {
        if self.open_quantity == 0 {
            None
        } else {
            Some(self.open_cost / Decimal::from(self.open_quantity))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerDiscrepancy {
    pub symbol: String,
    pub kind: DiscrepancyKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscrepancyKind {
    /// A sell found no open buy lot for `quantity` shares; its proceeds were counted as profit.
    UnmatchedSell { quantity: u64 },
    /// Holding store quantity differs from the FIFO open quantity.
    HoldingMismatch { held: u64, open: u64 },
}

impl std::fmt::Display for LedgerDiscrepancy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            DiscrepancyKind::UnmatchedSell { quantity } => write!(
                f,
                "{}: sell of {} shares has no matching buy",
                self.symbol, quantity
            ),
            DiscrepancyKind::HoldingMismatch { held, open } => write!(
                f,
                "{}: holding shows {} shares but the trade log leaves {} open",
                self.symbol, held, open
            ),
        }
    }
}
