use std::collections::VecDeque;

use rust_decimal::Decimal;

/// Unsold remainder of one buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenLot {
    pub remaining: u64,
    pub price: Decimal,
}

/// Result of matching one sell against the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LotMatch {
    /// Sum of positive per-lot gains
    pub profit: Decimal,
    /// Sum of absolute per-lot losses (break-even lots contribute zero)
    pub loss: Decimal,
    /// Shares that found no open lot
    pub unmatched: u64,
}

/// FIFO queue of open buy lots for a single symbol.
///
/// Buys push to the back; sells consume from the front, oldest lot first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LotQueue {
    lots: VecDeque<OpenLot>,
}

impl LotQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, quantity: u64, price: Decimal) {
        if quantity > 0 {
            self.lots.push_back(OpenLot {
                remaining: quantity,
                price,
            });
        }
    }

    /// Match `quantity` shares sold at `sell_price` against the oldest lots.
    ///
    /// Each matched slice contributes `(sell_price - lot.price) * matched`
    /// to profit when positive, otherwise its absolute value to loss. Lots are
    /// popped once exhausted. Anything left when the queue runs dry is
    /// reported in `unmatched`. Amounts saturate at `Decimal::MAX`.
    pub fn consume(&mut self, quantity: u64, sell_price: Decimal) -> LotMatch {
        let mut result = LotMatch::default();
        let mut outstanding = quantity;

        while outstanding > 0 {
            let Some(lot) = self.lots.front_mut() else {
                break;
            };

            let matched = outstanding.min(lot.remaining);
            let pnl = sell_price
                .saturating_sub(lot.price)
                .saturating_mul(Decimal::from(matched));
            if pnl > Decimal::ZERO {
                result.profit = result.profit.saturating_add(pnl);
            } else {
                result.loss = result.loss.saturating_add(pnl.abs());
            }

            lot.remaining -= matched;
            outstanding -= matched;

            if lot.remaining == 0 {
                self.lots.pop_front();
            }
        }

        result.unmatched = outstanding;
        result
    }

    /// Shares still open across all lots.
    pub fn open_quantity(&self) -> u64 {
        self.lots.iter().map(|l| l.remaining).sum()
    }

    /// Cost of the open shares at their buy prices.
    pub fn open_cost(&self) -> Decimal {
        self.lots.iter().fold(Decimal::ZERO, |acc, l| {
            acc.saturating_add(l.price.saturating_mul(Decimal::from(l.remaining)))
        })
    }

    pub fn lots(&self) -> impl Iterator<Item = &OpenLot> {
        self.lots.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }
}
