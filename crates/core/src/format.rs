use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Symbol used by `format_amount`.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// Magnitude tiers, largest first: crore, lakh, thousand.
const TIERS: [(Decimal, &str); 3] = [
    (dec!(10000000), "Cr"),
    (dec!(100000), "L"),
    (dec!(1000), "K"),
];

/// An amount rendered two ways for the dashboard cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedAmount {
    /// Abbreviated form, e.g. `₹1.23Cr`
    pub truncated: String,
    /// Full form with Indian digit grouping, e.g. `₹1,23,45,678.00`
    pub exact: String,
}

/// Format an amount in rupees. See `format_amount_with_symbol`.
pub fn format_amount(amount: Decimal) -> FormattedAmount {
    format_amount_with_symbol(amount, DEFAULT_CURRENCY_SYMBOL)
}

/// Format an amount with the given currency symbol.
///
/// The tier is chosen from the magnitude only; a negative amount keeps its
/// sign in front of the symbol in both forms (`-₹500.00`). The mobile app's
/// exact form put the sign after the symbol (`₹-500.00`); this one does not.
pub fn format_amount_with_symbol(amount: Decimal, symbol: &str) -> FormattedAmount {
    let sign = if amount < Decimal::ZERO { "-" } else { "" };
    let magnitude = amount.abs();

    let (divisor, suffix) = TIERS
        .iter()
        .find(|(threshold, _)| magnitude >= *threshold)
        .copied()
        .unwrap_or((Decimal::ONE, ""));

    let truncated = two_decimals(magnitude / divisor);
    let exact = group_indian(&two_decimals(magnitude));

    FormattedAmount {
        truncated: format!("{sign}{symbol}{truncated}{suffix}"),
        exact: format!("{sign}{symbol}{exact}"),
    }
}

fn two_decimals(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// `12345678.00` → `1,23,45,678.00`: the last three integer digits form one
/// group, everything before that is grouped in pairs.
fn group_indian(plain: &str) -> String {
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain, ""));

    if int_part.len() <= 3 {
        return plain.to_string();
    }

    let (head, tail) = int_part.split_at(int_part.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    let mut out = groups.join(",");
    out.push(',');
    out.push_str(tail);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}
