use rust_decimal::{Decimal, RoundingStrategy};

pub const CURRENCY_SYMBOL: &str = "\u{20B9}";

/// Round to 2 decimal places, halves away from zero
pub fn round2(value: Decimal) -> Decimal {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

/// Fixed two-decimal display, e.g. `90.03`
pub fn format_fixed(value: Decimal) -> String {
    format!("{:.2}", round2(value))
}

/// Currency display, e.g. `₹90.03` or `₹-20.00`
pub fn format_money(value: Decimal) -> String {
    format!("{}{}", CURRENCY_SYMBOL, format_fixed(value))
}

/// Shortest display of a value as entered, e.g. `10` or `2.5`
pub fn format_plain(value: Decimal) -> String {
    value.normalize().to_string()
}
