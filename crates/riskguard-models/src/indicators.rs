//! Indicator calculation utilities.

use rust_decimal::Decimal;

/// Simple moving average over the last `period` prices.
///
/// Returns `None` when `period` is zero or there are fewer than `period`
/// prices.
pub fn calculate_sma(prices: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || prices.len() < period {
        return None;
    }
    let window = &prices[prices.len() - period..];
    let sum: Decimal = window.iter().copied().sum();
    Some(sum / Decimal::from(period))
}
