//! Chip → money conversion for the games view. Display-only; nothing here is
//! ever stored.

/// Chips in a game's bank; `bank_cost` buys this many.
pub const CHIPS_PER_BANK: f64 = 5000.0;

/// Money per chip, or `None` when the game has no usable bank cost.
pub fn rate(bank_cost: Option<f64>) -> Option<f64> {
    bank_cost
        .filter(|c| c.is_finite() && *c > 0.0)
        .map(|c| c / CHIPS_PER_BANK)
}

/// Money won or lost for a chip delta, rounded to cents (half-up).
pub fn balance(bank_cost: Option<f64>, chips_diff: i64) -> Option<f64> {
    rate(bank_cost).map(|r| round_cents(chips_diff as f64 * r))
}

/// Round to two decimals with halves going toward +∞.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0 + 0.5).floor() / 100.0
}
