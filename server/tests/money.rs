//! Verifies the chip → money conversion used by the games view.

use league_server::league::money::{balance, rate, round_cents};

#[test]
fn bank_cost_sets_rate_per_chip() {
    assert_eq!(rate(Some(500.0)), Some(0.1));
    assert_eq!(balance(Some(500.0), 100), Some(10.0));
    assert_eq!(balance(Some(500.0), -250), Some(-25.0));
}

#[test]
fn missing_or_non_positive_bank_cost_is_not_applicable() {
    assert_eq!(balance(None, 100), None);
    assert_eq!(balance(Some(0.0), 100), None);
    assert_eq!(balance(Some(-50.0), 100), None);
    assert_eq!(balance(Some(f64::NAN), 100), None);
}

#[test]
fn rounds_to_cents_half_up() {
    // 50 / 5000 = 0.01 per chip
    assert_eq!(balance(Some(50.0), -1), Some(-0.01));
    assert_eq!(balance(Some(50.0), 333), Some(3.33));
    assert_eq!(round_cents(1.005_f64 + 1e-9), 1.01);
    assert_eq!(round_cents(2.344), 2.34);
    assert_eq!(round_cents(-2.346), -2.35);
}

#[test]
fn zero_diff_is_zero_money() {
    assert_eq!(balance(Some(500.0), 0), Some(0.0));
}
