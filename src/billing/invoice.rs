//! Invoice totals and insurance coverage split.
//!
//! Amounts are integer cents, so `total == subtotal + tax` and
//! `covered + out_of_pocket == total` hold exactly.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Flat tax applied to every invoice.
pub const TAX_RATE_PERCENT: i64 = 10;

#[derive(Error, Debug, PartialEq)]
pub enum InvoiceError {
    #[error("amount must be a finite, non-negative number (got {0})")]
    InvalidAmount(f64),

    #[error("coverage must be between 0 and 100 percent (got {0})")]
    CoverageOutOfRange(f64),

    #[error("invoice total overflowed")]
    Overflow,
}

/// Non-negative money amount in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents.max(0))
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    fn checked_add(self, other: Self) -> Result<Self, InvoiceError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(InvoiceError::Overflow)
    }
}

impl TryFrom<f64> for Money {
    type Error = InvoiceError;

    /// Major units (e.g. `12.5`), rounded to the nearest cent.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value < 0.0 || value * 100.0 > i64::MAX as f64 {
            return Err(InvoiceError::InvalidAmount(value));
        }
        Ok(Self((value * 100.0).round() as i64))
    }
}

impl From<Money> for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn from(money: Money) -> Self {
        money.0 as f64 / 100.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// One billed line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub description: String,
    pub quantity: u32,
    pub rate: Money,
}

impl LineItem {
    fn amount(&self) -> Result<Money, InvoiceError> {
        self.rate
            .0
            .checked_mul(i64::from(self.quantity))
            .map(Money)
            .ok_or(InvoiceError::Overflow)
    }
}

/// Computed totals, recomputed from scratch on every edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub covered: Money,
    pub out_of_pocket: Money,
}

/// Sum line items, add tax, split the total by insurance coverage.
pub fn compute_totals(
    items: &[LineItem],
    coverage_percent: f64,
) -> Result<InvoiceTotals, InvoiceError> {
    if !(0.0..=100.0).contains(&coverage_percent) {
        return Err(InvoiceError::CoverageOutOfRange(coverage_percent));
    }

    let subtotal = items
        .iter()
        .try_fold(Money::ZERO, |acc, item| acc.checked_add(item.amount()?))?;
    let tax = percent_of(subtotal, TAX_RATE_PERCENT)?;
    let total = subtotal.checked_add(tax)?;
    let covered = coverage_of(total, coverage_percent);
    let out_of_pocket = Money(total.0 - covered.0);

    Ok(InvoiceTotals {
        subtotal,
        tax,
        total,
        covered,
        out_of_pocket,
    })
}

/// Integer percentage, rounded half-up to the cent.
fn percent_of(amount: Money, percent: i64) -> Result<Money, InvoiceError> {
    amount
        .0
        .checked_mul(percent)
        .and_then(|scaled| scaled.checked_add(50))
        .map(|scaled| Money(scaled / 100))
        .ok_or(InvoiceError::Overflow)
}

/// Fractional coverage percentage; never exceeds `total`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn coverage_of(total: Money, percent: f64) -> Money {
    let covered = (total.0 as f64 * percent / 100.0).round() as i64;
    Money(covered.clamp(0, total.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: u32, rate: f64) -> LineItem {
        LineItem {
            description: String::new(),
            quantity,
            rate: Money::try_from(rate).unwrap(),
        }
    }

    #[test]
    fn two_line_example() {
        let totals = compute_totals(&[item(2, 100.0), item(1, 50.0)], 0.0).unwrap();
        assert_eq!(totals.subtotal.to_string(), "250.00");
        assert_eq!(totals.tax.to_string(), "25.00");
        assert_eq!(totals.total.to_string(), "275.00");
        assert_eq!(totals.covered, Money::ZERO);
        assert_eq!(totals.out_of_pocket, totals.total);
    }

    #[test]
    fn empty_invoice_is_zero() {
        let totals = compute_totals(&[], 80.0).unwrap();
        assert_eq!(totals.total, Money::ZERO);
        assert_eq!(totals.covered, Money::ZERO);
    }

    #[test]
    fn totals_hold_across_quantities_and_rates() {
        for quantity in [0_u32, 1, 3, 7, 250] {
            for cents in [0_i64, 1, 5, 99, 1_234, 100_001] {
                let items = [LineItem {
                    description: "x".into(),
                    quantity,
                    rate: Money::from_cents(cents),
                }];
                let t = compute_totals(&items, 0.0).unwrap();
                assert_eq!(t.subtotal.cents(), i64::from(quantity) * cents);
                assert_eq!(t.tax.cents(), (t.subtotal.cents() * 10 + 50) / 100);
                assert_eq!(t.total.cents(), t.subtotal.cents() + t.tax.cents());
            }
        }
    }

    #[test]
    fn coverage_split_always_sums_to_total() {
        let items = [item(3, 33.33), item(1, 0.07)];
        for step in 0..=200 {
            let percent = f64::from(step) / 2.0;
            let t = compute_totals(&items, percent).unwrap();
            assert_eq!(t.covered.cents() + t.out_of_pocket.cents(), t.total.cents());
        }
    }

    #[test]
    fn full_and_partial_coverage() {
        let items = [item(2, 100.0), item(1, 50.0)];
        let full = compute_totals(&items, 100.0).unwrap();
        assert_eq!(full.covered, full.total);
        assert_eq!(full.out_of_pocket, Money::ZERO);

        let eighty = compute_totals(&items, 80.0).unwrap();
        assert_eq!(eighty.covered.to_string(), "220.00");
        assert_eq!(eighty.out_of_pocket.to_string(), "55.00");
    }

    #[test]
    fn coverage_outside_range_is_rejected() {
        assert_eq!(
            compute_totals(&[], 100.5),
            Err(InvoiceError::CoverageOutOfRange(100.5))
        );
        assert!(compute_totals(&[], -1.0).is_err());
        assert!(compute_totals(&[], f64::NAN).is_err());
    }

    #[test]
    fn negative_rates_do_not_parse() {
        let err = serde_json::from_str::<LineItem>(r#"{"quantity": 1, "rate": -5}"#);
        assert!(err.is_err());
        let ok: LineItem = serde_json::from_str(r#"{"quantity": 2, "rate": 12.346}"#).unwrap();
        assert_eq!(ok.rate.cents(), 1235);
    }
}
