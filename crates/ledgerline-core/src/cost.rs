//! Lot cost annotations.
//!
//! A [`LotCost`] records what was paid per unit for a lot, optionally with the
//! date the lot was acquired. In ledger text it is written in braces after the
//! units of a posting: `10 HOOL {500.00 USD / 2024-01-15}`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Amount;

/// The cost basis attached to a position.
///
/// # Examples
///
/// ```
/// use ledgerline_core::{Amount, LotCost};
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let cost = LotCost::new(Amount::new(dec!(150.00), "USD"))
///     .with_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
/// assert_eq!(cost.to_string(), "{150.00 USD / 2024-01-15}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LotCost {
    /// Cost per unit.
    pub cost: Amount,
    /// Acquisition date, when given.
    pub date: Option<NaiveDate>,
}

impl LotCost {
    /// Create a cost without an acquisition date.
    #[must_use]
    pub const fn new(cost: Amount) -> Self {
        Self { cost, date: None }
    }

    /// Set the acquisition date.
    #[must_use]
    pub const fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

impl fmt::Display for LotCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}", self.cost)?;
        if let Some(date) = self.date {
            write!(f, " / {date}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_display_without_date() {
        let cost = LotCost::new(Amount::new(dec!(500), "USD"));
        assert_eq!(cost.to_string(), "{500 USD}");
    }

    #[test]
    fn test_with_date() {
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let cost = LotCost::new(Amount::new(dec!(1.25), "EUR")).with_date(date);
        assert_eq!(cost.date, Some(date));
        assert_eq!(cost.to_string(), "{1.25 EUR / 2023-12-31}");
    }
}
