//! Position type: units of a commodity, optionally held at a cost.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Amount, LotCost};

/// Units held in an account, with an optional lot cost.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// The amount moved by the posting.
    pub units: Amount,
    /// The lot cost, if the posting gave one.
    pub cost: Option<LotCost>,
}

impl Position {
    /// Create a position without a cost.
    #[must_use]
    pub const fn simple(units: Amount) -> Self {
        Self { units, cost: None }
    }

    /// Create a position held at a cost.
    #[must_use]
    pub const fn with_cost(units: Amount, cost: LotCost) -> Self {
        Self {
            units,
            cost: Some(cost),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.units)?;
        if let Some(cost) = &self.cost {
            write!(f, " {cost}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_display() {
        let simple = Position::simple(Amount::new(dec!(10), "USD"));
        assert_eq!(simple.to_string(), "10 USD");

        let held = Position::with_cost(
            Amount::new(dec!(3), "HOOL"),
            LotCost::new(Amount::new(dec!(510.25), "USD")),
        );
        assert_eq!(held.to_string(), "3 HOOL {510.25 USD}");
    }
}
