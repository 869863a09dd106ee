//! Monetary amounts.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// An amount in the catalog's currency unit.
///
/// Catalog prices are whole units, so all arithmetic is exact integer
/// arithmetic; overflow is reported instead of wrapping.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    pub const fn amount(self) -> u64 {
        self.0
    }

    /// Price of `quantity` units at `self` each.
    pub fn times(self, quantity: u32) -> DomainResult<Money> {
        self.0
            .checked_mul(u64::from(quantity))
            .map(Money)
            .ok_or_else(|| DomainError::invariant("price overflow"))
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for Money {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn times_multiplies_exactly() {
        assert_eq!(Money::new(120).times(2).unwrap(), Money::new(240));
        assert_eq!(Money::new(120).to_string(), "120");
    }

    #[test]
    fn overflow_is_an_invariant_violation() {
        let err = Money::new(u64::MAX).times(2).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    proptest! {
        #[test]
        fn times_matches_integer_multiplication(unit in 0u64..1_000_000_000, qty in 1u32..=10) {
            let total = Money::new(unit).times(qty).unwrap();
            prop_assert_eq!(total.amount(), unit * u64::from(qty));
        }
    }
}
