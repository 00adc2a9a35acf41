//! Money owned by the level.

use lane_defense_core::Money;

/// Single mutable balance credited by kills and income towers and debited by
/// placements and upgrades.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Economy {
    balance: Money,
}

impl Economy {
    pub(crate) const fn new(balance: Money) -> Self {
        Self { balance }
    }

    pub(crate) const fn balance(&self) -> Money {
        self.balance
    }

    pub(crate) fn credit(&mut self, amount: Money) {
        self.balance = self.balance.saturating_add(amount);
    }

    /// Deducts `cost` when affordable. Leaves the balance untouched otherwise.
    pub(crate) fn try_spend(&mut self, cost: Money) -> bool {
        match self.balance.checked_sub(cost) {
            Some(remaining) => {
                self.balance = remaining;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spending_is_all_or_nothing() {
        let mut economy = Economy::new(Money::new(40));
        assert!(!economy.try_spend(Money::new(50)));
        assert_eq!(economy.balance(), Money::new(40));

        assert!(economy.try_spend(Money::new(40)));
        assert_eq!(economy.balance(), Money::ZERO);
    }

    #[test]
    fn credit_accumulates() {
        let mut economy = Economy::new(Money::new(10));
        economy.credit(Money::new(30));
        economy.credit(Money::new(5));
        assert_eq!(economy.balance(), Money::new(45));
    }
}
