//! Per-side mana pool

use serde::{Deserialize, Serialize};

/// Mana available to one side
///
/// `max` grows by one at the start of each of the side's turns up to the
/// configured cap, and `current` is refilled to `max` at the same moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManaPool {
    pub current: u8,
    pub max: u8,
}

impl ManaPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start-of-turn accrual: grow the maximum (capped) and refill completely
    pub fn grow_and_refill(&mut self, cap: u8) {
        self.max = self.max.saturating_add(1).min(cap);
        self.current = self.max;
    }

    pub fn can_afford(&self, cost: u8) -> bool {
        self.current >= cost
    }

    /// Spend mana; returns false and leaves the pool untouched if short
    pub fn spend(&mut self, cost: u8) -> bool {
        if self.can_afford(cost) {
            self.current -= cost;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_caps() {
        let mut pool = ManaPool::new();
        let mut seen = Vec::new();
        for _ in 0..11 {
            pool.grow_and_refill(10);
            seen.push(pool.max);
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 10]);
        assert_eq!(pool.current, 10);
    }

    #[test]
    fn test_spend() {
        let mut pool = ManaPool { current: 3, max: 3 };
        assert!(!pool.spend(4));
        assert_eq!(pool.current, 3);
        assert!(pool.spend(2));
        assert_eq!(pool.current, 1);
        assert!(pool.can_afford(1));
        assert!(!pool.can_afford(2));
    }

    #[test]
    fn test_refill_is_full_not_partial() {
        let mut pool = ManaPool { current: 0, max: 4 };
        pool.grow_and_refill(10);
        assert_eq!(pool.current, 5);
        assert_eq!(pool.max, 5);
    }
}
