//! Ledger - The adventurer's purse
//!
//! Gold is a plain counter. It is credited by completed quests and
//! debited by the pet chamber and the decoration shop. A debit either
//! succeeds in full or leaves the balance untouched.

use super::error::DomainError;

/// Cost of one meal for the companion
pub const FEED_COST: u64 = 20;

/// Cost of any chamber decoration
pub const DECORATION_COST: u64 = 50;

/// Ledger - A gold balance that never goes negative
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ledger {
    gold: u64,
}

impl Ledger {
    pub fn new(gold: u64) -> Self {
        Self { gold }
    }

    pub fn gold(&self) -> u64 {
        self.gold
    }

    pub fn can_afford(&self, amount: u64) -> bool {
        self.gold >= amount
    }

    /// Add gold (quest rewards)
    pub fn credit(&mut self, amount: u64) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Remove gold if the balance covers it
    pub fn debit(&mut self, amount: u64) -> Result<(), DomainError> {
        if !self.can_afford(amount) {
            return Err(DomainError::InsufficientFunds {
                needed: amount,
                available: self.gold,
            });
        }
        self.gold -= amount;
        Ok(())
    }
}
