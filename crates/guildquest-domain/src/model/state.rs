//! GuildState - Everything one adventurer owns during a session
//!
//! The state is an explicit value owned by the session, never a global.

use super::companion::Companion;
use super::decoration::Inventory;
use super::ledger::Ledger;
use super::quest::QuestBoard;

/// The session context: quests, gold, companion and chamber
#[derive(Debug, Clone, Default)]
pub struct GuildState {
    pub board: QuestBoard,
    pub ledger: Ledger,
    pub companion: Companion,
    pub inventory: Inventory,
}

impl GuildState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: start with a gold balance
    pub fn with_gold(mut self, gold: u64) -> Self {
        self.ledger = Ledger::new(gold);
        self
    }

    pub fn gold(&self) -> u64 {
        self.ledger.gold()
    }
}
