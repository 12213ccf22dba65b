//! Guildmaster - The rules engine of the guild
//!
//! The Guildmaster is like a Game Master in a TRPG:
//! 1. Check: Is the action allowed (enough gold, not owned yet)?
//! 2. Apply: Mutate the quests, the ledger and the companion together
//! 3. Announce: Report what happened as a [`GuildEvent`]
//!
//! This is pure domain logic - no I/O, no async, no external dependencies.
//! Every action either applies completely or leaves the state untouched.

use crate::model::companion::{Companion, Growth};
use crate::model::decoration::Decoration;
use crate::model::error::DomainError;
use crate::model::ledger::FEED_COST;
use crate::model::quest::{Completion, Quest, QuestId};
use crate::model::state::GuildState;

/// Events emitted by the Guildmaster
///
/// These are used for logging and for the guildmaster's notifications.
/// The Guildmaster itself doesn't "do" anything with these -
/// it just reports what happened.
#[derive(Debug, Clone, PartialEq)]
pub enum GuildEvent {
    /// A quest was pinned to the board
    QuestPosted { quest_id: String, title: String },
    /// Several quests were pinned at once
    QuestsPosted { count: usize },
    /// A quest was completed and its reward paid out
    QuestCompleted {
        quest_id: String,
        reward: u32,
        gold: u64,
        growth: Growth,
    },
    /// A quest was taken off the board
    QuestRemoved { quest_id: String },
    /// The companion was fed
    CompanionFed { gold: u64 },
    /// The companion was played with
    CompanionPlayed,
    /// A decoration was bought
    DecorationBought { decoration: Decoration, gold: u64 },
    /// The companion decayed by one tick
    Decayed { hunger: f64, happiness: f64 },
}

impl GuildEvent {
    /// What the guildmaster says about it, if anything
    pub fn message(&self) -> Option<String> {
        let message = match self {
            GuildEvent::QuestPosted { .. } => "A new quest has been posted!".to_string(),
            GuildEvent::QuestsPosted { count } => {
                format!("{} quests added to the board!", count)
            }
            GuildEvent::QuestCompleted { growth, .. } => {
                if growth.leveled_up() {
                    "Quest complete! Your companion grows stronger!".to_string()
                } else {
                    "Well done, adventurer! Gold earned!".to_string()
                }
            }
            GuildEvent::QuestRemoved { .. } => "Quest removed from board!".to_string(),
            GuildEvent::CompanionFed { .. } => "Your companion is well fed!".to_string(),
            GuildEvent::CompanionPlayed => "Your companion enjoyed that!".to_string(),
            GuildEvent::DecorationBought { .. } => "Chamber decorated beautifully!".to_string(),
            GuildEvent::Decayed { .. } => return None,
        };
        Some(message)
    }
}

/// Guildmaster - The rules engine
///
/// This is a domain service. It's stateless - all state lives in the
/// [`GuildState`] it is handed.
#[derive(Debug, Clone, Copy)]
pub struct Guildmaster;

impl Guildmaster {
    /// Create a new Guildmaster
    pub fn new() -> Self {
        Self
    }

    // ========== Quests ==========

    /// Pin a stored quest to the board
    pub fn post_quest(&self, state: &mut GuildState, quest: Quest) -> GuildEvent {
        let event = GuildEvent::QuestPosted {
            quest_id: quest.id().to_string(),
            title: quest.title().to_string(),
        };
        state.board.upsert(quest);
        event
    }

    /// Pin a batch of stored quests to the board
    pub fn post_quests(&self, state: &mut GuildState, quests: Vec<Quest>) -> GuildEvent {
        let count = quests.len();
        state.board.merge(quests);
        GuildEvent::QuestsPosted { count }
    }

    /// Complete a quest: flip it, pay the reward, reward the companion
    ///
    /// Returns `None` (and changes nothing) if the quest is unknown or
    /// already completed, so completing twice never pays twice.
    pub fn complete_quest(&self, state: &mut GuildState, id: &QuestId) -> Option<GuildEvent> {
        let quest = match state.board.complete(id) {
            Completion::Completed(quest) => quest,
            Completion::Unchanged => return None,
        };

        state.ledger.credit(u64::from(quest.reward()));
        let growth = state.companion.reward();

        Some(GuildEvent::QuestCompleted {
            quest_id: quest.id().to_string(),
            reward: quest.reward(),
            gold: state.ledger.gold(),
            growth,
        })
    }

    /// Pay out a completion the guild hall already confirmed
    ///
    /// The hall's quest record and companion replace ours; the companion
    /// grew if the hall reports a higher level than we had. Returns `None`
    /// (and changes nothing) if the quest was not pending here.
    pub fn confirm_completion(
        &self,
        state: &mut GuildState,
        confirmed: Quest,
        companion: Companion,
    ) -> Option<GuildEvent> {
        let quest = match state.board.complete(confirmed.id()) {
            Completion::Completed(quest) => quest,
            Completion::Unchanged => return None,
        };

        state.ledger.credit(u64::from(quest.reward()));
        let growth = if companion.level() > state.companion.level() {
            Growth::LeveledUp {
                level: companion.level(),
            }
        } else {
            Growth::Steady
        };
        state.companion = companion;
        state.board.upsert(confirmed);

        Some(GuildEvent::QuestCompleted {
            quest_id: quest.id().to_string(),
            reward: quest.reward(),
            gold: state.ledger.gold(),
            growth,
        })
    }

    /// Remove a quest; `None` if it was not on the board
    pub fn remove_quest(&self, state: &mut GuildState, id: &QuestId) -> Option<GuildEvent> {
        state.board.delete(id).then(|| GuildEvent::QuestRemoved {
            quest_id: id.to_string(),
        })
    }

    // ========== Companion ==========

    /// Check that the adventurer can pay for a meal
    pub fn check_feed(&self, state: &GuildState) -> Result<(), DomainError> {
        if !state.ledger.can_afford(FEED_COST) {
            return Err(DomainError::InsufficientFunds {
                needed: FEED_COST,
                available: state.ledger.gold(),
            });
        }
        Ok(())
    }

    /// Pay for a meal and feed the companion
    pub fn feed(&self, state: &mut GuildState) -> Result<GuildEvent, DomainError> {
        state.ledger.debit(FEED_COST)?;
        state.companion.feed();
        Ok(GuildEvent::CompanionFed {
            gold: state.ledger.gold(),
        })
    }

    /// Pay for a meal the guild hall already served
    ///
    /// The hall's companion replaces ours as-is.
    pub fn confirm_feed(
        &self,
        state: &mut GuildState,
        fed: Companion,
    ) -> Result<GuildEvent, DomainError> {
        state.ledger.debit(FEED_COST)?;
        state.companion = fed;
        Ok(GuildEvent::CompanionFed {
            gold: state.ledger.gold(),
        })
    }

    /// Play with the companion (free)
    pub fn play(&self, state: &mut GuildState) -> GuildEvent {
        state.companion.play();
        GuildEvent::CompanionPlayed
    }

    /// Adopt the companion the guild hall returned after playing
    pub fn confirm_play(&self, state: &mut GuildState, played: Companion) -> GuildEvent {
        state.companion = played;
        GuildEvent::CompanionPlayed
    }

    /// One decay tick
    pub fn decay(&self, state: &mut GuildState) -> GuildEvent {
        state.companion.decay();
        GuildEvent::Decayed {
            hunger: state.companion.hunger(),
            happiness: state.companion.happiness(),
        }
    }

    // ========== Chamber ==========

    /// Check that a decoration can be bought
    pub fn check_purchase(
        &self,
        state: &GuildState,
        decoration: Decoration,
    ) -> Result<(), DomainError> {
        state.inventory.check_purchase(decoration, &state.ledger)
    }

    /// Buy a decoration for the chamber
    pub fn buy_decoration(
        &self,
        state: &mut GuildState,
        decoration: Decoration,
    ) -> Result<GuildEvent, DomainError> {
        state.inventory.purchase(decoration, &mut state.ledger)?;
        Ok(GuildEvent::DecorationBought {
            decoration,
            gold: state.ledger.gold(),
        })
    }
}

impl Default for Guildmaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::quest::{parse_bulk, QuestDraft, Timestamp};

    fn post(state: &mut GuildState, id: &str, reward: u32) -> QuestId {
        let quest = Quest::new(
            QuestId::new(id),
            QuestDraft::new(format!("Quest {}", id), "", reward).unwrap(),
            Timestamp::from_millis(0),
        );
        Guildmaster::new().post_quest(state, quest);
        QuestId::new(id)
    }

    #[test]
    fn test_complete_pays_reward() {
        let gm = Guildmaster::new();
        let mut state = GuildState::new();
        let id = post(&mut state, "q-1", 15);

        let event = gm.complete_quest(&mut state, &id).unwrap();

        assert_eq!(state.gold(), 15);
        assert_eq!(state.companion.exp(), 10);
        assert!(matches!(
            event,
            GuildEvent::QuestCompleted { reward: 15, gold: 15, growth: Growth::Steady, .. }
        ));
        assert_eq!(
            event.message().unwrap(),
            "Well done, adventurer! Gold earned!"
        );
    }

    #[test]
    fn test_complete_twice_pays_once() {
        let gm = Guildmaster::new();
        let mut state = GuildState::new();
        let id = post(&mut state, "q-1", 15);

        assert!(gm.complete_quest(&mut state, &id).is_some());
        assert!(gm.complete_quest(&mut state, &id).is_none());

        assert_eq!(state.gold(), 15);
        assert_eq!(state.companion.exp(), 10);
    }

    #[test]
    fn test_complete_unknown_changes_nothing() {
        let gm = Guildmaster::new();
        let mut state = GuildState::new().with_gold(5);

        assert!(gm.complete_quest(&mut state, &QuestId::new("nope")).is_none());
        assert_eq!(state.gold(), 5);
        assert_eq!(state.companion, Companion::default());
    }

    #[test]
    fn test_complete_crossing_level_boundary() {
        let gm = Guildmaster::new();
        let mut state = GuildState::new();
        state.companion = Companion::restore("dragon", 1, 95, 100.0, 100.0);
        let id = post(&mut state, "q-1", 15);

        let event = gm.complete_quest(&mut state, &id).unwrap();

        assert_eq!(state.gold(), 15);
        assert_eq!(state.companion.level(), 2);
        assert_eq!(state.companion.exp(), 0);
        assert_eq!(
            event.message().unwrap(),
            "Quest complete! Your companion grows stronger!"
        );
    }

    #[test]
    fn test_confirm_completion_adopts_hall_companion() {
        let gm = Guildmaster::new();
        let mut state = GuildState::new();
        state.companion = Companion::restore("dragon", 1, 95, 60.0, 60.0);
        let id = post(&mut state, "q-1", 15);
        let mut hall = state.clone();
        gm.complete_quest(&mut hall, &id).unwrap();
        let confirmed = hall.board.get(&id).cloned().unwrap();

        let event = gm
            .confirm_completion(&mut state, confirmed.clone(), hall.companion.clone())
            .unwrap();

        assert_eq!(state.gold(), 15);
        assert_eq!(state.companion, hall.companion);
        assert!(state.board.get(&id).unwrap().is_completed());
        assert_eq!(
            event.message().unwrap(),
            "Quest complete! Your companion grows stronger!"
        );
        assert!(gm
            .confirm_completion(&mut state, confirmed, hall.companion.clone())
            .is_none());
        assert_eq!(state.gold(), 15);
    }

    #[test]
    fn test_confirm_completion_without_level_up() {
        let gm = Guildmaster::new();
        let mut state = GuildState::new();
        let id = post(&mut state, "q-1", 10);
        let confirmed = state.board.get(&id).cloned().unwrap();

        let event = gm
            .confirm_completion(&mut state, confirmed, Companion::restore("dragon", 1, 10, 80.0, 80.0))
            .unwrap();

        assert_eq!(event.message().unwrap(), "Well done, adventurer! Gold earned!");
        assert_eq!(state.companion.exp(), 10);
    }

    #[test]
    fn test_feed_insufficient_gold() {
        let gm = Guildmaster::new();
        let mut state = GuildState::new().with_gold(10);
        state.companion = Companion::restore("dragon", 1, 0, 40.0, 40.0);
        let before = state.companion.clone();

        assert!(gm.check_feed(&state).is_err());
        let result = gm.feed(&mut state);

        assert_eq!(
            result,
            Err(DomainError::InsufficientFunds {
                needed: 20,
                available: 10
            })
        );
        assert_eq!(state.gold(), 10);
        assert_eq!(state.companion, before);
    }

    #[test]
    fn test_feed_and_play() {
        let gm = Guildmaster::new();
        let mut state = GuildState::new().with_gold(25);
        state.companion = Companion::restore("dragon", 1, 0, 40.0, 40.0);

        gm.feed(&mut state).unwrap();
        assert_eq!(state.gold(), 5);
        assert_eq!(state.companion.hunger(), 70.0);
        assert_eq!(state.companion.happiness(), 50.0);

        gm.play(&mut state);
        assert_eq!(state.companion.hunger(), 65.0);
        assert_eq!(state.companion.happiness(), 70.0);
        assert_eq!(state.gold(), 5);
    }

    #[test]
    fn test_confirm_feed_adopts_companion() {
        let gm = Guildmaster::new();
        let mut state = GuildState::new().with_gold(30);
        let served = Companion::restore("dragon", 3, 12, 90.0, 80.0);

        gm.confirm_feed(&mut state, served.clone()).unwrap();

        assert_eq!(state.gold(), 10);
        assert_eq!(state.companion, served);
    }

    #[test]
    fn test_gold_never_negative() {
        let gm = Guildmaster::new();
        let mut state = GuildState::new().with_gold(95);

        for decoration in Decoration::ALL {
            let _ = gm.feed(&mut state);
            let _ = gm.buy_decoration(&mut state, decoration);
        }

        // 95 -> feed 75 -> torch 25 -> feed 5 -> nothing else affordable
        assert_eq!(state.gold(), 5);
        assert_eq!(state.inventory.len(), 1);
    }

    #[test]
    fn test_bulk_then_complete_all() {
        let gm = Guildmaster::new();
        let mut state = GuildState::new();

        let quests: Vec<Quest> = parse_bulk("1. Wash dishes\n2. Pay rent\n")
            .into_iter()
            .enumerate()
            .map(|(i, draft)| {
                Quest::new(QuestId::new(format!("b-{}", i)), draft, Timestamp::from_millis(0))
            })
            .collect();

        let event = gm.post_quests(&mut state, quests);
        assert_eq!(event.message().unwrap(), "2 quests added to the board!");
        assert_eq!(state.board.pending_count(), 2);

        gm.complete_quest(&mut state, &QuestId::new("b-0"));
        gm.complete_quest(&mut state, &QuestId::new("b-1"));
        assert_eq!(state.gold(), 20);
        assert_eq!(state.board.completed_count(), 2);
    }

    #[test]
    fn test_decay_event_is_silent() {
        let gm = Guildmaster::new();
        let mut state = GuildState::new();

        let event = gm.decay(&mut state);

        assert!(event.message().is_none());
        assert_eq!(state.companion.hunger(), 99.0);
    }

    #[test]
    fn test_remove_quest() {
        let gm = Guildmaster::new();
        let mut state = GuildState::new();
        let id = post(&mut state, "q-1", 10);

        assert!(gm.remove_quest(&mut state, &id).is_some());
        assert!(gm.remove_quest(&mut state, &id).is_none());
        assert!(state.board.is_empty());
    }
}
