//! Quest - A task posted on the guild board
//!
//! A Quest is an Entity (has identity that persists through changes).
//! Its only transition is completion, which is one-way: a completed
//! quest is never reopened.

use super::error::DomainError;

/// Gold paid by a quest when no usable reward was given
pub const DEFAULT_REWARD: u32 = 10;

/// Unique identifier for a Quest
///
/// Opaque: assigned by whoever stores the quest (the guild hall or the
/// local backend), never interpreted by the domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuestId(String);

impl QuestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for QuestId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Milliseconds since the Unix epoch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// Current wall-clock time
    pub fn now() -> Self {
        let millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default();
        Self(millis)
    }
}

/// A validated request to post a quest
///
/// Drafts carry everything except identity and creation time,
/// which are assigned when the quest is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestDraft {
    title: String,
    description: String,
    reward: u32,
}

impl QuestDraft {
    /// Create a draft; the title must contain something besides whitespace
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        reward: u32,
    ) -> Result<Self, DomainError> {
        let title = title.into();
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("title", "quest title cannot be empty"));
        }

        Ok(Self {
            title: title.to_string(),
            description: description.into(),
            reward,
        })
    }

    /// Create a draft from raw form input, falling back to the default reward
    pub fn with_reward_input(
        title: impl Into<String>,
        description: impl Into<String>,
        reward_input: &str,
    ) -> Result<Self, DomainError> {
        Self::new(title, description, parse_reward(reward_input))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn reward(&self) -> u32 {
        self.reward
    }
}

/// Parse a reward, using [`DEFAULT_REWARD`] for anything that is not a
/// non-negative integer
pub fn parse_reward(input: &str) -> u32 {
    input.trim().parse::<u32>().unwrap_or(DEFAULT_REWARD)
}

/// Turn a pasted list into drafts, one per non-blank line
///
/// A leading `12.` numbering prefix is stripped from each line. Every
/// draft gets the default reward and an empty description.
pub fn parse_bulk(text: &str) -> Vec<QuestDraft> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| QuestDraft::new(strip_numbering(line), "", DEFAULT_REWARD).ok())
        .collect()
}

fn strip_numbering(line: &str) -> &str {
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return line;
    }

    match line[digits..].strip_prefix('.') {
        Some(rest) if !rest.trim().is_empty() => rest.trim(),
        _ => line,
    }
}

/// Quest - An entry on the board
#[derive(Debug, Clone)]
pub struct Quest {
    id: QuestId,
    title: String,
    description: String,
    reward: u32,
    completed: bool,
    created_at: Timestamp,
}

impl Quest {
    /// Store a draft under the given identity
    pub fn new(id: QuestId, draft: QuestDraft, created_at: Timestamp) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            reward: draft.reward,
            completed: false,
            created_at,
        }
    }

    /// Rebuild a quest that was persisted elsewhere
    pub fn restore(
        id: QuestId,
        title: impl Into<String>,
        description: impl Into<String>,
        reward: u32,
        completed: bool,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            reward,
            completed,
            created_at,
        }
    }

    // ========== Getters ==========

    pub fn id(&self) -> &QuestId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn reward(&self) -> u32 {
        self.reward
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    // ========== State Transitions ==========

    /// Mark as completed. Returns false if it already was.
    fn complete(&mut self) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        true
    }
}

impl PartialEq for Quest {
    fn eq(&self, other: &Self) -> bool {
        // Entity equality: same ID = same entity
        self.id == other.id
    }
}

impl Eq for Quest {}

/// Outcome of completing a quest on the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The quest flipped to completed; carries the updated record
    Completed(Quest),
    /// Unknown id or already completed
    Unchanged,
}

/// QuestBoard - The ordered collection of quests
#[derive(Debug, Clone, Default)]
pub struct QuestBoard {
    quests: Vec<Quest>,
}

impl QuestBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_quests(quests: impl IntoIterator<Item = Quest>) -> Self {
        let mut board = Self::new();
        board.merge(quests);
        board
    }

    /// Add a quest, or replace the stored record with the same id
    pub fn upsert(&mut self, quest: Quest) {
        match self.quests.iter_mut().find(|q| q.id == quest.id) {
            Some(existing) => *existing = quest,
            None => self.quests.push(quest),
        }
    }

    /// Upsert every quest, keeping board order for known ids
    pub fn merge(&mut self, quests: impl IntoIterator<Item = Quest>) {
        for quest in quests {
            self.upsert(quest);
        }
    }

    pub fn get(&self, id: &QuestId) -> Option<&Quest> {
        self.quests.iter().find(|q| &q.id == id)
    }

    /// Complete a quest; a no-op for unknown or completed quests
    pub fn complete(&mut self, id: &QuestId) -> Completion {
        match self.quests.iter_mut().find(|q| &q.id == id) {
            Some(quest) => {
                if quest.complete() {
                    Completion::Completed(quest.clone())
                } else {
                    Completion::Unchanged
                }
            }
            None => Completion::Unchanged,
        }
    }

    /// Remove a quest permanently. Returns whether anything was removed.
    pub fn delete(&mut self, id: &QuestId) -> bool {
        let before = self.quests.len();
        self.quests.retain(|q| &q.id != id);
        self.quests.len() != before
    }

    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.quests.iter().filter(|q| !q.completed).count()
    }

    pub fn completed_count(&self) -> usize {
        self.quests.iter().filter(|q| q.completed).count()
    }
}
