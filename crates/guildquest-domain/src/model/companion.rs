//! Companion - The adventurer's pet
//!
//! The companion has two continuous stats (hunger, happiness) kept in
//! `[0, 100]` and a discrete level fed by experience. Experience always
//! stays below `level * 100`: reaching the threshold levels the
//! companion up and resets experience to zero.
//!
//! Only one level is gained per reward, even if experience overshoots
//! the threshold by more than a level's worth.

/// Companion kind used when none is known
pub const DEFAULT_KIND: &str = "dragon";

/// Upper bound for hunger and happiness
pub const STAT_MAX: f64 = 100.0;

/// Experience needed per level (threshold is `level * EXP_PER_LEVEL`)
pub const EXP_PER_LEVEL: u32 = 100;

/// Experience granted by a completed quest
pub const QUEST_EXP: u32 = 10;

/// Whether a reward pushed the companion over a level threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Growth {
    Steady,
    LeveledUp { level: u32 },
}

impl Growth {
    pub fn leveled_up(&self) -> bool {
        matches!(self, Growth::LeveledUp { .. })
    }
}

/// Companion - The virtual pet
#[derive(Debug, Clone, PartialEq)]
pub struct Companion {
    kind: String,
    level: u32,
    exp: u32,
    hunger: f64,
    happiness: f64,
}

impl Default for Companion {
    fn default() -> Self {
        Self {
            kind: DEFAULT_KIND.to_string(),
            level: 1,
            exp: 0,
            hunger: STAT_MAX,
            happiness: STAT_MAX,
        }
    }
}

impl Companion {
    /// A fresh companion of the given kind
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Rebuild a companion from stored values, repairing anything that
    /// breaks the invariants
    pub fn restore(
        kind: impl Into<String>,
        level: u32,
        exp: u32,
        hunger: f64,
        happiness: f64,
    ) -> Self {
        let kind = kind.into();
        let mut companion = Self {
            kind: if kind.is_empty() {
                DEFAULT_KIND.to_string()
            } else {
                kind
            },
            level: level.max(1),
            exp,
            hunger: clamp_stat(hunger),
            happiness: clamp_stat(happiness),
        };
        companion.check_level_up();
        companion
    }

    // ========== Getters ==========

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn exp(&self) -> u32 {
        self.exp
    }

    pub fn hunger(&self) -> f64 {
        self.hunger
    }

    pub fn happiness(&self) -> f64 {
        self.happiness
    }

    /// Experience needed to reach the next level
    pub fn exp_to_next_level(&self) -> u32 {
        self.level.saturating_mul(EXP_PER_LEVEL)
    }

    // ========== Transitions ==========

    /// One decay tick: the companion gets a little hungrier and sadder
    pub fn decay(&mut self) {
        self.hunger = clamp_stat(self.hunger - 1.0);
        self.happiness = clamp_stat(self.happiness - 0.5);
    }

    /// A meal. The caller must have paid for it.
    pub fn feed(&mut self) {
        self.hunger = clamp_stat(self.hunger + 30.0);
        self.happiness = clamp_stat(self.happiness + 10.0);
    }

    /// Free play: happier, slightly hungrier
    pub fn play(&mut self) {
        self.happiness = clamp_stat(self.happiness + 20.0);
        self.hunger = clamp_stat(self.hunger - 5.0);
    }

    /// Share in a completed quest
    pub fn reward(&mut self) -> Growth {
        self.happiness = clamp_stat(self.happiness + 5.0);
        self.exp = self.exp.saturating_add(QUEST_EXP);
        self.check_level_up()
    }

    fn check_level_up(&mut self) -> Growth {
        if self.exp >= self.exp_to_next_level() {
            self.level = self.level.saturating_add(1);
            self.exp = 0;
            return Growth::LeveledUp { level: self.level };
        }
        Growth::Steady
    }
}

fn clamp_stat(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, STAT_MAX)
}
