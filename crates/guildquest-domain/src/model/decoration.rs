//! Decoration - Cosmetic items for the pet chamber
//!
//! Decorations come from a fixed catalog, cost the same, and can be
//! owned at most once. Nothing is ever removed from the inventory.

use core::str::FromStr;

use super::error::DomainError;
use super::ledger::{Ledger, DECORATION_COST};

/// The shop catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Decoration {
    Torch,
    Banner,
    Shield,
    Chest,
    Bookshelf,
    Armor,
}

impl Decoration {
    /// Every decoration, in shop order
    pub const ALL: [Decoration; 6] = [
        Decoration::Torch,
        Decoration::Banner,
        Decoration::Shield,
        Decoration::Chest,
        Decoration::Bookshelf,
        Decoration::Armor,
    ];

    /// Wire name, as the guild hall stores it
    pub fn as_str(&self) -> &'static str {
        match self {
            Decoration::Torch => "torch",
            Decoration::Banner => "banner",
            Decoration::Shield => "shield",
            Decoration::Chest => "chest",
            Decoration::Bookshelf => "bookshelf",
            Decoration::Armor => "armor",
        }
    }

    pub fn cost(&self) -> u64 {
        DECORATION_COST
    }
}

impl core::fmt::Display for Decoration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Decoration {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Decoration::ALL
            .into_iter()
            .find(|d| d.as_str() == name)
            .ok_or_else(|| {
                DomainError::validation("decoration", format!("'{}' is not sold here", s.trim()))
            })
    }
}

/// Inventory - Decorations owned by the adventurer, in purchase order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    owned: Vec<Decoration>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owns(&self, decoration: Decoration) -> bool {
        self.owned.contains(&decoration)
    }

    /// Check that a purchase would go through, without changing anything
    ///
    /// Ownership is checked before gold so the caller can tell the
    /// adventurer the more useful of the two reasons.
    pub fn check_purchase(&self, decoration: Decoration, ledger: &Ledger) -> Result<(), DomainError> {
        if self.owns(decoration) {
            return Err(DomainError::AlreadyOwned { decoration });
        }
        if !ledger.can_afford(decoration.cost()) {
            return Err(DomainError::InsufficientFunds {
                needed: decoration.cost(),
                available: ledger.gold(),
            });
        }
        Ok(())
    }

    /// Buy a decoration: debit the ledger and add it to the chamber
    pub fn purchase(&mut self, decoration: Decoration, ledger: &mut Ledger) -> Result<(), DomainError> {
        self.check_purchase(decoration, ledger)?;
        ledger.debit(decoration.cost())?;
        self.owned.push(decoration);
        Ok(())
    }

    /// Record a decoration acquired elsewhere. Returns false if already owned.
    pub fn insert(&mut self, decoration: Decoration) -> bool {
        if self.owns(decoration) {
            return false;
        }
        self.owned.push(decoration);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = Decoration> + '_ {
        self.owned.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.owned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }
}

impl FromIterator<Decoration> for Inventory {
    fn from_iter<I: IntoIterator<Item = Decoration>>(iter: I) -> Self {
        let mut inventory = Inventory::new();
        for decoration in iter {
            inventory.insert(decoration);
        }
        inventory
    }
}
