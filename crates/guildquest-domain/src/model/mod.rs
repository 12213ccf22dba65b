//! Domain Models - The vocabulary of GuildQuest
//!
//! These types represent the "Ubiquitous Language" of the guild.
//! Every name here should match how we talk about the game.

pub mod companion;
pub mod decoration;
pub mod error;
pub mod ledger;
pub mod quest;
pub mod state;
pub mod user;
