//! # GuildQuest CLI
//!
//! ```text
//! main.rs ──▶ App::connect ──▶ commands/*     (one-shot)
//!                          └─▶ InteractiveCli (REPL, decay ticking)
//! ```

pub mod app;
pub mod commands;
pub mod interactive;
pub mod render;

pub use app::App;
