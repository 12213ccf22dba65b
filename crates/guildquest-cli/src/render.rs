//! Terminal rendering
//!
//! Everything the adventurer sees goes through here. The `*_line`
//! helpers build plain text so they can be tested without a terminal;
//! styling is applied on top when printing.

use std::future::Future;
use std::time::Duration;

use console::{style, Color, Style};
use indicatif::{ProgressBar, ProgressStyle};

use guildquest_domain::{Companion, Decoration, GuildState, Quest, QuestBoard, User};
use guildquest_usecase::{Notice, SessionError, Tone};

const BAR_WIDTH: usize = 20;

// ========== Notices ==========

fn tone_style(tone: Tone) -> (Style, &'static str) {
    match tone {
        Tone::Success => (Style::new().green(), "✔"),
        Tone::Info => (Style::new().cyan(), "•"),
        Tone::Warning => (Style::new().yellow(), "!"),
        Tone::Error => (Style::new().red().bold(), "✘"),
    }
}

pub fn notice(notice: &Notice) {
    let (paint, mark) = tone_style(notice.tone);
    println!("{} {}", paint.apply_to(mark), paint.apply_to(&notice.text));
}

/// Print a failed command
///
/// Session errors carry their own phrasing; anything else is shown as is.
pub fn fatal(err: &anyhow::Error) {
    match err.downcast_ref::<SessionError>() {
        Some(session_err) => notice(&Notice::from(session_err)),
        None => eprintln!("{} {:#}", style("Error:").red().bold(), err),
    }
}

// ========== Quest board ==========

/// One board row: `  1. [x] Title  +15g`
pub fn quest_line(index: usize, quest: &Quest) -> String {
    let mark = if quest.is_completed() { "x" } else { " " };
    format!("{:>3}. [{}] {}  +{}g", index, mark, quest.title(), quest.reward())
}

pub fn board(board: &QuestBoard) {
    if board.is_empty() {
        println!("{}", style("The quest board is empty. Post a quest to begin!").dim());
        return;
    }

    println!(
        "{}  {}",
        style("Quest Board").bold().underlined(),
        style(format!(
            "{} open, {} done",
            board.pending_count(),
            board.completed_count()
        ))
        .dim()
    );
    for (i, quest) in board.quests().iter().enumerate() {
        let line = quest_line(i + 1, quest);
        if quest.is_completed() {
            println!("{}", style(line).dim().strikethrough());
        } else {
            println!("{}", line);
        }
        if !quest.description().is_empty() {
            println!("       {}", style(quest.description()).dim());
        }
    }
}

// ========== Companion ==========

/// Color of a stat bar: healthy, worrying, critical
pub fn stat_color(value: f64) -> Color {
    if value > 50.0 {
        Color::Green
    } else if value > 25.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

/// A fixed-width gauge for a 0-100 stat
pub fn stat_bar(value: f64, width: usize) -> String {
    let ratio = (value / 100.0).clamp(0.0, 1.0);
    let filled = (ratio * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// `Level 3 Dragon`
pub fn companion_title(companion: &Companion) -> String {
    let mut kind = companion.kind().chars();
    let kind = match kind.next() {
        Some(first) => first.to_uppercase().chain(kind).collect(),
        None => String::new(),
    };
    format!("Level {} {}", companion.level(), kind)
}

fn stat_row(label: &str, value: f64) {
    println!(
        "  {:<10} {} {:>3.0}",
        label,
        style(stat_bar(value, BAR_WIDTH)).fg(stat_color(value)),
        value
    );
}

pub fn companion(companion: &Companion) {
    println!("{}", style(companion_title(companion)).bold().magenta());

    let needed = companion.exp_to_next_level().max(1);
    let progress = f64::from(companion.exp()) / f64::from(needed) * 100.0;
    println!(
        "  {:<10} {} {}/{}",
        "Experience",
        style(stat_bar(progress, BAR_WIDTH)).cyan(),
        companion.exp(),
        needed
    );
    stat_row("Hunger", companion.hunger());
    stat_row("Happiness", companion.happiness());
}

// ========== Shop ==========

/// One catalog row, marking what is already owned
pub fn shop_line(decoration: Decoration, owned: bool) -> String {
    let status = if owned {
        "owned".to_string()
    } else {
        format!("{}g", decoration.cost())
    };
    format!("  {:<10} {}", decoration.as_str(), status)
}

pub fn shop(state: &GuildState) {
    println!(
        "{}  {}",
        style("Decoration Shop").bold().underlined(),
        style(format!("{} gold in your purse", state.gold())).yellow()
    );
    for decoration in Decoration::ALL {
        let owned = state.inventory.owns(decoration);
        let line = shop_line(decoration, owned);
        if owned {
            println!("{}", style(line).dim());
        } else {
            println!("{}", line);
        }
    }
}

// ========== Status ==========

pub fn purse(gold: u64) -> String {
    format!("{} gold", gold)
}

pub fn status(user: Option<&User>, state: &GuildState) {
    match user {
        Some(user) => println!("Signed in as {}", style(&user.email).bold()),
        None => println!("{}", style("Not signed in").dim()),
    }
    println!("  Purse:       {}", style(purse(state.gold())).yellow());
    println!(
        "  Quests:      {} open, {} done",
        state.board.pending_count(),
        state.board.completed_count()
    );
    println!("  Companion:   {}", companion_title(&state.companion));
    println!("  Decorations: {}/{}", state.inventory.len(), Decoration::ALL.len());
}

// ========== Progress ==========

/// Spinner shown while waiting on the guild hall
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(template);
    }
    bar.set_message(message.into());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Await `future` behind a spinner
pub async fn working<F: Future>(message: &str, future: F) -> F::Output {
    let bar = spinner(message);
    let output = future.await;
    bar.finish_and_clear();
    output
}
