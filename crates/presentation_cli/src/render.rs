//! Terminal rendering of turns, history and model lists

use std::fmt::Write as _;

use application::TurnOutcome;
use domain::{ConversationHistory, ConversationTurn};

/// Text shown after a turn completes
#[must_use]
pub fn outcome(outcome: &TurnOutcome, spoken: bool) -> String {
    let Some(turn) = outcome.turn() else {
        return "(nothing to send)".to_string();
    };

    let mut out = String::new();
    if spoken {
        if !turn.has_assistant_text() {
            return format!("⚠️  {}", turn.user_text());
        }
        let _ = writeln!(out, "🎤 {}", turn.user_text());
    }
    let _ = write!(out, "🤖 {}", turn.assistant_text());
    if let Some(audio) = &outcome.audio {
        let _ = write!(out, "\n🔊 {}", audio.path().display());
    }
    out
}

fn turn_lines(turn: &ConversationTurn) -> String {
    if turn.has_assistant_text() {
        format!("you:   {}\ntutor: {}", turn.user_text(), turn.assistant_text())
    } else {
        format!("note:  {}", turn.user_text())
    }
}

/// Whole conversation, oldest first
#[must_use]
pub fn history(history: &ConversationHistory) -> String {
    if history.is_empty() {
        return "(no conversation yet)".to_string();
    }
    history
        .iter()
        .map(turn_lines)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Installed models with the current one marked
#[must_use]
pub fn models(models: &[String], current: &str) -> String {
    if models.is_empty() {
        return "No models found. Is Ollama running?".to_string();
    }
    models
        .iter()
        .map(|m| {
            let marker = if m == current { '*' } else { ' ' };
            format!("{marker} {m}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
