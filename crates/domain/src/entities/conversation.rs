//! Conversation history - the append-only record of completed turns

use serde::{Deserialize, Serialize};

/// One user input and the assistant output it produced
///
/// Fields are private: a turn cannot change once it exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    user_text: String,
    assistant_text: String,
}

impl ConversationTurn {
    /// Create a turn
    pub fn new(user_text: impl Into<String>, assistant_text: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
            assistant_text: assistant_text.into(),
        }
    }

    /// What the user said or typed
    #[must_use]
    pub fn user_text(&self) -> &str {
        &self.user_text
    }

    /// What the assistant answered (may be empty)
    #[must_use]
    pub fn assistant_text(&self) -> &str {
        &self.assistant_text
    }

    /// Whether the turn carries an assistant answer
    #[must_use]
    pub fn has_assistant_text(&self) -> bool {
        !self.assistant_text.is_empty()
    }
}

/// Ordered, append-only sequence of turns for one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    /// Create an empty history
    #[must_use]
    pub const fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Append a completed turn
    pub fn append(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// Drop every turn
    pub fn reset(&mut self) {
        self.turns.clear();
    }

    /// All turns, oldest first
    #[must_use]
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Iterate over turns, oldest first
    pub fn iter(&self) -> std::slice::Iter<'_, ConversationTurn> {
        self.turns.iter()
    }

    /// The most recent turn
    #[must_use]
    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    /// Number of turns
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether no turn has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl<'a> IntoIterator for &'a ConversationHistory {
    type Item = &'a ConversationTurn;
    type IntoIter = std::slice::Iter<'a, ConversationTurn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

impl FromIterator<ConversationTurn> for ConversationHistory {
    fn from_iter<I: IntoIterator<Item = ConversationTurn>>(iter: I) -> Self {
        Self {
            turns: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_history_is_empty() {
        let history = ConversationHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
        assert!(history.last().is_none());
    }

    #[test]
    fn turns_are_appended_in_order() {
        let mut history = ConversationHistory::new();
        history.append(ConversationTurn::new("こんにちは", "こんにちは！"));
        history.append(ConversationTurn::new("元気です", "よかったです。"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.turns()[0].user_text(), "こんにちは");
        assert_eq!(history.last().unwrap().assistant_text(), "よかったです。");
    }

    #[test]
    fn reset_clears_all_turns() {
        let mut history: ConversationHistory =
            vec![ConversationTurn::new("a", "b")].into_iter().collect();
        history.reset();
        assert!(history.is_empty());
    }

    #[test]
    fn empty_assistant_text_is_detected() {
        assert!(!ConversationTurn::new("a", "").has_assistant_text());
        assert!(ConversationTurn::new("a", "b").has_assistant_text());
    }

    #[test]
    fn history_serializes_as_array() {
        let history: ConversationHistory =
            vec![ConversationTurn::new("q", "a")].into_iter().collect();
        let json = serde_json::to_string(&history).unwrap();
        assert_eq!(json, r#"[{"user_text":"q","assistant_text":"a"}]"#);
    }
}
