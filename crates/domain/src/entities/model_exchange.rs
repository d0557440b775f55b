//! Model request/response types exchanged with the language model backend

use serde::{Deserialize, Serialize};

use super::{ChatMessage, ConversationHistory, MessageRole};
use crate::value_objects::{
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, ErrorRecord, GenerationParams, Language,
};

/// Everything needed to ask the model for the next reply
///
/// Parameters are carried raw and validated by the client before any network
/// call, so out-of-range values come back as an in-band error record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier, chosen per request
    pub model: String,
    /// The new user message
    pub message: String,
    /// Prior turns of the session
    pub history: ConversationHistory,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Prepend the language-teacher system prompt
    pub teacher_mode: bool,
    /// Practice language (selects the teacher prompt)
    pub language: Language,
}

impl ChatRequest {
    /// Create a request with default parameters and no history
    pub fn new(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            message: message.into(),
            history: ConversationHistory::new(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            teacher_mode: false,
            language: Language::default(),
        }
    }

    /// Attach prior turns
    #[must_use]
    pub fn with_history(mut self, history: ConversationHistory) -> Self {
        self.history = history;
        self
    }

    /// Set sampling parameters
    #[must_use]
    pub const fn with_params(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Enable teacher mode for a language
    #[must_use]
    pub const fn with_teacher_mode(mut self, language: Language) -> Self {
        self.teacher_mode = true;
        self.language = language;
        self
    }
}

/// Fully assembled request as sent to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    /// Model identifier
    pub model: String,
    /// Optional leading system message, history pairs, then the new user message
    pub messages: Vec<ChatMessage>,
    /// Validated sampling parameters
    pub params: GenerationParams,
}

impl ModelRequest {
    /// Assemble the ordered message list
    ///
    /// Each history turn contributes `user` and, when non-empty, `assistant`.
    /// The list always ends with `user(message)`.
    pub fn assemble(
        model: impl Into<String>,
        system_prompt: Option<&str>,
        history: &ConversationHistory,
        message: impl Into<String>,
        params: GenerationParams,
    ) -> Self {
        let mut messages = Vec::with_capacity(history.len() * 2 + 2);

        if let Some(system) = system_prompt {
            messages.push(ChatMessage::system(system));
        }

        for turn in history {
            messages.push(ChatMessage::user(turn.user_text()));
            if turn.has_assistant_text() {
                messages.push(ChatMessage::assistant(turn.assistant_text()));
            }
        }

        messages.push(ChatMessage::user(message));

        Self {
            model: model.into(),
            messages,
            params,
        }
    }

    /// The system prompt, if one leads the list
    #[must_use]
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
    }
}

/// Outcome of a chat call: content or a classified error, never both
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "value")]
pub enum ModelResponse {
    /// Reply text
    Content(String),
    /// Classified failure
    Error(ErrorRecord),
}

impl ModelResponse {
    /// Whether this is an error
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The error record, if any
    #[must_use]
    pub const fn error(&self) -> Option<&ErrorRecord> {
        match self {
            Self::Error(record) => Some(record),
            Self::Content(_) => None,
        }
    }

    /// Map the content, leaving errors untouched
    #[must_use]
    pub fn map_content(self, f: impl FnOnce(String) -> String) -> Self {
        match self {
            Self::Content(text) => Self::Content(f(text)),
            error @ Self::Error(_) => error,
        }
    }

    /// The text to show the user: content, or the error message verbatim
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Content(text) => text,
            Self::Error(record) => record.message,
        }
    }
}

impl From<Result<String, ErrorRecord>> for ModelResponse {
    fn from(result: Result<String, ErrorRecord>) -> Self {
        match result {
            Ok(text) => Self::Content(text),
            Err(record) => Self::Error(record),
        }
    }
}
