//! Chat orchestrator - sequences one conversation turn
//!
//! A turn runs strictly in order:
//! `Idle → AwaitingTranscript (audio only) → AwaitingModelResponse →
//! Sanitizing → Synthesizing → Done`.
//!
//! The history lock is held for the whole turn, so concurrent submissions
//! queue instead of interleaving. Every completed turn appends exactly one
//! [`ConversationTurn`]; absent input appends nothing.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use domain::{
    AudioArtifact, ChatRequest, ConversationHistory, ConversationTurn, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE, Language, ModelResponse,
};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::model_selection::ModelSelection;
use super::response_sanitizer::ResponseSanitizer;
use crate::error::ApplicationError;
use crate::ports::{ModelPort, SpeechPort};

/// Accepted playback speeds
pub const SPEED_RANGE: std::ops::RangeInclusive<f32> = 0.25..=4.0;

/// Default playback speed of synthesized replies
pub const DEFAULT_SPEECH_SPEED: f32 = 1.25;

/// What the user submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnInput {
    /// Typed message
    Text(String),
    /// Recorded audio file; `None` when nothing was captured
    Audio(Option<PathBuf>),
}

/// One turn submission with its per-turn parameters
#[derive(Debug, Clone, PartialEq)]
pub struct TurnRequest {
    /// Message or recording
    pub input: TurnInput,
    /// Model identifier for this turn
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Prepend the language-teacher prompt
    pub teacher_mode: bool,
    /// Practice language
    pub language: Language,
    /// Playback speed of the synthesized reply
    pub speech_speed: f32,
}

impl TurnRequest {
    /// Text turn with default parameters
    pub fn text(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_input(model, TurnInput::Text(message.into()))
    }

    /// Audio turn with default parameters
    pub fn audio(model: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::with_input(model, TurnInput::Audio(path))
    }

    fn with_input(model: impl Into<String>, input: TurnInput) -> Self {
        Self {
            input,
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            teacher_mode: true,
            language: Language::default(),
            speech_speed: DEFAULT_SPEECH_SPEED,
        }
    }

    /// Check a playback speed
    ///
    /// # Errors
    ///
    /// Returns an error if `speed` is outside [`SPEED_RANGE`].
    pub fn validate_speed(speed: f32) -> Result<f32, ApplicationError> {
        if SPEED_RANGE.contains(&speed) {
            Ok(speed)
        } else {
            Err(ApplicationError::InvalidInput(format!(
                "speech speed must be between {} and {}, got {speed}",
                SPEED_RANGE.start(),
                SPEED_RANGE.end()
            )))
        }
    }
}

/// Stage of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Nothing started
    Idle,
    /// Waiting for speech recognition
    AwaitingTranscript,
    /// Waiting for the model
    AwaitingModelResponse,
    /// Cleaning the reply
    Sanitizing,
    /// Waiting for speech synthesis
    Synthesizing,
    /// Turn finished
    Done,
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AwaitingTranscript => "awaiting_transcript",
            Self::AwaitingModelResponse => "awaiting_model_response",
            Self::Sanitizing => "sanitizing",
            Self::Synthesizing => "synthesizing",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Result of a turn handed back to the front end
#[derive(Debug)]
pub struct TurnOutcome {
    /// History after the turn
    pub history: ConversationHistory,
    /// Synthesized reply, owned by the caller
    pub audio: Option<AudioArtifact>,
    /// States visited, in order
    pub transitions: Vec<TurnState>,
}

impl TurnOutcome {
    /// The last state reached
    #[must_use]
    pub fn state(&self) -> TurnState {
        self.transitions.last().copied().unwrap_or(TurnState::Idle)
    }

    /// The turn appended by this submission, if any
    #[must_use]
    pub fn turn(&self) -> Option<&ConversationTurn> {
        let started = self
            .transitions
            .iter()
            .any(|s| !matches!(s, TurnState::Idle | TurnState::Done));
        if started { self.history.last() } else { None }
    }
}

struct Transitions(Vec<TurnState>);

impl Transitions {
    fn new() -> Self {
        Self(vec![TurnState::Idle])
    }

    fn enter(&mut self, state: TurnState) {
        debug!(%state, "Turn state");
        self.0.push(state);
    }
}

/// Runs turns against the model and speech ports over an owned history
pub struct ChatOrchestrator {
    model: Arc<dyn ModelPort>,
    speech: Arc<dyn SpeechPort>,
    sanitizer: ResponseSanitizer,
    history: Mutex<ConversationHistory>,
}

impl fmt::Debug for ChatOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatOrchestrator")
            .field("sanitizer", &self.sanitizer)
            .finish_non_exhaustive()
    }
}

impl ChatOrchestrator {
    /// Create an orchestrator with an empty history
    pub fn new(model: Arc<dyn ModelPort>, speech: Arc<dyn SpeechPort>) -> Self {
        Self {
            model,
            speech,
            sanitizer: ResponseSanitizer::new(),
            history: Mutex::new(ConversationHistory::new()),
        }
    }

    /// Run one turn to completion
    #[instrument(skip(self, request), fields(model = %request.model, lang = %request.language))]
    pub async fn run_turn(&self, request: TurnRequest) -> TurnOutcome {
        let mut history = self.history.lock().await;
        let mut transitions = Transitions::new();

        let user_text = match &request.input {
            TurnInput::Audio(None) => {
                debug!("No audio captured");
                return Self::finish(&history, None, transitions);
            },
            TurnInput::Text(text) if text.trim().is_empty() => {
                debug!("Empty message");
                return Self::finish(&history, None, transitions);
            },
            TurnInput::Text(text) => text.trim().to_string(),
            TurnInput::Audio(Some(path)) => {
                transitions.enter(TurnState::AwaitingTranscript);
                match self.speech.transcribe(path, request.language).await {
                    Ok(text) => text,
                    Err(record) => {
                        info!(kind = %record.kind, "Transcription failed, sending guidance");
                        record.message
                    },
                }
            },
        };

        transitions.enter(TurnState::AwaitingModelResponse);
        let mut chat = ChatRequest::new(&request.model, &user_text)
            .with_history(history.clone())
            .with_params(request.temperature, request.max_tokens);
        chat.language = request.language;
        if request.teacher_mode {
            chat = chat.with_teacher_mode(request.language);
        }
        let response = self.model.chat(&chat).await;

        transitions.enter(TurnState::Sanitizing);
        let response = response.map_content(|text| self.sanitizer.sanitize(&text));

        let audio = match &response {
            ModelResponse::Content(text) => {
                transitions.enter(TurnState::Synthesizing);
                self.synthesize(text, &request).await
            },
            ModelResponse::Error(record) => {
                warn!(kind = %record.kind, "Model call failed, surfacing message");
                None
            },
        };

        history.append(ConversationTurn::new(user_text, response.into_text()));
        Self::finish(&history, audio, transitions)
    }

    async fn synthesize(&self, text: &str, request: &TurnRequest) -> Option<AudioArtifact> {
        match TurnRequest::validate_speed(request.speech_speed) {
            Ok(speed) => self.speech.synthesize(text, request.language, speed).await,
            Err(e) => {
                warn!(error = %e, "Skipping synthesis");
                None
            },
        }
    }

    fn finish(
        history: &ConversationHistory,
        audio: Option<AudioArtifact>,
        mut transitions: Transitions,
    ) -> TurnOutcome {
        transitions.enter(TurnState::Done);
        TurnOutcome {
            history: history.clone(),
            audio,
            transitions: transitions.0,
        }
    }

    /// Snapshot of the current history
    pub async fn history(&self) -> ConversationHistory {
        self.history.lock().await.clone()
    }

    /// Clear the conversation
    pub async fn reset(&self) {
        self.history.lock().await.reset();
        info!("Conversation reset");
    }

    /// Installed models
    pub async fn list_models(&self) -> Vec<String> {
        self.model.list_models().await
    }

    /// Whether the model backend answers
    pub async fn is_backend_healthy(&self) -> bool {
        self.model.is_healthy().await
    }

    /// Resolve the model to start with
    pub async fn select_model(&self, configured: Option<&str>) -> ModelSelection {
        let configured = configured.map_or_else(|| self.model.default_model(), ToString::to_string);
        let available = self.model.list_models().await;
        let selection = ModelSelection::resolve(&configured, &available);
        info!(%selection, "Selected model");
        selection
    }
}
