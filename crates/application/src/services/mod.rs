//! Application services - Use case implementations

mod chat_orchestrator;
mod model_selection;
mod response_sanitizer;

pub use chat_orchestrator::{
    ChatOrchestrator, DEFAULT_SPEECH_SPEED, SPEED_RANGE, TurnInput, TurnOutcome, TurnRequest,
    TurnState,
};
pub use model_selection::ModelSelection;
pub use response_sanitizer::{ResponseSanitizer, SanitizeStep};
