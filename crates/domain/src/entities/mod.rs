//! Domain entities - Conversation state, model exchange and audio artifacts

mod audio_artifact;
mod chat_message;
mod conversation;
mod model_exchange;

pub use audio_artifact::{ArtifactState, AudioArtifact, AudioFormat};
pub use chat_message::{ChatMessage, MessageRole};
pub use conversation::{ConversationHistory, ConversationTurn};
pub use model_exchange::{ChatRequest, ModelRequest, ModelResponse};
