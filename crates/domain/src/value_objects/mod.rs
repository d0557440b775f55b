//! Value Objects - Immutable, identity-less domain primitives

mod error_record;
mod generation_params;
mod language;

pub use error_record::{ErrorKind, ErrorRecord};
pub use generation_params::{
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, GenerationParams, MAX_TOKENS_RANGE,
    TEMPERATURE_RANGE,
};
pub use language::Language;
