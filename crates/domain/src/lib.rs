//! Domain layer for Speak L2
//!
//! Contains the conversation data model, classified error records, and the
//! validated value objects shared by every other crate.
//! This layer has no I/O and defines the ubiquitous language.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
