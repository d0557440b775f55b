//! Startup model selection

use std::fmt;

/// Which model a session starts with, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSelection {
    /// The configured model is installed
    Configured(String),
    /// The configured model is missing; the first installed model is used
    Fallback {
        /// Model that will be used
        selected: String,
        /// Model the configuration asked for
        requested: String,
    },
    /// Nothing could be listed; the configured name is kept as-is
    Unverified(String),
}

impl ModelSelection {
    /// Pick a model given what the backend reports as installed
    #[must_use]
    pub fn resolve(configured: &str, available: &[String]) -> Self {
        if available.iter().any(|m| m == configured) {
            return Self::Configured(configured.to_string());
        }
        match available.first() {
            Some(first) => Self::Fallback {
                selected: first.clone(),
                requested: configured.to_string(),
            },
            None => Self::Unverified(configured.to_string()),
        }
    }

    /// The model identifier to use
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Configured(name) | Self::Unverified(name) => name,
            Self::Fallback { selected, .. } => selected,
        }
    }

    /// Consume into the model identifier
    #[must_use]
    pub fn into_name(self) -> String {
        match self {
            Self::Configured(name) | Self::Unverified(name) => name,
            Self::Fallback { selected, .. } => selected,
        }
    }
}

impl fmt::Display for ModelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configured(name) => write!(f, "{name}"),
            Self::Fallback {
                selected,
                requested,
            } => write!(f, "{selected} ({requested} is not installed)"),
            Self::Unverified(name) => write!(f, "{name} (unverified)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn installed_model_is_kept() {
        let selection = ModelSelection::resolve("gemma3", &models(&["llama3", "gemma3"]));
        assert_eq!(selection, ModelSelection::Configured("gemma3".into()));
        assert_eq!(selection.name(), "gemma3");
    }

    #[test]
    fn missing_model_falls_back_to_first() {
        let selection = ModelSelection::resolve("gemma3", &models(&["llama3", "qwen3"]));
        assert_eq!(selection.name(), "llama3");
        assert!(selection.to_string().contains("gemma3 is not installed"));
    }

    #[test]
    fn empty_listing_keeps_configured_name() {
        let selection = ModelSelection::resolve("gemma3", &[]);
        assert_eq!(selection, ModelSelection::Unverified("gemma3".into()));
        assert_eq!(selection.into_name(), "gemma3");
    }
}
