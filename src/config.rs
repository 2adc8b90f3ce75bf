//! Marker and chat configuration.
//!
//! The two markers are shared between the system prompt sent upstream and the
//! stream classifier, so both read them from the same [`MarkerConfig`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Line that introduces the model's step-by-step thinking.
pub const DEFAULT_REASONING_PREFIX: &str = "Reasoning:";

/// Line that introduces the model's final answer.
pub const DEFAULT_ANSWER_MARKER: &str = "Answer:";

/// Model used when the config does not name one.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// The pair of literal markers the classifier splits on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub reasoning_prefix: String,
    pub answer_marker: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            reasoning_prefix: DEFAULT_REASONING_PREFIX.to_string(),
            answer_marker: DEFAULT_ANSWER_MARKER.to_string(),
        }
    }
}

impl MarkerConfig {
    /// Create a marker pair.
    pub fn new(reasoning_prefix: impl Into<String>, answer_marker: impl Into<String>) -> Self {
        Self {
            reasoning_prefix: reasoning_prefix.into(),
            answer_marker: answer_marker.into(),
        }
    }

    /// Reject marker pairs the classifier cannot split on.
    pub fn validate(&self) -> Result<()> {
        if self.reasoning_prefix.is_empty() {
            return Err(Error::InvalidMarkers(
                "reasoning prefix must not be empty".to_string(),
            ));
        }
        if self.answer_marker.is_empty() {
            return Err(Error::InvalidMarkers(
                "answer marker must not be empty".to_string(),
            ));
        }
        if self.reasoning_prefix == self.answer_marker {
            return Err(Error::InvalidMarkers(format!(
                "reasoning prefix and answer marker are both {:?}",
                self.answer_marker
            )));
        }
        Ok(())
    }
}

/// Settings for one chat deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Completion model name sent upstream.
    pub model: String,
    /// Markers used in the prompt and by the classifier.
    pub markers: MarkerConfig,
    /// Replaces the generated system prompt when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            markers: MarkerConfig::default(),
            system_prompt: None,
        }
    }
}

impl ChatConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: ChatConfig = serde_yaml::from_str(yaml)?;
        config.markers.validate()?;
        tracing::debug!(model = %config.model, "loaded chat config");
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// The system prompt instructing the model to emit both markers.
    pub fn system_prompt(&self) -> String {
        match &self.system_prompt {
            Some(prompt) => prompt.clone(),
            None => format!(
                "You are a helpful assistant. When answering, first think step by step \
                 about the question, then provide your answer. Format your response as:\n\n\
                 {} [your step-by-step thinking]\n\n{} [your final answer]",
                self.markers.reasoning_prefix, self.markers.answer_marker
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_markers_are_valid() {
        let markers = MarkerConfig::default();
        assert_eq!(markers.reasoning_prefix, "Reasoning:");
        assert_eq!(markers.answer_marker, "Answer:");
        assert!(markers.validate().is_ok());
    }

    #[test]
    fn test_empty_and_identical_markers_rejected() {
        assert!(matches!(
            MarkerConfig::new("", "Answer:").validate(),
            Err(Error::InvalidMarkers(_))
        ));
        assert!(matches!(
            MarkerConfig::new("Reasoning:", "").validate(),
            Err(Error::InvalidMarkers(_))
        ));
        assert!(matches!(
            MarkerConfig::new("X:", "X:").validate(),
            Err(Error::InvalidMarkers(_))
        ));
    }

    #[test]
    fn test_yaml_partial_config_uses_defaults() {
        let config = ChatConfig::from_yaml_str("model: gpt-4o\n").unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.markers, MarkerConfig::default());
        assert!(config.system_prompt.is_none());
    }

    #[test]
    fn test_yaml_custom_markers() {
        let yaml = "markers:\n  reasoning_prefix: \"Thinking:\"\n  answer_marker: \"Final:\"\n";
        let config = ChatConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.markers.reasoning_prefix, "Thinking:");
        assert_eq!(config.markers.answer_marker, "Final:");
    }

    #[test]
    fn test_yaml_invalid_markers_rejected() {
        let yaml = "markers:\n  answer_marker: \"\"\n";
        assert!(matches!(
            ChatConfig::from_yaml_str(yaml),
            Err(Error::InvalidMarkers(_))
        ));
    }

    #[test]
    fn test_yaml_syntax_error() {
        assert!(matches!(
            ChatConfig::from_yaml_str("model: [unclosed"),
            Err(Error::Yaml(_))
        ));
    }

    #[test]
    fn test_system_prompt_uses_markers() {
        let config = ChatConfig {
            markers: MarkerConfig::new("Thinking:", "Final:"),
            ..ChatConfig::default()
        };
        let prompt = config.system_prompt();
        assert!(prompt.contains("Thinking: [your step-by-step thinking]"));
        assert!(prompt.contains("Final: [your final answer]"));
    }

    #[test]
    fn test_system_prompt_override() {
        let config = ChatConfig {
            system_prompt: Some("Be terse.".to_string()),
            ..ChatConfig::default()
        };
        assert_eq!(config.system_prompt(), "Be terse.");
    }
}
