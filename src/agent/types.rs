// Agent types

use crate::cleaner::LanguagePolicy;
use serde::{Deserialize, Serialize};

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Assistant,
}

/// A single message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Agent configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Assistant name, used in prompts and terminal output
    pub name: String,
    /// Messages kept in history (two per exchange)
    pub history_limit: usize,
    /// Exchanges included in each prompt
    pub context_exchanges: usize,
    /// Inference attempts per turn
    pub max_attempts: u32,
    /// Tokens kept free when sizing the completion budget
    pub safety_margin: u32,
    /// Longer responses are cut with an ellipsis
    pub max_response_chars: usize,
    /// Whether non-English responses are rejected
    pub language_policy: LanguagePolicy,
    /// Replaces the built-in persona instruction
    pub persona: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "Bissi".to_string(),
            history_limit: 16,
            context_exchanges: 4,
            max_attempts: 3,
            safety_margin: 100,
            max_response_chars: 500,
            language_policy: LanguagePolicy::EnglishOnly,
            persona: None,
        }
    }
}
