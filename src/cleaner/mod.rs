// Cleaner module - turns raw model output into presentable text
//
// The pipeline is an ordered list of named stages (see stages.rs). A stage
// either rewrites the text for the next one or finishes the pipeline with a
// final value: an empty string when nothing usable is left, or a fixed
// substitute message when a policy gate rejects the response.

mod coherence;
mod phrases;
mod stages;

pub use coherence::Coherence;
pub use phrases::GREETING_WORDS;
pub use stages::{Flow, Stage};
#[cfg(test)]
pub use stages::{ENGLISH_ONLY_REDIRECT, META_DEFLECTION, MIN_CLEAN_CHARS};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::trace;

/// How strictly responses are held to English
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguagePolicy {
    /// Responses with foreign-language indicators are replaced by a redirect
    #[default]
    EnglishOnly,
    /// Any language passes through
    Multilingual,
}

impl FromStr for LanguagePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "english_only" | "english" => Ok(LanguagePolicy::EnglishOnly),
            "multilingual" => Ok(LanguagePolicy::Multilingual),
            other => Err(format!("unknown language policy: {}", other)),
        }
    }
}

/// Response cleaner
#[derive(Debug, Clone)]
pub struct Cleaner {
    label_re: Regex,
    policy: LanguagePolicy,
    stages: Vec<Stage>,
}

impl Cleaner {
    /// Build a cleaner for an assistant called `assistant_name`.
    pub fn new(assistant_name: &str, policy: LanguagePolicy) -> Self {
        Self {
            label_re: role_label_regex(assistant_name),
            policy,
            stages: stages::pipeline(),
        }
    }

    pub fn policy(&self) -> LanguagePolicy {
        self.policy
    }

    #[cfg(test)]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run the full pipeline. Returns an empty string when the response has
    /// no usable content.
    pub fn clean(&self, raw: &str) -> String {
        let mut text = raw.to_string();
        for stage in &self.stages {
            match (stage.apply)(self, &text) {
                Flow::Continue(next) => text = next,
                Flow::Finish(done) => {
                    trace!(stage = stage.name, "cleaner stopped early");
                    return done;
                }
            }
        }
        text.trim().to_string()
    }

    /// Drop a leading `Name:`-style role label.
    pub fn strip_role_label(&self, text: &str) -> String {
        self.label_re.replace(text, "").into_owned()
    }
}

/// The name with every letter allowed to repeat, so `Bissi` also matches
/// `Biissi:` and `BBissi:`.
fn role_label_regex(name: &str) -> Regex {
    let mut letters: Vec<char> = name.trim().chars().collect();
    letters.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
    let name_pattern = letters
        .iter()
        .map(|c| format!("{}+", regex::escape(&c.to_string())))
        .collect::<String>();

    let labels = if name_pattern.is_empty() {
        "assistant|ai|bot|a|q".to_string()
    } else {
        format!("{}|assistant|ai|bot|a|q", name_pattern)
    };

    Regex::new(&format!(r"(?i)^\s*(?:{})\s*:\s*", labels)).expect("valid regex")
}

/// Light cleanup for text that already went through the pipeline: markup,
/// whitespace and surrounding quotes.
pub fn tidy(text: &str) -> String {
    stages::strip_markup(text)
        .trim_matches(|c: char| c == '"' || c == '\'')
        .trim()
        .to_string()
}
