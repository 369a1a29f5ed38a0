// Conversation session - command dispatch, generation and history for one user

use crate::cleaner::{self, Cleaner, Coherence, GREETING_WORDS};
use crate::engine::{CompletionBackend, GenerationOverrides, GenerationParams};

use super::command::Command;
use super::history::History;
use super::inference::Generator;
use super::persona;
use super::prompt::assemble_prompt;
use super::types::AgentConfig;

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error, info, warn};

/// Sampling used for conversational turns
pub const CONVERSATION_OVERRIDES: GenerationOverrides = GenerationOverrides {
    temperature: Some(0.7),
    top_p: Some(0.9),
    top_k: None,
    repeat_penalty: Some(1.2),
    max_tokens: Some(1000),
};

/// What the terminal should do after one line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    /// Print the assistant's reply
    Reply(String),
    /// History was emptied; print the confirmation
    Cleared(String),
    /// Print the command summary
    Help(&'static str),
    /// Print the farewell and stop
    Quit(&'static str),
    /// Blank line; prompt again
    Ignored,
}

/// One interactive conversation
pub struct Session<B: CompletionBackend> {
    config: AgentConfig,
    generator: Generator<B>,
    history: History,
    persona: String,
}

impl<B: CompletionBackend> Session<B> {
    pub fn new(backend: B, defaults: GenerationParams, config: AgentConfig) -> Self {
        let cleaner = Cleaner::new(&config.name, config.language_policy);
        let generator = Generator::new(
            backend,
            cleaner,
            defaults,
            config.max_attempts,
            config.safety_margin,
        );
        let persona = config
            .persona
            .clone()
            .unwrap_or_else(|| persona::persona_for(config.language_policy, &config.name));

        info!(
            name = %config.name,
            policy = ?config.language_policy,
            history_limit = config.history_limit,
            "session created"
        );

        Self {
            history: History::new(config.history_limit),
            config,
            generator,
            persona,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    #[cfg(test)]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[cfg(test)]
    pub fn generator(&self) -> &Generator<B> {
        &self.generator
    }

    pub fn greeting(&self) -> String {
        persona::random_greeting()
    }

    /// Handle one line of input.
    pub async fn handle(&mut self, line: &str) -> Turn {
        let input = line.trim();
        if input.is_empty() {
            return Turn::Ignored;
        }

        match Command::parse(input) {
            Command::Quit => {
                info!("quit requested");
                Turn::Quit(persona::FAREWELL_QUIT)
            }
            Command::Clear => {
                info!(dropped = self.history.len(), "history cleared");
                self.history.clear();
                Turn::Cleared(persona::CLEARED.to_string())
            }
            Command::Help => Turn::Help(persona::HELP_TEXT),
            Command::None => Turn::Reply(self.respond(input).await),
        }
    }

    /// Generate a reply and record the exchange. Never fails: any problem
    /// becomes a canned message.
    pub async fn respond(&mut self, input: &str) -> String {
        let reply = match AssertUnwindSafe(self.generate_reply(input))
            .catch_unwind()
            .await
        {
            Ok(reply) => reply,
            Err(_) => {
                error!("response generation panicked");
                persona::APOLOGY.to_string()
            }
        };

        self.history.push_exchange(input, reply.as_str());
        reply
    }

    async fn generate_reply(&self, input: &str) -> String {
        if GREETING_WORDS.contains(&input.to_lowercase()) {
            debug!("greeting fast path");
            return persona::random_greeting_reply().to_string();
        }

        let prompt = assemble_prompt(
            &self.persona,
            &self.history,
            input,
            &self.config.name,
            self.config.context_exchanges,
        );

        let text = self
            .generator
            .generate(&prompt, &CONVERSATION_OVERRIDES)
            .await;
        self.finalize(&text)
    }

    /// Last checks before a generated response is shown.
    fn finalize(&self, text: &str) -> String {
        let text = cleaner::tidy(text);
        if text.chars().count() < 2 {
            return persona::CLARIFICATION_REQUEST.to_string();
        }

        match Coherence::assess(&text) {
            Coherence::Incoherent => {
                warn!(response = %text, "response looks incoherent");
                return persona::INCOHERENT_REPLY.to_string();
            }
            Coherence::Suspect => debug!(response = %text, "response has no common words"),
            Coherence::Coherent => {}
        }

        truncate_response(&text, self.config.max_response_chars)
    }
}

/// Cut to `max_chars`, the last three of which become `...`.
pub fn truncate_response(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::inference::tests::MockBackend;
    use crate::agent::types::Role;
    use crate::cleaner::{ENGLISH_ONLY_REDIRECT, LanguagePolicy};
    use std::sync::atomic::Ordering;

    fn session(backend: MockBackend) -> Session<MockBackend> {
        Session::new(backend, GenerationParams::default(), AgentConfig::default())
    }

    fn calls(session: &Session<MockBackend>) -> usize {
        session.generator().backend().calls.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn greeting_skips_inference() {
        let mut session = session(MockBackend::always_failing());
        let turn = session.handle("hello").await;

        match turn {
            Turn::Reply(text) => assert!(persona::GREETING_REPLIES.contains(&text.as_str())),
            other => panic!("unexpected turn: {:?}", other),
        }
        assert_eq!(calls(&session), 0);
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn greeting_word_must_stand_alone() {
        let mut session = session(MockBackend::new(vec![Ok(
            "This is a rather long answer about history".to_string(),
        )]));
        session.handle("tell me this history").await;
        assert_eq!(calls(&session), 1);
    }

    #[tokio::test]
    async fn clear_empties_history_and_prompt() {
        let mut session = session(MockBackend::new(vec![
            Ok("Paris is the capital of France".to_string()),
            Ok("Rust is a systems programming language".to_string()),
        ]));
        session.handle("capital of France?").await;
        assert_eq!(session.history().len(), 2);

        let turn = session.handle("CLEAR").await;
        assert_eq!(turn, Turn::Cleared(persona::CLEARED.to_string()));
        assert!(session.history().is_empty());

        session.handle("what is rust?").await;
        let requests = session.generator().backend().requests.read().unwrap();
        assert!(requests[0].prompt.contains("capital of France?"));
        assert!(!requests[1].prompt.contains("capital of France?"));
        assert!(!requests[1].prompt.contains("Paris"));
    }

    #[tokio::test]
    async fn commands_do_not_touch_history() {
        let mut session = session(MockBackend::always_failing());
        assert_eq!(session.handle("help").await, Turn::Help(persona::HELP_TEXT));
        assert_eq!(session.handle("   ").await, Turn::Ignored);
        assert_eq!(session.handle("Quit").await, Turn::Quit(persona::FAREWELL_QUIT));
        assert!(session.history().is_empty());
        assert_eq!(calls(&session), 0);
    }

    #[tokio::test]
    async fn failures_become_fallbacks_and_are_recorded() {
        let mut session = session(MockBackend::always_failing());
        let reply = session.respond("explain monads").await;

        assert!(persona::FALLBACK_RESPONSES.contains(&reply.as_str()));
        assert_eq!(calls(&session), 3);
        let last = session.history().last_reply().unwrap();
        assert_eq!(last, reply);
    }

    #[tokio::test]
    async fn panic_in_generation_becomes_apology() {
        let mut session = session(MockBackend::panicking());
        let turn = session.handle("explain monads").await;

        assert_eq!(turn, Turn::Reply(persona::APOLOGY.to_string()));
        assert_eq!(calls(&session), 1);
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history().last_reply(), Some(persona::APOLOGY));

        // The session keeps working after the panic
        assert_eq!(session.handle("help").await, Turn::Help(persona::HELP_TEXT));
    }

    #[tokio::test]
    async fn incoherent_output_is_replaced() {
        let mut session = session(MockBackend::new(vec![Ok(
            "ლორემ იფსუმ დოლორ სიტ ამეტ".to_string(),
        )]));
        let reply = session.respond("say something").await;

        assert_eq!(reply, persona::INCOHERENT_REPLY);
        assert_eq!(session.history().last_reply(), Some(persona::INCOHERENT_REPLY));
    }

    #[tokio::test]
    async fn odd_history_limit_keeps_pairs() {
        let config = AgentConfig {
            history_limit: 3,
            ..Default::default()
        };
        let backend = MockBackend::new(vec![
            Ok("Paris is the capital of France".to_string()),
            Ok("Berlin is the capital of Germany".to_string()),
            Ok("Rome is the capital of Italy".to_string()),
        ]);
        let mut session = Session::new(backend, GenerationParams::default(), config);
        session.respond("capital of France?").await;
        session.respond("capital of Germany?").await;

        let roles: Vec<_> = session.history().iter().map(|m| m.role).collect();
        assert_eq!(roles, [Role::User, Role::Assistant]);

        session.respond("capital of Italy?").await;
        let requests = session.generator().backend().requests.read().unwrap();
        assert!(requests[2].prompt.contains("Conversation:\nUser: capital of Germany?\nBissi: Berlin"));
        assert!(!requests[2].prompt.contains("France"));
    }

    #[tokio::test]
    async fn history_stays_bounded() {
        let replies = (0..20)
            .map(|i| Ok(format!("Answer number {} is right here", i)))
            .collect();
        let mut session = session(MockBackend::new(replies));
        for i in 0..20 {
            session.respond(&format!("question {}", i)).await;
            assert!(session.history().len() <= 16);
        }
        assert_eq!(session.history().len(), 16);
    }

    #[tokio::test]
    async fn foreign_output_is_redirected() {
        let mut session = session(MockBackend::new(vec![Ok(
            "Je suis content de vous aider avec cette question".to_string(),
        )]));
        let reply = session.respond("what is the weather").await;
        assert_eq!(reply, ENGLISH_ONLY_REDIRECT);
    }

    #[tokio::test]
    async fn multilingual_policy_keeps_foreign_output() {
        let config = AgentConfig {
            language_policy: LanguagePolicy::Multilingual,
            ..Default::default()
        };
        let backend = MockBackend::new(vec![Ok(
            "Je suis content de vous aider avec cette question".to_string(),
        )]);
        let mut session = Session::new(backend, GenerationParams::default(), config);
        let reply = session.respond("quel temps fait-il").await;
        assert_eq!(reply, "Je suis content de vous aider avec cette question.");
    }

    #[tokio::test]
    async fn long_replies_are_truncated() {
        let long = format!("The answer is {}", "very ".repeat(200));
        let mut session = session(MockBackend::new(vec![Ok(long)]));
        let reply = session.respond("how long is it").await;

        assert_eq!(reply.chars().count(), 500);
        assert!(reply.ends_with("..."));
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_response("short", 500), "short");
        let text = "é".repeat(600);
        let cut = truncate_response(&text, 500);
        assert_eq!(cut.chars().count(), 500);
        assert!(cut.starts_with("ééé"));
    }
}
