// Conversation history - bounded, oldest messages dropped first

use super::types::Message;
#[cfg(test)]
use super::types::Role;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct History {
    messages: VecDeque<Message>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Record one turn: the user's message, then the reply. Whole exchanges
    /// are dropped from the front, so the history always starts with a user
    /// message.
    pub fn push_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.messages.push_back(Message::user(user));
        self.messages.push_back(Message::assistant(assistant));
        while self.messages.len() > self.limit {
            self.messages.pop_front();
            self.messages.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[cfg(test)]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The last `exchanges` user/assistant pairs, oldest first.
    pub fn recent(&self, exchanges: usize) -> impl Iterator<Item = &Message> {
        let skip = self.messages.len().saturating_sub(exchanges * 2);
        self.messages.iter().skip(skip)
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    #[cfg(test)]
    pub fn last_reply(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }
}
