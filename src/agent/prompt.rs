// Prompt assembly

use super::history::History;
use super::types::Role;

/// Persona, the recent exchanges, then the new user turn and a cue for the
/// assistant to answer.
pub fn assemble_prompt(
    persona: &str,
    history: &History,
    user_input: &str,
    assistant_name: &str,
    exchanges: usize,
) -> String {
    let mut prompt = String::with_capacity(persona.len() + user_input.len() + 256);
    prompt.push_str(persona.trim());
    prompt.push_str("\n\nConversation:\n");

    for message in history.recent(exchanges) {
        let speaker = match message.role {
            Role::User => "User",
            Role::Assistant => assistant_name,
        };
        prompt.push_str(speaker);
        prompt.push_str(": ");
        prompt.push_str(&message.content);
        prompt.push('\n');
    }

    prompt.push_str("User: ");
    prompt.push_str(user_input.trim());
    prompt.push('\n');
    prompt.push_str(assistant_name);
    prompt.push(':');
    prompt
}
