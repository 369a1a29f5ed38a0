// Control commands typed at the prompt

/// What a line of input asks the loop to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Clear,
    Help,
    /// Not a command; the line goes to the model
    None,
}

const COMMANDS: &[(&str, Command)] = &[
    ("quit", Command::Quit),
    ("exit", Command::Quit),
    ("bye", Command::Quit),
    ("goodbye", Command::Quit),
    ("d", Command::Quit),
    ("clear", Command::Clear),
    ("reset", Command::Clear),
    ("new", Command::Clear),
    ("help", Command::Help),
    ("?", Command::Help),
    ("commands", Command::Help),
];

impl Command {
    /// Exact, case-insensitive match on the trimmed line.
    pub fn parse(input: &str) -> Self {
        let normalized = input.trim().to_lowercase();
        COMMANDS
            .iter()
            .find(|(word, _)| *word == normalized)
            .map(|(_, command)| *command)
            .unwrap_or(Command::None)
    }
}
