// Phrase lists and whole-word matching

use once_cell::sync::Lazy;
use regex::Regex;

/// A fixed list of words or phrases compiled into one case-insensitive,
/// word-bounded regex.
#[derive(Debug, Clone)]
pub struct PhraseSet {
    re: Regex,
}

impl PhraseSet {
    pub fn new(phrases: &[&str]) -> Result<Self, regex::Error> {
        if phrases.is_empty() {
            // Never matches
            return Ok(Self {
                re: Regex::new(r"\b\B")?,
            });
        }

        let alternation = phrases
            .iter()
            .map(|p| {
                p.split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+")
            })
            .collect::<Vec<_>>()
            .join("|");

        let re = Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))?;
        Ok(Self { re })
    }

    /// True if any phrase occurs in `text` as whole words.
    pub fn contains(&self, text: &str) -> bool {
        self.re.is_match(text)
    }

    /// The first phrase occurrence in `text`, as written in `text`.
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.re.find(text).map(|m| m.as_str())
    }
}

const FRENCH_INDICATORS: &[&str] = &[
    "bonjour",
    "salut",
    "merci",
    "au revoir",
    "bienvenue",
    "s'il vous plaît",
    "je suis",
    "comment ça va",
    "ça va",
    "pouvez-vous",
    "pourriez-vous",
];

const SPANISH_INDICATORS: &[&str] = &[
    "hola",
    "gracias",
    "adiós",
    "por favor",
    "cómo estás",
    "puedes",
    "podrías",
];

const GERMAN_INDICATORS: &[&str] = &[
    "hallo",
    "danke",
    "auf wiedersehen",
    "bitte",
    "wie geht's",
    "können sie",
];

const ITALIAN_INDICATORS: &[&str] = &[
    "ciao",
    "grazie",
    "arrivederci",
    "per favore",
    "come stai",
    "puoi",
    "potresti",
];

/// Indicator phrases per language, checked by the language gate.
pub static FOREIGN_LANGUAGES: Lazy<Vec<(&'static str, PhraseSet)>> = Lazy::new(|| {
    [
        ("french", FRENCH_INDICATORS),
        ("spanish", SPANISH_INDICATORS),
        ("german", GERMAN_INDICATORS),
        ("italian", ITALIAN_INDICATORS),
    ]
    .into_iter()
    .map(|(lang, words)| (lang, PhraseSet::new(words).expect("valid regex")))
    .collect()
});

/// Questions about the assistant itself, deflected by the meta gate.
pub static SELF_REFERENCE: Lazy<PhraseSet> = Lazy::new(|| {
    PhraseSet::new(&[
        "who are you",
        "what are you",
        "how were you",
        "who made you",
        "who built you",
        "who created you",
        "are you an ai",
        "are you a bot",
        "are you human",
        "what is your name",
    ])
    .expect("valid regex")
});

/// Common words whose presence marks a response as plausible text.
pub static COMMON_WORDS: Lazy<PhraseSet> = Lazy::new(|| {
    PhraseSet::new(&[
        // English
        "hello", "hi", "hey", "greetings", "help", "thanks", "thank you", "ok", "yes", "no",
        "goodbye", "bye", "clear", "reset", "new", "what", "how", "when", "where", "why", "who",
        "which", "can", "could", "would", "should", "will", "is", "are", "am", "the", "a", "an",
        // French
        "bonjour", "salut", "merci", "au revoir", "comment ça va", "oui", "non", "peut-être",
        "pourquoi", "comment", "quand", "où", "qui", "quoi", "d'accord", "bien", "mal",
        // Spanish
        "hola", "adiós", "gracias", "por favor", "sí", "cómo", "cuándo", "dónde", "por qué",
        "qué", "quién",
        // Tech
        "ai", "artificial intelligence", "machine learning", "neural network", "data",
        "algorithm", "computer", "programming", "code", "model",
    ])
    .expect("valid regex")
});

/// Words that trigger the canned greeting reply instead of inference.
pub static GREETING_WORDS: Lazy<PhraseSet> = Lazy::new(|| {
    PhraseSet::new(&["hello", "hi", "hey", "greetings", "bonjour", "salut"])
        .expect("valid regex")
});
