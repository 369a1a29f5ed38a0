// Cleaner stages - each one total over any input

use once_cell::sync::Lazy;
use regex::Regex;

use super::phrases::{FOREIGN_LANGUAGES, SELF_REFERENCE};
use super::{Cleaner, LanguagePolicy};

/// Responses shorter than this (in characters) are discarded.
pub const MIN_CLEAN_CHARS: usize = 10;

pub const ENGLISH_ONLY_REDIRECT: &str =
    "I'm sorry, I can only respond in English. Could you please rephrase your question in English?";

pub const META_DEFLECTION: &str =
    "I'm here to help answer your questions. What would you like to know?";

/// Outcome of one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Hand the rewritten text to the next stage
    Continue(String),
    /// Stop the pipeline with this final value
    Finish(String),
}

/// A named step of the cleaning pipeline
#[derive(Clone, Copy)]
pub struct Stage {
    pub name: &'static str,
    pub apply: fn(&Cleaner, &str) -> Flow,
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage").field("name", &self.name).finish()
    }
}

/// The fixed pipeline, in order.
pub fn pipeline() -> Vec<Stage> {
    vec![
        Stage {
            name: "strip_role_label",
            apply: |c, t| Flow::Continue(c.strip_role_label(t)),
        },
        Stage {
            name: "drop_incomplete_list_item",
            apply: |_, t| Flow::Continue(drop_incomplete_list_item(t)),
        },
        Stage {
            name: "collapse_whitespace",
            apply: |_, t| Flow::Continue(collapse_whitespace(t)),
        },
        Stage {
            name: "strip_filler_prefixes",
            apply: |_, t| Flow::Continue(strip_filler_prefixes(t)),
        },
        Stage {
            name: "strip_markup",
            apply: |_, t| Flow::Continue(strip_markup(t)),
        },
        Stage {
            name: "trim_edges",
            apply: |_, t| Flow::Continue(trim_edges(t)),
        },
        Stage {
            name: "collapse_ellipsis",
            apply: |_, t| Flow::Continue(collapse_ellipsis(t)),
        },
        Stage {
            name: "enforce_min_length",
            apply: |_, t| enforce_min_length(t),
        },
        Stage {
            name: "capitalize_first",
            apply: |_, t| Flow::Continue(capitalize_first(t)),
        },
        Stage {
            name: "ensure_terminal_punctuation",
            apply: |_, t| Flow::Continue(ensure_terminal_punctuation(t)),
        },
        Stage {
            name: "repair_truncation",
            apply: |_, t| Flow::Continue(repair_truncation(t)),
        },
        Stage {
            name: "language_gate",
            apply: |c, t| language_gate(c.policy(), t),
        },
        Stage {
            name: "meta_gate",
            apply: |_, t| meta_gate(t),
        },
    ]
}

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

static ELLIPSIS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{3,}").expect("valid regex"));

static LIST_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:(?:10|[1-9])\.|[-*•→>])$").expect("valid regex"));

/// Filler, hedge and disclaimer openers. Longer disclaimers come before
/// their shorter forms so a single pass removes the whole phrase.
///
/// Each opener must be followed by punctuation, whitespace or the end of the
/// text, so `Hi-res` and `No. 5` are left alone.
static FILLER_PREFIXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    const INTERJECTION_END: &str = r"(?:[,!]+\s*|\s+|$)";
    const PHRASE_END: &str = r"(?:[\s.,!]+|$)";

    let interjections = [
        "hey", "hi", "hello", r"of\s+course", "sure", "ah", "oh", "um", "uh",
    ]
    .map(|word| format!("^{}{}", word, INTERJECTION_END));

    // Only stripped when punctuation marks them as a standalone reply
    let answers = [r"^yes\s*[,!]+\s*", r"^no\s*[,!]+\s*", r"^well\s*[,!.]+\s*", r"^so\s*[,!.]+\s*"]
        .map(str::to_string);

    let phrases = [
        r"let\s+me\s+think",
        r"let\s+me\s+see",
        r"i['’]?m\s+not\s+sure",
        r"i\s+think",
        r"i\s+believe",
        r"i\s+would\s+say",
        r"that['’]?s\s+a\s+good\s+question",
        r"that['’]?s\s+an\s+interesting\s+question",
        r"as\s+an?\s+ai\s+language\s+model",
        r"as\s+an?\s+ai\s+assistant",
        r"as\s+your\s+ai\s+assistant",
        r"as\s+an?\s+artificial\s+intelligence",
        r"as\s+a\s+language\s+model",
        r"as\s+an?\s+ai",
        r"bienvenue",
        r"mon\s+ami",
        r"j['’]ai\s+les\s+bonnes\s+mani[èe]res",
        r"merci\s+pour\s+votre\s+confiance",
        r"je\s+suis\s+d[ée]sol[ée]e?",
        r"je\s+ne\s+comprends\s+pas",
    ]
    .map(|phrase| format!("^{}{}", phrase, PHRASE_END));

    interjections
        .into_iter()
        .chain(answers)
        .chain(phrases)
        .map(|p| Regex::new(&format!("(?i){}", p)).expect("valid regex"))
        .collect()
});

const SOFT_PAUSE: &[char] = &[',', ';', ':', '-', '–', '—'];

/// Removes the last line when it holds nothing but a list marker.
pub fn drop_incomplete_list_item(text: &str) -> String {
    let body = text.trim_end();
    let (head, last) = match body.rfind('\n') {
        Some(idx) => (&body[..idx], &body[idx + 1..]),
        None => ("", body),
    };

    if LIST_MARKER_RE.is_match(last.trim()) {
        head.trim_end().to_string()
    } else {
        text.to_string()
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

/// Applies the filler patterns in order, repeating until none matches.
pub fn strip_filler_prefixes(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let before = current.len();
        for re in FILLER_PREFIXES.iter() {
            if let std::borrow::Cow::Owned(next) = re.replace(&current, "") {
                current = next;
            }
        }
        if current.len() == before {
            return current;
        }
    }
}

pub fn strip_markup(text: &str) -> String {
    collapse_whitespace(&TAG_RE.replace_all(text, ""))
}

/// Leading punctuation and trailing soft pauses. Leading dots go only when
/// they stand apart from the first word, so `.NET` keeps its dot.
pub fn trim_edges(text: &str) -> String {
    let mut rest = text.trim();
    loop {
        let next = rest.trim_start_matches(|c: char| c.is_whitespace() || ",;:!?".contains(c));
        let undotted = next.trim_start_matches('.');
        let next = if undotted.is_empty() || undotted.starts_with(char::is_whitespace) {
            undotted
        } else {
            next
        };
        if next.len() == rest.len() {
            break;
        }
        rest = next;
    }
    rest.trim_end_matches(|c: char| c.is_whitespace() || ",;:".contains(c))
        .to_string()
}

pub fn collapse_ellipsis(text: &str) -> String {
    ELLIPSIS_RE.replace_all(text, "...").into_owned()
}

pub fn enforce_min_length(text: &str) -> Flow {
    if text.chars().count() < MIN_CLEAN_CHARS {
        Flow::Finish(String::new())
    } else {
        Flow::Continue(text.to_string())
    }
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() => first.to_uppercase().chain(chars).collect(),
        _ => text.to_string(),
    }
}

pub fn ensure_terminal_punctuation(text: &str) -> String {
    let trimmed = text.trim_end();
    match trimmed.chars().last() {
        None => String::new(),
        Some(c) if SOFT_PAUSE.contains(&c) => format!("{}.", trim_soft_pause(trimmed, SOFT_PAUSE)),
        Some('.' | '!' | '?') => trimmed.to_string(),
        Some(_) => format!("{}.", trimmed),
    }
}

/// Second pass over trailing pause marks, also catching a dangling bullet.
pub fn repair_truncation(text: &str) -> String {
    const CUTOFF: &[char] = &[',', ';', ':', '-', '–', '—', '•'];
    let trimmed = text.trim_end();
    match trimmed.chars().last() {
        Some(c) if CUTOFF.contains(&c) => format!("{}.", trim_soft_pause(trimmed, CUTOFF)),
        _ => trimmed.to_string(),
    }
}

fn trim_soft_pause<'a>(text: &'a str, marks: &[char]) -> &'a str {
    text.trim_end_matches(|c: char| c == ' ' || marks.contains(&c))
}

pub fn language_gate(policy: LanguagePolicy, text: &str) -> Flow {
    if policy == LanguagePolicy::EnglishOnly {
        for (lang, indicators) in FOREIGN_LANGUAGES.iter() {
            if let Some(hit) = indicators.find(text) {
                tracing::debug!(language = lang, indicator = hit, "non-English response rejected");
                return Flow::Finish(ENGLISH_ONLY_REDIRECT.to_string());
            }
        }
    }
    Flow::Continue(text.to_string())
}

pub fn meta_gate(text: &str) -> Flow {
    match SELF_REFERENCE.find(text) {
        Some(hit) => {
            tracing::debug!(phrase = hit, "self-referential response deflected");
            Flow::Finish(META_DEFLECTION.to_string())
        }
        None => Flow::Continue(text.to_string()),
    }
}
