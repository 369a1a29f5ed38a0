// Incoherence gate

use super::phrases::COMMON_WORDS;

/// Verdict of the incoherence heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coherence {
    /// Contains at least one common word
    Coherent,
    /// No common word, but nothing else looks wrong
    Suspect,
    /// No common word and an odd length or mostly non-ASCII
    Incoherent,
}

impl Coherence {
    pub fn assess(text: &str) -> Self {
        if COMMON_WORDS.contains(text) {
            return Coherence::Coherent;
        }

        let total = text.chars().count();
        if !(3..=1000).contains(&total) {
            return Coherence::Incoherent;
        }

        let non_ascii = text.chars().filter(|c| !c.is_ascii()).count();
        if non_ascii as f64 / total as f64 > 0.5 {
            return Coherence::Incoherent;
        }

        Coherence::Suspect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_words_pass() {
        assert_eq!(Coherence::assess("What is the capital?"), Coherence::Coherent);
        assert_eq!(Coherence::assess("Merci beaucoup."), Coherence::Coherent);
    }

    #[test]
    fn plain_ascii_without_common_words_is_suspect() {
        assert_eq!(Coherence::assess("Photosynthesis converts light."), Coherence::Suspect);
    }

    #[test]
    fn mostly_non_ascii_is_incoherent() {
        assert_eq!(Coherence::assess("ლორემ იფსუმ დოლორ"), Coherence::Incoherent);
    }

    #[test]
    fn odd_lengths_are_incoherent() {
        assert_eq!(Coherence::assess("zq"), Coherence::Incoherent);
        assert_eq!(Coherence::assess(&"xyzzy ".repeat(200)), Coherence::Incoherent);
    }
}
