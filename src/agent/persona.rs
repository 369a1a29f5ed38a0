// Persona instructions and the canned lines the assistant says

use crate::cleaner::LanguagePolicy;
use rand::seq::SliceRandom;

/// Persona used when responses must be in English
const ENGLISH_PERSONA: &str = "You are {name}, a helpful AI assistant.
- Always answer in English.
- Be clear, concise and informative.
- If you do not know something, say so simply.
- Be friendly and professional.";

/// Persona used when any language is accepted; French first
const MULTILINGUAL_PERSONA: &str = "Tu es {name}, une IA d'assistance multilingue avec le français comme langue principale.
- Réponds principalement en français, sauf si on te demande une autre langue.
- Sois clair, concis et informatif dans tes réponses.
- Si tu ne sais pas quelque chose, dis-le simplement.
- Sois amical et professionnel dans tes réponses.
- Tu peux répondre dans d'autres langues si on te le demande.";

pub fn persona_for(policy: LanguagePolicy, name: &str) -> String {
    let template = match policy {
        LanguagePolicy::EnglishOnly => ENGLISH_PERSONA,
        LanguagePolicy::Multilingual => MULTILINGUAL_PERSONA,
    };
    template.replace("{name}", name)
}

pub const GREETING_OPENERS: &[&str] = &["Bonjour", "Salut", "Bonsoir", "Coucou"];

pub const GREETING_QUESTIONS: &[&str] = &[
    "Comment puis-je vous aider aujourd'hui ?",
    "Comment puis-je vous être utile ?",
    "Puis-je vous aider ?",
    "Que puis-je pour vous ?",
];

/// Replies to a greeting typed by the user; no inference involved
pub const GREETING_REPLIES: &[&str] = &[
    "Bonjour ! Comment puis-je vous aider aujourd'hui ?",
    "Salut ! Comment puis-je vous être utile ?",
    "Bonsoir ! En quoi puis-je vous aider ?",
];

/// Used when every inference attempt failed
pub const FALLBACK_RESPONSES: &[&str] = &[
    "Je ne suis pas tout à fait sûr de comprendre. Pourriez-vous fournir plus de contexte ou reformuler votre question ?",
    "Je veux m'assurer de bien comprendre votre question. Pourriez-vous fournir plus de détails ?",
    "Je m'efforce de fournir des réponses complètes. Pourriez-vous essayer de formuler votre question différemment ?",
    "Pour vous fournir la meilleure réponse possible, pourriez-vous préciser votre demande ?",
];

pub const CLARIFICATION_REQUEST: &str =
    "Je ne suis pas sûr de comprendre. Pourriez-vous reformuler ou fournir plus de détails ?";

pub const INCOHERENT_REPLY: &str = "Je m'excuse, mais j'ai du mal à générer une réponse appropriée. Pourriez-vous reformuler votre question en français ou en anglais ?";

pub const APOLOGY: &str = "Désolé, une erreur s'est produite. Veuillez réessayer.";

pub const FAREWELL_QUIT: &str = "Au revoir ! Passez une excellente journée ! 👋";
pub const FAREWELL_EOF: &str = "Au revoir ! 👋";
pub const FAREWELL_INTERRUPT: &str = "Interrompu ! Au revoir ! 👋";

pub const CLEARED: &str = "Conversation effacée ! Recommençons depuis le début.";

pub const HELP_TEXT: &str = "
    Commandes disponibles :
  • quit/exit/bye/goodbye/d - Quitter la conversation
  • clear/reset/new - Effacer l'historique
  • help/?/commands - Afficher cette aide
";

/// Opener and question picked independently.
pub fn random_greeting() -> String {
    let mut rng = rand::thread_rng();
    let opener = GREETING_OPENERS.choose(&mut rng).unwrap_or(&"Bonjour");
    let question = GREETING_QUESTIONS
        .choose(&mut rng)
        .unwrap_or(&"Que puis-je pour vous ?");
    format!("{} ! {}", opener, question)
}

pub fn random_greeting_reply() -> &'static str {
    pick(GREETING_REPLIES)
}

pub fn random_fallback() -> &'static str {
    pick(FALLBACK_RESPONSES)
}

fn pick(choices: &[&'static str]) -> &'static str {
    choices
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(APOLOGY)
}
