// Interactive terminal - rustyline input, session output

use crate::agent::{Session, Turn, persona};
use crate::engine::CompletionBackend;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::{Path, PathBuf};
use tokio::signal;
use tracing::{info, warn};

const PROMPT: &str = "You: ";

/// `~/.bissi_history`, or the working directory without a home.
pub fn default_history_file() -> PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".bissi_history"))
        .unwrap_or_else(|| PathBuf::from(".bissi_history"))
}

/// Run the conversation until quit, end of input or Ctrl-C.
pub async fn run<B: CompletionBackend>(
    mut session: Session<B>,
    history_file: &Path,
) -> Result<(), ReadlineError> {
    let mut rl = DefaultEditor::new()?;
    if history_file.exists()
        && let Err(e) = rl.load_history(history_file)
    {
        warn!(error = %e, "failed to load input history");
    }

    let name = session.name().to_string();
    print_banner(&name);
    say(&name, &session.greeting());
    println!();

    loop {
        let line = match rl.readline(PROMPT) {
            Ok(line) => line,
            Err(e) => match farewell_on_read(&e) {
                Some(farewell) => {
                    println!();
                    say(&name, farewell);
                    break;
                }
                None => {
                    save_history(&mut rl, history_file);
                    return Err(e);
                }
            },
        };

        if !line.trim().is_empty() {
            let _ = rl.add_history_entry(line.trim());
        }

        let turn = tokio::select! {
            turn = session.handle(&line) => turn,
            _ = signal::ctrl_c() => {
                info!("interrupted during generation");
                println!("\n");
                say(&name, persona::FAREWELL_INTERRUPT);
                break;
            }
        };

        match turn {
            Turn::Ignored => continue,
            Turn::Quit(farewell) => {
                say(&name, farewell);
                break;
            }
            Turn::Help(text) => println!("{}", text),
            Turn::Cleared(text) | Turn::Reply(text) => say(&name, &text),
        }
        println!();
    }

    save_history(&mut rl, history_file);
    Ok(())
}

/// Ctrl-C or Ctrl-D at the prompt ends the session quietly; anything else is
/// a terminal error.
fn farewell_on_read(err: &ReadlineError) -> Option<&'static str> {
    match err {
        ReadlineError::Interrupted | ReadlineError::Eof => Some(persona::FAREWELL_EOF),
        _ => None,
    }
}

fn print_banner(name: &str) {
    println!("{}", "=".repeat(60));
    println!("{} - Assistant IA Multilingue", name);
    println!("💡 Astuce: Tapez 'help' pour les commandes");
    println!("{}", "=".repeat(60));
    println!();
}

fn say(name: &str, text: &str) {
    println!("{}: {}", name, text);
}

fn save_history(rl: &mut DefaultEditor, history_file: &Path) {
    if let Err(e) = rl.save_history(history_file) {
        warn!(error = %e, "failed to save input history");
    }
}
