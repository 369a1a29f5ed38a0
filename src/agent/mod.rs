// Agent module - conversation orchestration
//
// Input flows through the session: command matching, greeting fast path,
// prompt assembly, the retry wrapper and final checks, then into history.

pub mod command;
pub mod error;
pub mod history;
pub mod inference;
pub mod persona;
pub mod prompt;
pub mod session;
pub mod types;

pub use session::{Session, Turn};
pub use types::AgentConfig;
