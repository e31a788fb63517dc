//! Answer generation with a chat-completion model

mod composer;
mod groq;
pub mod prompt;

pub use composer::{AnswerComposer, NOT_FOUND_MESSAGE, NO_DOCUMENTS_MESSAGE};
pub use groq::GroqClient;
pub use prompt::PromptBuilder;
