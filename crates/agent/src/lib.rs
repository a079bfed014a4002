//! Reply generation for the chatbot.
//!
//! An inbound question flows through a fixed pipeline:
//! 1. **Prompt** (`prompt`) - wrap the question in the persona conversation
//! 2. **Generation** (`providers`) - call the configured third-party text endpoint
//! 3. **Post-processing** (`reply`) - normalise whitespace, peel off the emotion marker
//! 4. **Image pick** (`orchestrator`) - emotion tag, then dictionary keyword, then random
//!
//! Generator failures never surface to callers; they turn into a fixed apology reply.

pub mod llm;
pub mod orchestrator;
pub mod prompt;
pub mod providers;
pub mod reply;

pub use llm::{ChatMessage, GeneratorError, Role, TextGenerator};
pub use orchestrator::{ChatReply, ReplyChannel, ReplyOrchestrator};
pub use providers::HttpTextGenerator;
