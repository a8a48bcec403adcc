//! Prompt assembly around the retrieval pipeline and the completion service.

pub mod assembler;
pub mod history;
pub mod prompts;
pub mod types;

pub use assembler::{ResponseAssembler, SamplingConfig};
pub use history::{flatten_history, ConversationTurn};
pub use types::{AnswerEnvelope, DraftEnvelope, DraftReply};
