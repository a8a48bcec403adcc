use serde::{Deserialize, Serialize};

use super::prompts::END_OF_HISTORY;
use crate::llm::ChatMessage;

/// One exchange of a past conversation. Either side may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub ai: Option<String>,
}

impl ConversationTurn {
    pub fn new(user: Option<&str>, ai: Option<&str>) -> Self {
        Self {
            user: user.map(str::to_string),
            ai: ai.map(str::to_string),
        }
    }
}

/// Expands turns into chat messages (user first) and closes them with the
/// end-of-history marker. Role alternation is not checked or repaired.
pub fn flatten_history(history: &[ConversationTurn]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() * 2 + 1);
    for turn in history {
        if let Some(user) = non_empty(&turn.user) {
            messages.push(ChatMessage::user(user));
        }
        if let Some(ai) = non_empty(&turn.ai) {
            messages.push(ChatMessage::assistant(ai));
        }
    }
    messages.push(ChatMessage::system(END_OF_HISTORY));
    messages
}

fn non_empty(text: &Option<String>) -> Option<&str> {
    text.as_deref().filter(|t| !t.is_empty())
}
