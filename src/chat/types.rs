use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEnvelope {
    pub answer: String,
    /// The context the answer was grounded on, echoed for display.
    pub context: String,
}

/// Raw draft text as produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftReply {
    pub draft: String,
}

/// The shape the draft prompt asks the model to emit.
///
/// Only used for diagnostics; drafts are passed through unparsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftEnvelope {
    pub title: String,
    pub post: String,
    #[serde(default)]
    pub key_points: Vec<String>,
}

impl DraftEnvelope {
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text.trim()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_draft() {
        let draft = DraftEnvelope::parse(
            r#" {"title": "SA 分組問題", "post": "請問...", "key_points": ["a", "b"]} "#,
        )
        .unwrap();
        assert_eq!(draft.title, "SA 分組問題");
        assert_eq!(draft.key_points.len(), 2);
    }

    #[test]
    fn fenced_or_prose_output_does_not_parse() {
        assert!(DraftEnvelope::parse("```json\n{}\n```").is_none());
        assert!(DraftEnvelope::parse("Sure! Here is your post").is_none());
    }
}
