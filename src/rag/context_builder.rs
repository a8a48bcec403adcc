//! Turns a raw index response into a [`SearchResult`].
//!
//! 1. Drops matches scoring at or below the relevance threshold
//! 2. Keeps the first N survivors in index order (never re-ranked)
//! 3. Renders them as Q/A blocks for the prompt

use thiserror::Error;

use super::types::{Match, QueryResponse, SearchResult, NO_RESULTS_CONTEXT};

const ENTRY_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextBuilderConfig {
    /// Matches must score strictly above this.
    pub score_threshold: f64,
    /// Maximum number of matches rendered into the context.
    pub max_matches: usize,
}

impl Default for ContextBuilderConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.5,
            max_matches: 3,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ContextError {
    #[error("match `{id}` has no `{field}` metadata")]
    MissingMetadata { id: String, field: &'static str },
}

#[derive(Debug, Clone, Default)]
pub struct RAGContextBuilder {
    config: ContextBuilderConfig,
}

impl RAGContextBuilder {
    pub fn new(config: ContextBuilderConfig) -> Self {
        Self { config }
    }

    pub fn filter_relevant(&self, matches: Vec<Match>) -> Vec<Match> {
        matches
            .into_iter()
            .filter(|m| m.score > self.config.score_threshold)
            .collect()
    }

    pub fn build(&self, response: QueryResponse) -> Result<SearchResult, ContextError> {
        let matches = self.filter_relevant(response.matches);
        let top_matches: Vec<Match> = matches
            .iter()
            .take(self.config.max_matches)
            .cloned()
            .collect();

        let mut entries = Vec::with_capacity(top_matches.len());
        let mut sources = Vec::with_capacity(top_matches.len());
        let mut ids = Vec::with_capacity(top_matches.len());
        for m in &top_matches {
            let (source, content) = required_fields(m)?;
            entries.push(format!("Q: {}\nA: {}", source, content));
            sources.push(source.to_string());
            ids.push(m.id.clone());
        }

        let context_text = if entries.is_empty() {
            NO_RESULTS_CONTEXT.to_string()
        } else {
            entries.join(ENTRY_SEPARATOR)
        };

        Ok(SearchResult {
            matches,
            top_matches,
            context_text,
            sources,
            ids,
            usage: response.usage,
            error: None,
        })
    }
}

fn required_fields(m: &Match) -> Result<(&str, &str), ContextError> {
    let source = m
        .metadata
        .source
        .as_deref()
        .ok_or_else(|| ContextError::MissingMetadata {
            id: m.id.clone(),
            field: "source",
        })?;
    let content = m
        .metadata
        .content
        .as_deref()
        .ok_or_else(|| ContextError::MissingMetadata {
            id: m.id.clone(),
            field: "content",
        })?;
    Ok((source, content))
}

/// Whether `matches` is in non-increasing score order.
pub fn is_score_descending(matches: &[Match]) -> bool {
    matches.windows(2).all(|pair| pair[0].score >= pair[1].score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::types::MatchMetadata;

    fn make_match(id: &str, score: f64) -> Match {
        Match {
            id: id.to_string(),
            score,
            metadata: MatchMetadata::new(format!("title-{}", id), format!("body-{}", id)),
        }
    }

    fn response(matches: Vec<Match>) -> QueryResponse {
        QueryResponse {
            matches,
            usage: None,
        }
    }

    #[test]
    fn threshold_is_strict() {
        let builder = RAGContextBuilder::default();
        let kept = builder.filter_relevant(vec![
            make_match("a", 0.3),
            make_match("b", 0.5),
            make_match("c", 0.51),
            make_match("d", 0.9),
        ]);

        let scores: Vec<f64> = kept.iter().map(|m| m.score).collect();
        assert_eq!(scores, vec![0.51, 0.9]);
    }

    #[test]
    fn score_just_above_threshold_survives_parsing() {
        let edge: Match = serde_json::from_value(serde_json::json!({
            "id": "edge",
            "score": 0.50000001,
            "metadata": {"source": "T", "content": "C"}
        }))
        .unwrap();

        let kept = RAGContextBuilder::default().filter_relevant(vec![edge]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "edge");
    }

    #[test]
    fn truncates_to_first_three_without_resorting() {
        let builder = RAGContextBuilder::default();
        let result = builder
            .build(response(vec![
                make_match("a", 0.9),
                make_match("b", 0.6),
                make_match("c", 0.8),
                make_match("d", 0.95),
                make_match("e", 0.7),
            ]))
            .unwrap();

        assert_eq!(result.matches.len(), 5);
        assert_eq!(result.ids, vec!["a", "b", "c"]);
        assert_eq!(result.sources, vec!["title-a", "title-b", "title-c"]);
        assert_eq!(result.top_matches.len(), 3);
    }

    #[test]
    fn renders_question_answer_blocks() {
        let builder = RAGContextBuilder::default();
        let result = builder
            .build(response(vec![make_match("a", 0.9), make_match("b", 0.8)]))
            .unwrap();

        assert_eq!(
            result.context_text,
            "Q: title-a\nA: body-a\n\n---\n\nQ: title-b\nA: body-b"
        );
    }

    #[test]
    fn empty_after_filter_yields_sentinel() {
        let builder = RAGContextBuilder::default();
        let result = builder
            .build(response(vec![make_match("a", 0.2), make_match("b", 0.5)]))
            .unwrap();

        assert!(result.matches.is_empty());
        assert!(result.sources.is_empty());
        assert!(result.ids.is_empty());
        assert_eq!(result.context_text, NO_RESULTS_CONTEXT);
        assert!(result.error.is_none());
    }

    #[test]
    fn parallel_arrays_hold_for_any_size() {
        let builder = RAGContextBuilder::default();
        for size in 0..=50 {
            let matches = (0..size)
                .map(|i| make_match(&i.to_string(), 1.0 - i as f64 * 0.01))
                .collect();
            let result = builder.build(response(matches)).unwrap();

            assert_eq!(result.sources.len(), result.ids.len());
            assert_eq!(result.ids.len(), result.top_matches.len());
            assert!(result.top_matches.len() <= 3);
            assert!(result.top_matches.len() <= result.matches.len());
        }
    }

    #[test]
    fn missing_source_in_top_match_is_an_error() {
        let builder = RAGContextBuilder::default();
        let mut broken = make_match("x", 0.9);
        broken.metadata.source = None;

        let err = builder.build(response(vec![broken])).unwrap_err();
        assert_eq!(
            err,
            ContextError::MissingMetadata {
                id: "x".into(),
                field: "source"
            }
        );
    }

    #[test]
    fn missing_metadata_outside_top_matches_is_tolerated() {
        let builder = RAGContextBuilder::new(ContextBuilderConfig {
            score_threshold: 0.5,
            max_matches: 1,
        });
        let mut tail = make_match("tail", 0.6);
        tail.metadata = MatchMetadata::default();

        let result = builder
            .build(response(vec![make_match("head", 0.9), tail]))
            .unwrap();
        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.ids, vec!["head"]);
    }

    #[test]
    fn detects_unsorted_responses() {
        assert!(is_score_descending(&[make_match("a", 0.9), make_match("b", 0.9)]));
        assert!(!is_score_descending(&[make_match("a", 0.6), make_match("b", 0.9)]));
    }
}
