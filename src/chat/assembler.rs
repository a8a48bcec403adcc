//! Builds completion requests around retrieved context and shapes replies.

use std::sync::Arc;

use super::history::{flatten_history, ConversationTurn};
use super::prompts;
use super::types::{AnswerEnvelope, DraftEnvelope, DraftReply};
use crate::core::config::{LlmSettings, RetrievalSettings};
use crate::core::errors::UpstreamError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::rag::Retriever;

#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    /// Candidates requested when the answer path has to retrieve by itself.
    pub answer_top_k: usize,
}

impl SamplingConfig {
    pub fn from_settings(llm: &LlmSettings, retrieval: &RetrievalSettings) -> Self {
        Self {
            model: llm.model.clone(),
            temperature: llm.temperature,
            top_p: llm.top_p,
            answer_top_k: retrieval.answer_top_k,
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self::from_settings(&LlmSettings::default(), &RetrievalSettings::default())
    }
}

pub struct ResponseAssembler {
    llm: Arc<dyn LlmProvider>,
    retriever: Arc<dyn Retriever>,
    config: SamplingConfig,
}

impl ResponseAssembler {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        retriever: Arc<dyn Retriever>,
        config: SamplingConfig,
    ) -> Self {
        Self {
            llm,
            retriever,
            config,
        }
    }

    /// Answers `user_input`, retrieving context only when none was supplied.
    pub async fn answer(
        &self,
        access_token: &str,
        user_input: &str,
        context_text: Option<String>,
        history: &[ConversationTurn],
    ) -> Result<AnswerEnvelope, UpstreamError> {
        let context = match context_text {
            Some(context) => context,
            None => {
                tracing::debug!("No context supplied; retrieving for answer");
                self.retriever
                    .search(user_input, self.config.answer_top_k)
                    .await
                    .context_text
            }
        };

        let messages = build_answer_messages(&context, history, user_input);
        let answer = self.complete(access_token, messages).await?;
        tracing::info!(
            "Answer generated ({} chars, {} history turns)",
            answer.chars().count(),
            history.len()
        );

        Ok(AnswerEnvelope { answer, context })
    }

    /// Asks the model for a forum help post. The output is returned verbatim.
    pub async fn draft_post(
        &self,
        access_token: &str,
        history: &[ConversationTurn],
        final_question: &str,
    ) -> Result<DraftReply, UpstreamError> {
        let messages = build_draft_messages(history, final_question);
        let draft = self.complete(access_token, messages).await?;

        match DraftEnvelope::parse(&draft) {
            Some(envelope) => tracing::debug!(
                "Draft parsed: title `{}`, {} key points",
                envelope.title,
                envelope.key_points.len()
            ),
            None => tracing::debug!("Draft is not a bare JSON object; passing through"),
        }

        Ok(DraftReply { draft })
    }

    async fn complete(
        &self,
        access_token: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<String, UpstreamError> {
        let request = ChatRequest::new(self.config.model.clone(), messages)
            .with_sampling(self.config.temperature, self.config.top_p);
        tracing::debug!(
            "Sending {} messages to {} ({})",
            request.messages.len(),
            self.llm.name(),
            request.model
        );
        self.llm.chat(access_token, &request).await.map_err(|err| {
            tracing::error!("Completion failed: {}", err);
            err
        })
    }
}

pub fn build_answer_messages(
    context: &str,
    history: &[ConversationTurn],
    user_input: &str,
) -> Vec<ChatMessage> {
    let mut system = String::from(prompts::SENPAI_SYSTEM_PROMPT);
    system.push_str(prompts::CONTEXT_HEADER);
    system.push_str(context);
    if !history.is_empty() {
        system.push_str(prompts::ANSWER_HISTORY_HEADER);
    }

    let mut messages = vec![ChatMessage::system(system)];
    if !history.is_empty() {
        messages.extend(flatten_history(history));
    }
    messages.push(ChatMessage::user(prompts::final_question(user_input)));
    messages
}

pub fn build_draft_messages(history: &[ConversationTurn], final_question: &str) -> Vec<ChatMessage> {
    let system = format!(
        "{}{}",
        prompts::DRAFT_SYSTEM_PROMPT,
        prompts::DRAFT_HISTORY_HEADER
    );

    let mut messages = vec![ChatMessage::system(system)];
    messages.extend(flatten_history(history));
    messages.push(ChatMessage::user(prompts::final_question(final_question)));
    messages
}
