#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use senpai_backend::core::config::{IndexBackend, Settings};
use senpai_backend::core::errors::UpstreamError;
use senpai_backend::llm::{ChatRequest, LlmProvider};
use senpai_backend::rag::{Embedder, EmbeddingInput, InMemoryIndex, VectorIndex};
use senpai_backend::server;
use senpai_backend::state::AppState;

pub const DIMENSION: usize = 16;

/// Deterministic character-histogram embedder; identical texts embed identically.
#[derive(Default)]
pub struct HistogramEmbedder {
    pub calls: AtomicUsize,
    pub modes: Mutex<Vec<EmbeddingInput>>,
}

impl HistogramEmbedder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for HistogramEmbedder {
    fn name(&self) -> &str {
        "histogram"
    }

    async fn embed(&self, text: &str, input: EmbeddingInput) -> Result<Vec<f32>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.modes.lock().unwrap().push(input);
        let mut vector = vec![0.0; DIMENSION];
        for ch in text.chars() {
            vector[ch as usize % DIMENSION] += 1.0;
        }
        Ok(vector)
    }
}

/// Records every completion request and replies with a fixed text.
pub struct RecordingLlm {
    pub reply: String,
    pub requests: Mutex<Vec<(String, ChatRequest)>>,
}

impl RecordingLlm {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(String, ChatRequest)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for RecordingLlm {
    fn name(&self) -> &str {
        "recording"
    }

    async fn chat(&self, access_token: &str, request: &ChatRequest) -> Result<String, UpstreamError> {
        self.requests
            .lock()
            .unwrap()
            .push((access_token.to_string(), request.clone()));
        Ok(self.reply.clone())
    }
}

pub struct TestApp {
    pub base: String,
    pub embedder: Arc<HistogramEmbedder>,
    pub index: Arc<InMemoryIndex>,
    pub llm: Arc<RecordingLlm>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.pinecone.backend = IndexBackend::Memory;
    settings.pinecone.index_name = "vec-test".to_string();
    settings.pinecone.dimension = DIMENSION;
    settings.network.max_retries = 0;
    settings
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(RecordingLlm::replying("學長的回覆")).await
}

pub async fn spawn_app_with(llm: RecordingLlm) -> TestApp {
    let settings = test_settings();
    let embedder = Arc::new(HistogramEmbedder::default());
    let index = Arc::new(InMemoryIndex::new(settings.pinecone.index_name.clone()));
    let llm = Arc::new(llm);

    let state = AppState::from_parts(
        settings,
        Some(embedder.clone() as Arc<dyn Embedder>),
        Some(index.clone() as Arc<dyn VectorIndex>),
        llm.clone(),
    );
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    TestApp {
        base: format!("http://{}", addr),
        embedder,
        index,
        llm,
        handle,
    }
}
