//! RAG response generation.

use super::context::{build_context, collect_sources, distinct_programs};
use super::{AnswerKind, ChatGenerator, ChatRequest, ChatResponse, ChatTurn, HistoryEntry};
use crate::config::{Prompts, RagSettings};
use crate::embedding::Embedder;
use crate::error::{GanjError, Result};
use crate::search::{SearchEngine, SearchHit};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Result of an optional provider call.
enum Outcome<T> {
    Ready(T),
    /// No provider is configured, or there was nothing to send it.
    Unavailable,
    Failed(GanjError),
}

/// RAG engine answering chat messages from the transcript archive.
pub struct RagEngine {
    search: SearchEngine,
    embedder: Option<Arc<dyn Embedder>>,
    generator: Option<Arc<dyn ChatGenerator>>,
    prompts: Prompts,
    settings: RagSettings,
}

impl RagEngine {
    /// Create an engine that answers from search results only.
    pub fn new(search: SearchEngine, settings: RagSettings) -> Self {
        Self {
            search,
            embedder: None,
            generator: None,
            prompts: Prompts::default(),
            settings,
        }
    }

    /// Embed messages so semantic search can be used.
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Generate answers with a chat completion provider.
    pub fn with_generator(mut self, generator: Arc<dyn ChatGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn prompts(&self) -> &Prompts {
        &self.prompts
    }

    /// Reject empty and over-long messages.
    pub fn validate(&self, message: &str) -> Result<()> {
        if message.trim().is_empty() {
            return Err(GanjError::InvalidInput(
                self.prompts.messages.empty_message.clone(),
            ));
        }
        if message.chars().count() > self.settings.max_message_chars {
            return Err(GanjError::InvalidInput(
                self.prompts.messages.message_too_long.clone(),
            ));
        }
        Ok(())
    }

    /// Answer one chat message.
    ///
    /// Validation happens before any provider or store access. Provider
    /// failures degrade the answer; they are never returned as errors.
    #[instrument(skip(self, request), fields(history = request.history.len()))]
    pub async fn respond(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.validate(&request.message)?;
        let message = request.message.trim();
        info!("Processing message ({} chars)", message.chars().count());

        let query_embedding = match self.embed_query(message).await {
            Outcome::Ready(embedding) => Some(embedding),
            Outcome::Unavailable => None,
            Outcome::Failed(e) => {
                warn!("Query embedding failed, using lexical search: {}", e);
                None
            }
        };

        let hits = self
            .search
            .search(message, query_embedding.as_deref(), self.settings.top_k)
            .await;
        debug!("Retrieved {} chunks", hits.len());

        let context = build_context(&hits, &self.prompts.labels, self.settings.max_context_chars);
        let sources = collect_sources(&hits);

        let (response, kind) = match self.generate(&context, message, &request.history).await {
            Outcome::Ready(answer) => (answer, AnswerKind::Generated),
            Outcome::Unavailable => (fallback_answer(&hits, &self.prompts), AnswerKind::Fallback),
            Outcome::Failed(e) => {
                warn!("Generation failed, using templated answer: {}", e);
                (fallback_answer(&hits, &self.prompts), AnswerKind::Fallback)
            }
        };

        Ok(ChatResponse {
            response,
            sources,
            kind,
        })
    }

    async fn embed_query(&self, message: &str) -> Outcome<Vec<f32>> {
        let Some(embedder) = &self.embedder else {
            return Outcome::Unavailable;
        };
        match embedder.embed(message).await {
            Ok(embedding) if !embedding.is_empty() => Outcome::Ready(embedding),
            Ok(_) => Outcome::Failed(GanjError::Embedding("Empty query embedding".to_string())),
            Err(e) => Outcome::Failed(e),
        }
    }

    async fn generate(&self, context: &str, message: &str, history: &[HistoryEntry]) -> Outcome<String> {
        let Some(generator) = &self.generator else {
            return Outcome::Unavailable;
        };
        if context.is_empty() {
            return Outcome::Unavailable;
        }

        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context.to_string());
        let system_prompt = self.prompts.render_with_custom(&self.prompts.rag.system, &vars);

        let turns = self.conversation(message, history);

        match generator.generate(&system_prompt, &turns).await {
            Ok(answer) if answer.trim().is_empty() => {
                Outcome::Ready(self.prompts.rag.empty_completion.clone())
            }
            Ok(answer) => Outcome::Ready(answer),
            Err(e) => Outcome::Failed(e),
        }
    }

    /// Recent history turns followed by the current message.
    fn conversation(&self, message: &str, history: &[HistoryEntry]) -> Vec<ChatTurn> {
        let start = history.len().saturating_sub(self.settings.history_turns);
        let mut turns: Vec<ChatTurn> = history[start..]
            .iter()
            .filter_map(HistoryEntry::to_turn)
            .collect();
        turns.push(ChatTurn::user(message));
        turns
    }
}

/// Templated answer naming up to three of the retrieved programs.
pub fn fallback_answer(hits: &[SearchHit], prompts: &Prompts) -> String {
    if hits.is_empty() {
        return prompts.fallback.no_results.clone();
    }

    let programs = distinct_programs(hits);
    if programs.is_empty() {
        return prompts.fallback.generic.clone();
    }

    let listed = programs
        .iter()
        .take(3)
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(&prompts.labels.list_separator);

    let more = if programs.len() > 3 {
        let mut vars = HashMap::new();
        vars.insert("count".to_string(), (programs.len() - 3).to_string());
        prompts.render_with_custom(&prompts.fallback.more_programs, &vars)
    } else {
        String::new()
    };

    let mut vars = HashMap::new();
    vars.insert("programs".to_string(), listed);
    vars.insert("more".to_string(), more);
    prompts.render_with_custom(&prompts.fallback.programs, &vars)
}

impl ChatResponse {
    /// Format the response for display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.response.clone();

        if !self.sources.is_empty() {
            output.push_str("\n\n--- Sources ---\n");
            for source in &self.sources {
                let number = source
                    .program_number
                    .map(|n| format!("#{}", n))
                    .unwrap_or_default();
                output.push_str(&format!("\n{} {}", number, source.title.as_deref().unwrap_or("")));
                if let Some(score) = source.score {
                    output.push_str(&format!(" (score: {:.2})", score));
                }
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::testing::StubEmbedder;
    use crate::rag::ChatRole;
    use crate::search::SearchMode;
    use crate::vector_store::{Chunk, DocumentStore, MemoryStore, VectorStoreDocument};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct CountingStore {
        inner: MemoryStore,
        loads: AtomicUsize,
    }

    #[async_trait]
    impl DocumentStore for CountingStore {
        async fn load(&self) -> Option<Arc<VectorStoreDocument>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load().await
        }
    }

    #[derive(Default)]
    struct RecordingGenerator {
        answer: String,
        fail: bool,
        calls: Mutex<Vec<(String, Vec<ChatTurn>)>>,
    }

    impl RecordingGenerator {
        fn answering(answer: &str) -> Self {
            Self {
                answer: answer.to_string(),
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl ChatGenerator for RecordingGenerator {
        async fn generate(&self, system_prompt: &str, turns: &[ChatTurn]) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((system_prompt.to_string(), turns.to_vec()));
            if self.fail {
                return Err(GanjError::OpenAI("stub outage".to_string()));
            }
            Ok(self.answer.clone())
        }
    }

    fn chunk(id: &str, program: Option<u32>, text: &str, embedding: Option<Vec<f32>>) -> Chunk {
        Chunk {
            id: id.to_string(),
            program_number: program,
            title: program.map(|n| format!("عنوان {}", n)),
            text: text.to_string(),
            chunk_index: 0,
            embedding,
        }
    }

    fn store(chunks: Vec<Chunk>) -> Arc<CountingStore> {
        let has_embeddings = chunks.iter().any(|c| c.vector().is_some());
        Arc::new(CountingStore {
            inner: MemoryStore::new(VectorStoreDocument::new(chunks, 1, has_embeddings)),
            loads: AtomicUsize::new(0),
        })
    }

    fn lexical_store() -> Arc<CountingStore> {
        store(vec![
            chunk("a", Some(1), "عشق و حضور در مثنوی", None),
            chunk("b", Some(1), "عشق در دفتر اول", None),
            chunk("c", None, "متن عمومی درباره عشق", None),
            chunk("d", Some(2), "سکوت و فضاگشایی", None),
        ])
    }

    fn engine(store: Arc<CountingStore>) -> RagEngine {
        RagEngine::new(SearchEngine::new(store), RagSettings::default())
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let store = lexical_store();
        let rag = engine(store.clone());

        let err = rag.respond(&ChatRequest::new("   ")).await.unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(err.to_string(), Prompts::default().messages.empty_message);
        assert_eq!(store.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_long_message_rejected_before_any_work() {
        let store = lexical_store();
        let embedder = Arc::new(StubEmbedder::new(vec![1.0, 0.0]));
        let generator = Arc::new(RecordingGenerator::answering("پاسخ"));
        let rag = engine(store.clone())
            .with_embedder(embedder.clone())
            .with_generator(generator.clone());

        let err = rag
            .respond(&ChatRequest::new("ع".repeat(600)))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), Prompts::default().messages.message_too_long);
        assert_eq!(embedder.single_calls(), 0);
        assert_eq!(store.loads.load(Ordering::SeqCst), 0);
        assert!(generator.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_limit_counts_characters() {
        let rag = engine(lexical_store());
        // 500 Persian characters are 1000 bytes.
        assert!(rag.validate(&"ع".repeat(500)).is_ok());
        assert!(rag.validate(&"ع".repeat(501)).is_err());
    }

    #[tokio::test]
    async fn test_fallback_without_generator() {
        let rag = engine(lexical_store());

        let response = rag.respond(&ChatRequest::new("عشق")).await.unwrap();

        assert_eq!(response.kind, AnswerKind::Fallback);
        assert!(response.response.contains("برنامه‌های 1 "));
        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].program_number, Some(1));
        assert_eq!(response.sources[0].title.as_deref(), Some("عنوان 1"));
    }

    #[tokio::test]
    async fn test_no_results_fallback() {
        let generator = Arc::new(RecordingGenerator::answering("پاسخ"));
        let rag = engine(lexical_store()).with_generator(generator.clone());

        let response = rag.respond(&ChatRequest::new("کیمیا")).await.unwrap();

        assert_eq!(response.kind, AnswerKind::Fallback);
        assert_eq!(response.response, Prompts::default().fallback.no_results);
        assert!(response.sources.is_empty());
        // Empty context never reaches the provider.
        assert!(generator.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generated_answer_with_context_and_history() {
        let generator = Arc::new(RecordingGenerator::answering("پاسخ نهایی"));
        let rag = engine(lexical_store()).with_generator(generator.clone());

        let request = ChatRequest {
            message: "عشق".to_string(),
            history: vec![
                HistoryEntry {
                    role: "user".to_string(),
                    content: "قدیمی".to_string(),
                },
                HistoryEntry {
                    role: "assistant".to_string(),
                    content: "پاسخ قدیمی".to_string(),
                },
                HistoryEntry {
                    role: "system".to_string(),
                    content: "نادیده".to_string(),
                },
                HistoryEntry {
                    role: "user".to_string(),
                    content: "سوال قبلی".to_string(),
                },
            ],
        };

        let response = rag.respond(&request).await.unwrap();
        assert_eq!(response.kind, AnswerKind::Generated);
        assert_eq!(response.response, "پاسخ نهایی");

        let calls = generator.calls.lock().unwrap();
        let (system, turns) = &calls[0];
        assert!(system.contains("[برنامه #1: عنوان 1]\nعشق و حضور در مثنوی"));
        assert!(system.contains("[متن عمومی]"));
        assert!(!system.contains("{{context}}"));

        // Last three entries, minus the system one, then the message.
        assert_eq!(
            turns,
            &vec![
                ChatTurn::assistant("پاسخ قدیمی"),
                ChatTurn::user("سوال قبلی"),
                ChatTurn::user("عشق"),
            ]
        );
        assert_eq!(turns.last().map(|t| t.role), Some(ChatRole::User));
    }

    #[tokio::test]
    async fn test_generation_failure_degrades_to_template() {
        let rag = engine(lexical_store()).with_generator(Arc::new(RecordingGenerator::failing()));

        let response = rag.respond(&ChatRequest::new("عشق")).await.unwrap();

        assert_eq!(response.kind, AnswerKind::Fallback);
        assert!(response.response.contains('1'));
        assert!(!response.sources.is_empty());
    }

    #[tokio::test]
    async fn test_empty_completion_replaced() {
        let rag = engine(lexical_store()).with_generator(Arc::new(RecordingGenerator::answering("  ")));

        let response = rag.respond(&ChatRequest::new("عشق")).await.unwrap();

        assert_eq!(response.kind, AnswerKind::Generated);
        assert_eq!(response.response, Prompts::default().rag.empty_completion);
    }

    #[tokio::test]
    async fn test_embedding_failure_degrades_to_lexical() {
        let store = store(vec![
            chunk("a", Some(4), "عشق", Some(vec![1.0, 0.0])),
            chunk("b", Some(5), "سکوت", Some(vec![0.0, 1.0])),
        ]);
        let embedder = Arc::new(StubEmbedder::new(vec![0.0, 1.0]).failing_single());
        let rag = engine(store).with_embedder(embedder.clone());

        let response = rag.respond(&ChatRequest::new("عشق")).await.unwrap();

        assert_eq!(embedder.single_calls(), 1);
        assert_eq!(response.sources[0].program_number, Some(4));
    }

    #[tokio::test]
    async fn test_semantic_search_with_embedder() {
        let store = store(vec![
            chunk("a", Some(4), "عشق", Some(vec![1.0, 0.0])),
            chunk("b", Some(5), "سکوت", Some(vec![0.0, 1.0])),
        ]);
        let rag = engine(store).with_embedder(Arc::new(StubEmbedder::new(vec![0.0, 1.0])));

        let response = rag.respond(&ChatRequest::new("عشق")).await.unwrap();

        // The query vector points at program 5 even though the text matches program 4.
        assert_eq!(response.sources[0].program_number, Some(5));
    }

    #[tokio::test]
    async fn test_missing_store_answers_politely() {
        let rag = RagEngine::new(
            SearchEngine::new(Arc::new(MemoryStore::empty())),
            RagSettings::default(),
        );

        let response = rag.respond(&ChatRequest::new("عشق")).await.unwrap();
        assert_eq!(response.response, Prompts::default().fallback.no_results);
    }

    fn hit(program: Option<u32>) -> SearchHit {
        SearchHit {
            chunk: chunk("x", program, "متن", None),
            score: 1.0,
            mode: SearchMode::Lexical,
        }
    }

    #[test]
    fn test_fallback_lists_three_programs() {
        let prompts = Prompts::default();
        let hits: Vec<SearchHit> = [7, 3, 7, 9, 12, 15].into_iter().map(|n| hit(Some(n))).collect();

        let answer = fallback_answer(&hits, &prompts);
        assert!(answer.contains("7، 3، 9"));
        assert!(answer.contains("و 2 برنامه دیگر."));
        assert!(!answer.contains("12"));
    }

    #[test]
    fn test_fallback_without_program_numbers() {
        let prompts = Prompts::default();
        assert_eq!(fallback_answer(&[hit(None)], &prompts), prompts.fallback.generic);
        assert_eq!(fallback_answer(&[], &prompts), prompts.fallback.no_results);
    }

    #[test]
    fn test_fallback_without_more_suffix() {
        let answer = fallback_answer(&[hit(Some(1)), hit(Some(2))], &Prompts::default());
        assert!(answer.contains("1، 2"));
        assert!(!answer.contains("دیگر."));
    }
}
