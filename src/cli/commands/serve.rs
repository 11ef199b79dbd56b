//! HTTP chat API.
//!
//! Provides the chat endpoint plus read-only views of the vector store.

use super::rag_engine;
use crate::cli::Output;
use crate::config::{MessagePrompts, Settings};
use crate::rag::{ChatRequest, RagEngine};
use crate::search::SearchEngine;
use crate::vector_store::Chunk;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, warn};

/// Shared application state.
pub struct AppState {
    rag: RagEngine,
    search: SearchEngine,
    messages: MessagePrompts,
}

impl AppState {
    pub fn new(rag: RagEngine, search: SearchEngine) -> Self {
        let messages = rag.prompts().messages.clone();
        Self {
            rag,
            search,
            messages,
        }
    }
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/stats", get(stats))
        .route("/api/programs/{program_number}/chunks", get(program_chunks))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let rag = rag_engine(&settings)?;
    let search = super::search_engine(&settings);
    let state = Arc::new(AppState::new(rag, search));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Ganj API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Chat", "POST /api/chat");
    Output::kv("Stats", "GET  /api/stats");
    Output::kv("Program", "GET  /api/programs/{program_number}/chunks");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

// === Response Types ===

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<String>,
}

impl ErrorResponse {
    fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

#[derive(Serialize)]
struct ProgramChunksResponse {
    program_number: u32,
    total: usize,
    chunks: Vec<ChunkInfo>,
}

#[derive(Serialize)]
struct ChunkInfo {
    id: String,
    #[serde(rename = "chunkIndex")]
    chunk_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    text: String,
}

impl From<Chunk> for ChunkInfo {
    fn from(chunk: Chunk) -> Self {
        Self {
            id: chunk.id,
            chunk_index: chunk.chunk_index,
            title: chunk.title,
            text: chunk.text,
        }
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected chat body: {}", rejection);
            return ErrorResponse {
                error: state.messages.processing_error.clone(),
                response: None,
            }
            .into_response_with(StatusCode::BAD_REQUEST);
        }
    };

    match state.rag.respond(&request).await {
        Ok(response) => Json(response).into_response(),
        Err(e) if e.is_invalid_input() => ErrorResponse {
            error: e.to_string(),
            response: None,
        }
        .into_response_with(StatusCode::BAD_REQUEST),
        Err(e) => {
            error!("Chat request failed: {}", e);
            ErrorResponse {
                error: state.messages.processing_error.clone(),
                response: Some(state.messages.apology.clone()),
            }
            .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn stats(State(state): State<Arc<AppState>>) -> Response {
    match state.search.stats().await {
        Some(stats) => Json(stats).into_response(),
        None => ErrorResponse {
            error: "Vector store not available".to_string(),
            response: None,
        }
        .into_response_with(StatusCode::SERVICE_UNAVAILABLE),
    }
}

async fn program_chunks(
    State(state): State<Arc<AppState>>,
    Path(program_number): Path<u32>,
) -> Response {
    let chunks = state.search.chunks_by_program(program_number).await;
    if chunks.is_empty() {
        return ErrorResponse {
            error: format!("Program not found: {}", program_number),
            response: None,
        }
        .into_response_with(StatusCode::NOT_FOUND);
    }

    Json(ProgramChunksResponse {
        program_number,
        total: chunks.len(),
        chunks: chunks.into_iter().map(ChunkInfo::from).collect(),
    })
    .into_response()
}
