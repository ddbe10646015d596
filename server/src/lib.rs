use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use docsearch_core::corpus::{list_documents, read_document};
use docsearch_core::{BuildReport, RankedDoc, SearchConfig, SearchStatus, Searcher, Strategy};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_strategy")]
    pub strategy: String,
    /// Maximum number of ranked documents to return; all when absent.
    pub k: Option<usize>,
}
fn default_strategy() -> String { "substring".into() }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub strategy: Strategy,
    pub status: SearchStatus,
    pub took_ms: u128,
    pub took_s: f64,
    pub total_docs: usize,
    pub results: Vec<RankedDoc>,
    pub diagnostics: Vec<String>,
}

#[derive(Serialize)]
pub struct RebuildResponse {
    pub documents: Vec<String>,
    pub diagnostics: Vec<String>,
    pub took_s: f64,
}

impl From<BuildReport> for RebuildResponse {
    fn from(r: BuildReport) -> Self {
        Self { took_s: r.elapsed.as_secs_f64(), documents: r.documents, diagnostics: r.diagnostics }
    }
}

/// The searcher is shared behind one lock, so an index rebuild never runs
/// while a query is reading the store.
#[derive(Clone)]
pub struct AppState {
    pub searcher: Arc<Mutex<Searcher>>,
    pub admin_token: Option<String>,
}

type ApiError = (StatusCode, String);

pub fn build_app(config: SearchConfig) -> Result<Router> {
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let app_state = AppState { searcher: Arc::new(Mutex::new(Searcher::new(config))), admin_token };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:name", get(doc_handler))
        .route("/index/rebuild", post(rebuild_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let strategy: Strategy = params.strategy.parse().map_err(|e: docsearch_core::SearchError| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let outcome = {
        let mut searcher = state.searcher.lock();
        searcher.search(&params.q, strategy).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    };
    let total_docs = outcome.results.len();
    let k = params.k.unwrap_or(total_docs);
    let results = outcome.results.into_iter().take(k).collect();
    Ok(Json(SearchResponse {
        query: outcome.query,
        strategy,
        status: outcome.status,
        took_ms: outcome.elapsed.as_millis(),
        took_s: outcome.elapsed.as_secs_f64(),
        total_docs,
        results,
        diagnostics: outcome.diagnostics,
    }))
}

pub async fn doc_handler(State(state): State<AppState>, Path(name): Path<String>) -> Result<String, ApiError> {
    let corpus_dir = state.searcher.lock().config().corpus_dir.clone();
    let docs = list_documents(&corpus_dir).map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let doc = docs
        .into_iter()
        .find(|d| d.name == name)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("no document named {name}")))?;
    read_document(&doc).map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

async fn rebuild_handler(State(state): State<AppState>, headers: axum::http::HeaderMap) -> Result<Json<RebuildResponse>, ApiError> {
    authorize(&state, &headers)?;
    let report = state
        .searcher
        .lock()
        .rebuild_index()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    tracing::info!(num_docs = report.documents.len(), "index rebuilt via admin endpoint");
    Ok(Json(report.into()))
}

fn authorize(state: &AppState, headers: &axum::http::HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
