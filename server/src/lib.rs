use anyhow::{bail, Result};
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use search_core::{DocId, RetrievalEngine, SearchHit};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_ms: u128,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct DocResponse {
    pub doc_id: DocId,
    pub url: String,
}

/// The engine is loaded once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RetrievalEngine>,
}

pub fn build_app(index_dir: String) -> Result<Router> {
    Ok(router(load_engine(&index_dir)?))
}

/// Load the index from `index_dir`, refusing to continue when none exists there.
pub fn load_engine(index_dir: &str) -> Result<RetrievalEngine> {
    let mut engine = RetrievalEngine::new(index_dir);
    if !engine.load_index()? {
        bail!("no index available in {index_dir}; crawl or build one first");
    }
    Ok(engine)
}

pub fn router(engine: RetrievalEngine) -> Router {
    let app_state = AppState { engine: Arc::new(engine) };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(app_state)
        .layer(cors_from_env())
        .layer(TraceLayer::new_for_http())
}

/// CORS_ALLOW_ORIGIN is a comma-separated origin list; unset or unparseable means any origin.
fn cors_from_env() -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let origins: Vec<_> = std::env::var("CORS_ALLOW_ORIGIN")
        .map(|val| val.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();
    if origins.is_empty() {
        base.allow_origin(Any)
    } else {
        base.allow_origin(AllowOrigin::list(origins))
    }
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let results = state.engine.search(&params.q);
    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, hits = results.len(), "search");
    Json(SearchResponse { query: params.q, took_ms: elapsed.as_millis(), total_hits: results.len(), results })
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> Result<Json<DocResponse>, (StatusCode, String)> {
    match state.engine.document(doc_id) {
        Some(meta) => Ok(Json(DocResponse { doc_id, url: meta.url.clone() })),
        None => Err((StatusCode::NOT_FOUND, "not found".into())),
    }
}
