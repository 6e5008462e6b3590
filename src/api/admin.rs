// this_file: src/api/admin.rs
//! Health probes and cache administration endpoints.

use axum::extract::State;
use axum::Json;
use log::info;
use serde_json::{json, Value};

use super::AppState;
use crate::cache::CacheStats;
use crate::VERSION;

/// `GET /`: basic service probe.
pub async fn root() -> Json<Value> {
    Json(json!({
        "service": "luxmeter",
        "version": VERSION,
        "status": "healthy",
    }))
}

/// `GET /health`: detailed health check.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "luxmeter",
        "version": VERSION,
        "cache_entries": state.cache.len(),
    }))
}

/// `GET /admin/cache`: cache counters.
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

/// `POST /admin/cache/clear`: drop all cached results.
pub async fn clear_cache(State(state): State<AppState>) -> Json<Value> {
    let removed = state.cache.len();
    state.cache.clear();
    info!("Cache cleared ({} entries removed)", removed);
    Json(json!({
        "status": "cleared",
        "entries_removed": removed,
    }))
}
