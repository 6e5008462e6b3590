// this_file: src/api/mod.rs
//! HTTP API: routing, shared state, CORS.

pub mod admin;
pub mod analysis;
pub mod error;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::analysis::Analyzer;
use crate::cache::AnalysisCache;
use crate::config::Settings;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub cache: Arc<AnalysisCache>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(analyzer: Arc<Analyzer>, cache: Arc<AnalysisCache>, settings: Arc<Settings>) -> Self {
        Self {
            analyzer,
            cache,
            settings,
        }
    }
}

/// Build a `CorsLayer` from the comma-separated origins setting.
pub fn build_cors_layer(allowed_origins: &str) -> CorsLayer {
    if allowed_origins.trim() == "*" {
        return CorsLayer::very_permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|origin| {
            let trimmed = origin.trim();
            if trimmed.is_empty() {
                return None;
            }
            HeaderValue::from_str(trimmed).ok()
        })
        .collect();
    CorsLayer::new().allow_origin(AllowOrigin::list(origins))
}

/// Assemble the service router.
pub fn create_router(state: AppState) -> Router {
    // Keep the transport's body cap above the upload cap so oversized files
    // get the service's own 413 JSON error in the common range.
    let body_limit = state.settings.max_file_size * 2 + 8192;
    let cors = build_cors_layer(&state.settings.allowed_origins);

    Router::new()
        .route("/", get(admin::root))
        .route("/health", get(admin::health))
        .route("/v1/image/analysis", post(analysis::analyze_upload))
        .route("/v1/image/analysis/url", post(analysis::analyze_url))
        .route("/admin/cache", get(admin::cache_stats))
        .route("/admin/cache/clear", post(admin::clear_cache))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_wildcard_is_permissive() {
        // Construction must not panic for the wildcard or for explicit lists
        let _ = build_cors_layer("*");
        let _ = build_cors_layer("https://a.example, https://b.example");
        let _ = build_cors_layer("");
    }
}
