// this_file: src/lib.rs
//! Luxmeter - a stateless image-brightness analysis service
//!
//! This library provides:
//! - Perceptual luminance statistics (Rec. 709) over uploaded or fetched images
//! - A bounded, TTL-expiring, LRU-evicting result cache
//! - A JSON HTTP API for brightness, median and histogram metrics

pub mod analysis;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod histogram;
pub mod logging;
pub mod luminance;
pub mod resize;
pub mod shutdown;
pub mod validate;

// Re-export commonly used types
pub use analysis::{AnalysisOptions, AnalysisResponse, AnalysisResult, Analyzer};
pub use cache::{compute_cache_key, AnalysisCache, CacheKey, KeySource};
pub use config::Settings;
pub use error::{Error, Result};
pub use luminance::EdgeMode;
pub use validate::Metric;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
