// this_file: src/analysis.rs
//! Request orchestration: cache lookup, decode, metric computation.
//!
//! Images are processed in memory only and discarded when the request
//! completes; results carry aggregate metrics, never pixel data. The
//! analyzer owns the shared result cache and consults it before any
//! decode or download work.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use image::GenericImageView;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::task;

use crate::cache::{compute_cache_key, AnalysisCache, KeySource};
use crate::error::{Error, Result};
use crate::fetch::{redact_url, validate_url, ImageFetcher};
use crate::histogram::{calculate_histogram, HistogramBucket};
use crate::luminance::{brightness_score, mean, EdgeMode, LuminanceGrid, ALGORITHM};
use crate::resize::resize_if_needed;
use crate::validate::Metric;

/// Validated per-request analysis parameters.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub metrics: BTreeSet<Metric>,
    pub edge_mode: Option<EdgeMode>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            metrics: BTreeSet::from([Metric::Brightness]),
            edge_mode: None,
        }
    }
}

/// Immutable snapshot of one analysis. This is what the cache stores;
/// optional fields reflect the requested metric set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_luminance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median_luminance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histogram: Option<Vec<HistogramBucket>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_brightness_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_average_luminance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_mode: Option<EdgeMode>,
    /// Original (pre-resize) width in pixels
    pub width: u32,
    /// Original (pre-resize) height in pixels
    pub height: u32,
    pub algorithm: String,
}

impl AnalysisResult {
    fn metadata(width: u32, height: u32) -> Self {
        Self {
            brightness_score: None,
            average_luminance: None,
            median_luminance: None,
            histogram: None,
            edge_brightness_score: None,
            edge_average_luminance: None,
            edge_mode: None,
            width,
            height,
            algorithm: ALGORITHM.to_string(),
        }
    }
}

/// Complete response for one request: the result snapshot plus freshness
/// and timing metadata stamped by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub processing_time_ms: f64,
    pub cached: bool,
}

/// Orchestrates validation, cache lookup, fetch, decode and computation.
pub struct Analyzer {
    cache: Arc<AnalysisCache>,
    fetcher: ImageFetcher,
    max_dimension: u32,
}

impl Analyzer {
    pub fn new(cache: Arc<AnalysisCache>, fetcher: ImageFetcher, max_dimension: u32) -> Self {
        Self {
            cache,
            fetcher,
            max_dimension,
        }
    }

    /// Analyze uploaded image bytes.
    pub async fn analyze_upload(
        &self,
        bytes: Bytes,
        options: AnalysisOptions,
    ) -> Result<AnalysisResponse> {
        let started = Instant::now();
        let key = compute_cache_key(
            KeySource::Content(&bytes),
            &options.metrics,
            options.edge_mode,
        );

        if let Some(result) = self.cache.get(&key) {
            debug!("Cache hit for upload {}", key);
            return Ok(finish(result, true, started));
        }

        let result = self.compute(bytes, options).await?;
        self.cache.insert(key, result.clone());
        Ok(finish(result, false, started))
    }

    /// Analyze an image behind a URL. The cache key derives from the
    /// normalized URL, so a hot URL is answered without refetching.
    pub async fn analyze_url(
        &self,
        raw_url: &str,
        options: AnalysisOptions,
    ) -> Result<AnalysisResponse> {
        let started = Instant::now();
        let url = validate_url(raw_url)?;
        let key = compute_cache_key(
            KeySource::SourceToken(url.as_str()),
            &options.metrics,
            options.edge_mode,
        );

        if let Some(result) = self.cache.get(&key) {
            debug!("Cache hit for {}", redact_url(&url));
            return Ok(finish(result, true, started));
        }

        info!("Fetching image from {}", redact_url(&url));
        let bytes = self.fetcher.fetch(url).await?;
        let result = self.compute(bytes, options).await?;
        self.cache.insert(key, result.clone());
        Ok(finish(result, false, started))
    }

    /// Run decode + metric computation on the blocking thread pool so the
    /// async runtime (and the cache lock) is never held across CPU work.
    async fn compute(&self, bytes: Bytes, options: AnalysisOptions) -> Result<AnalysisResult> {
        let max_dimension = self.max_dimension;
        task::spawn_blocking(move || analyze_image_bytes(&bytes, &options, max_dimension))
            .await
            .map_err(|e| Error::Internal(format!("analysis task failed: {}", e)))?
    }
}

fn finish(result: AnalysisResult, cached: bool, started: Instant) -> AnalysisResponse {
    AnalysisResponse {
        result,
        cached,
        processing_time_ms: round2(started.elapsed().as_secs_f64() * 1000.0),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Pure analysis pipeline: decode, normalize to RGB, downscale, compute the
/// requested metrics. Decode failure is a client error and happens before
/// any cache write.
pub fn analyze_image_bytes(
    bytes: &[u8],
    options: &AnalysisOptions,
    max_dimension: u32,
) -> Result<AnalysisResult> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| Error::InvalidImage(e.to_string()))?;
    let (original_width, original_height) = decoded.dimensions();
    debug!(
        "Image decoded: {}x{} pixels",
        original_width, original_height
    );

    let rgb = resize_if_needed(decoded.to_rgb8(), max_dimension);
    let grid = LuminanceGrid::from_rgb(&rgb);

    let mut result = AnalysisResult::metadata(original_width, original_height);

    if options.metrics.contains(&Metric::Brightness) {
        let average = grid.average();
        result.brightness_score = Some(brightness_score(average));
        result.average_luminance = Some(round2(average));
    }

    if let Some(mode) = options.edge_mode {
        let edges = grid.edge_values(mode);
        let edge_average = mean(&edges);
        result.edge_brightness_score = Some(brightness_score(edge_average));
        result.edge_average_luminance = Some(round2(edge_average));
        result.edge_mode = Some(mode);
    }

    if options.metrics.contains(&Metric::Median) {
        result.median_luminance = Some(round2(grid.median()));
    }

    if options.metrics.contains(&Metric::Histogram) {
        result.histogram = Some(calculate_histogram(&grid));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    use image::{Rgb, RgbImage};

    fn png_bytes(width: u32, height: u32, value: u8) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([value, value, value]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png)
            .expect("png encode");
        buf.into_inner()
    }

    fn options(metrics: &[Metric], edge_mode: Option<EdgeMode>) -> AnalysisOptions {
        AnalysisOptions {
            metrics: metrics.iter().copied().collect(),
            edge_mode,
        }
    }

    fn test_analyzer(max_entries: usize) -> Analyzer {
        let cache = Arc::new(AnalysisCache::new(max_entries, Duration::from_secs(60)));
        let fetcher = ImageFetcher::new(Duration::from_secs(5), 1024 * 1024).unwrap();
        Analyzer::new(cache, fetcher, 512)
    }

    #[test]
    fn test_black_image_scores_zero() {
        let bytes = png_bytes(8, 8, 0);
        let result =
            analyze_image_bytes(&bytes, &AnalysisOptions::default(), 512).unwrap();
        assert_eq!(result.brightness_score, Some(0));
        assert_eq!(result.average_luminance, Some(0.0));
    }

    #[test]
    fn test_white_image_scores_hundred() {
        let bytes = png_bytes(8, 8, 255);
        let result =
            analyze_image_bytes(&bytes, &AnalysisOptions::default(), 512).unwrap();
        assert_eq!(result.brightness_score, Some(100));
        assert_eq!(result.average_luminance, Some(255.0));
    }

    #[test]
    fn test_mid_gray_scores_about_fifty() {
        let bytes = png_bytes(8, 8, 128);
        let result =
            analyze_image_bytes(&bytes, &AnalysisOptions::default(), 512).unwrap();
        let score = result.brightness_score.unwrap();
        assert!((49..=51).contains(&score), "score was {}", score);
    }

    #[test]
    fn test_only_requested_metrics_present() {
        let bytes = png_bytes(8, 8, 100);
        let result =
            analyze_image_bytes(&bytes, &options(&[Metric::Median], None), 512).unwrap();
        assert_eq!(result.median_luminance, Some(100.0));
        assert!(result.brightness_score.is_none());
        assert!(result.histogram.is_none());
        // Metadata always present
        assert_eq!(result.width, 8);
        assert_eq!(result.algorithm, ALGORITHM);
    }

    #[test]
    fn test_histogram_metric_included_when_requested() {
        let bytes = png_bytes(8, 8, 100);
        let result =
            analyze_image_bytes(&bytes, &options(&[Metric::Histogram], None), 512).unwrap();
        let histogram = result.histogram.unwrap();
        assert_eq!(histogram.len(), 10);
        let sum: f64 = histogram.iter().map(|b| b.percent).sum();
        assert!((sum - 100.0).abs() < 0.5);
    }

    #[test]
    fn test_edge_fields_present_with_mode() {
        let bytes = png_bytes(20, 20, 200);
        let result = analyze_image_bytes(
            &bytes,
            &options(&[Metric::Brightness], Some(EdgeMode::All)),
            512,
        )
        .unwrap();
        // Uniform image: edge brightness equals overall brightness
        assert_eq!(result.edge_brightness_score, result.brightness_score);
        assert_eq!(result.edge_mode, Some(EdgeMode::All));
    }

    #[test]
    fn test_reported_dimensions_are_pre_resize() {
        let bytes = png_bytes(1024, 512, 90);
        let result =
            analyze_image_bytes(&bytes, &AnalysisOptions::default(), 512).unwrap();
        assert_eq!((result.width, result.height), (1024, 512));
    }

    #[test]
    fn test_corrupt_bytes_rejected() {
        let result =
            analyze_image_bytes(b"not an image", &AnalysisOptions::default(), 512);
        assert!(matches!(result, Err(Error::InvalidImage(_))));
    }

    #[test]
    fn test_response_serialization_skips_absent_fields() {
        let bytes = png_bytes(4, 4, 50);
        let result =
            analyze_image_bytes(&bytes, &AnalysisOptions::default(), 512).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("brightness_score").is_some());
        assert!(json.get("median_luminance").is_none());
        assert!(json.get("histogram").is_none());
    }

    #[tokio::test]
    async fn test_second_identical_upload_is_cached() {
        let analyzer = test_analyzer(8);
        let bytes = Bytes::from(png_bytes(8, 8, 128));

        let first = analyzer
            .analyze_upload(bytes.clone(), AnalysisOptions::default())
            .await
            .unwrap();
        assert!(!first.cached);

        let second = analyzer
            .analyze_upload(bytes, AnalysisOptions::default())
            .await
            .unwrap();
        assert!(second.cached);
        assert_eq!(second.result, first.result);
    }

    #[tokio::test]
    async fn test_different_metrics_bypass_cache() {
        let analyzer = test_analyzer(8);
        let bytes = Bytes::from(png_bytes(8, 8, 128));

        let first = analyzer
            .analyze_upload(bytes.clone(), AnalysisOptions::default())
            .await
            .unwrap();
        assert!(!first.cached);

        let second = analyzer
            .analyze_upload(bytes, options(&[Metric::Brightness, Metric::Median], None))
            .await
            .unwrap();
        assert!(!second.cached, "different metric set must recompute");
    }

    #[tokio::test]
    async fn test_failed_decode_is_never_cached() {
        let analyzer = test_analyzer(8);
        let bytes = Bytes::from_static(b"garbage");

        let result = analyzer
            .analyze_upload(bytes.clone(), AnalysisOptions::default())
            .await;
        assert!(result.is_err());

        // A retry still misses the cache and fails the same way
        let retry = analyzer.analyze_upload(bytes, AnalysisOptions::default()).await;
        assert!(retry.is_err());
        assert!(analyzer.cache.is_empty());
    }

    #[tokio::test]
    async fn test_url_with_blocked_host_rejected_before_fetch() {
        let analyzer = test_analyzer(8);
        let result = analyzer
            .analyze_url("http://127.0.0.1/secret.png", AnalysisOptions::default())
            .await;
        assert!(matches!(result, Err(Error::DisallowedHost(_))));
    }
}
