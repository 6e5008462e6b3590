// this_file: src/validate.rs
//! Request validation: uploads, metric sets, edge modes.
//!
//! All validation happens before any cache interaction; a request that
//! fails here never reaches the analysis pipeline or the cache.

use std::collections::BTreeSet;
use std::str::FromStr;

use crate::config::ALLOWED_CONTENT_TYPES;
use crate::error::{Error, Result};
use crate::luminance::EdgeMode;

/// A single requestable analysis metric.
///
/// Variant order is alphabetical so a `BTreeSet<Metric>` iterates in the
/// same order the cache key derivation sorts metric names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Metric {
    Brightness,
    Histogram,
    Median,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Brightness => "brightness",
            Metric::Histogram => "histogram",
            Metric::Median => "median",
        }
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "brightness" => Ok(Metric::Brightness),
            "histogram" => Ok(Metric::Histogram),
            "median" => Ok(Metric::Median),
            other => Err(Error::InvalidMetric(format!(
                "'{}' (valid metrics: brightness, median, histogram)",
                other
            ))),
        }
    }
}

/// Parse the comma-separated `metrics` query parameter.
///
/// Names are trimmed and lowercased. An absent or effectively empty
/// parameter yields the default set `{brightness}`.
pub fn parse_metrics(raw: Option<&str>) -> Result<BTreeSet<Metric>> {
    let raw = match raw {
        Some(raw) => raw,
        None => return Ok(BTreeSet::from([Metric::Brightness])),
    };

    let mut metrics = BTreeSet::new();
    for name in raw.split(',') {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            continue;
        }
        metrics.insert(name.parse::<Metric>()?);
    }

    if metrics.is_empty() {
        metrics.insert(Metric::Brightness);
    }
    Ok(metrics)
}

/// Parse the optional `edge_mode` parameter.
pub fn parse_edge_mode(raw: Option<&str>) -> Result<Option<EdgeMode>> {
    match raw {
        Some(raw) => raw.trim().to_lowercase().parse::<EdgeMode>().map(Some),
        None => Ok(None),
    }
}

/// Validate an uploaded image: content type, byte cap, non-empty.
pub fn validate_upload(
    content_type: Option<&str>,
    bytes: &[u8],
    max_file_size: usize,
) -> Result<()> {
    let content_type = content_type.unwrap_or("");
    if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
        return Err(Error::UnsupportedMediaType(content_type.to_string()));
    }

    if bytes.len() > max_file_size {
        return Err(Error::PayloadTooLarge {
            size: bytes.len(),
            max: max_file_size,
        });
    }

    if bytes.is_empty() {
        return Err(Error::EmptyPayload);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_default_when_absent() {
        let metrics = parse_metrics(None).unwrap();
        assert_eq!(metrics, BTreeSet::from([Metric::Brightness]));
    }

    #[test]
    fn test_metrics_default_when_blank() {
        let metrics = parse_metrics(Some(" , ,")).unwrap();
        assert_eq!(metrics, BTreeSet::from([Metric::Brightness]));
    }

    #[test]
    fn test_metrics_parse_and_normalize() {
        let metrics = parse_metrics(Some(" Median,BRIGHTNESS ")).unwrap();
        assert_eq!(
            metrics,
            BTreeSet::from([Metric::Brightness, Metric::Median])
        );
    }

    #[test]
    fn test_metrics_duplicates_collapse() {
        let metrics = parse_metrics(Some("median,median,histogram")).unwrap();
        assert_eq!(metrics.len(), 2);
    }

    #[test]
    fn test_metrics_reject_unknown_name() {
        assert!(matches!(
            parse_metrics(Some("brightness,contrast")),
            Err(Error::InvalidMetric(_))
        ));
    }

    #[test]
    fn test_metric_iteration_order_is_sorted() {
        let metrics =
            BTreeSet::from([Metric::Median, Metric::Brightness, Metric::Histogram]);
        let names: Vec<&str> = metrics.iter().map(Metric::as_str).collect();
        assert_eq!(names, vec!["brightness", "histogram", "median"]);
    }

    #[test]
    fn test_edge_mode_absent() {
        assert_eq!(parse_edge_mode(None).unwrap(), None);
    }

    #[test]
    fn test_edge_mode_normalized() {
        assert_eq!(
            parse_edge_mode(Some(" Top_Bottom ")).unwrap(),
            Some(EdgeMode::TopBottom)
        );
    }

    #[test]
    fn test_edge_mode_rejects_unknown() {
        assert!(matches!(
            parse_edge_mode(Some("corners")),
            Err(Error::InvalidEdgeMode(_))
        ));
    }

    #[test]
    fn test_upload_rejects_wrong_content_type() {
        let result = validate_upload(Some("image/gif"), b"GIF89a", 1024);
        assert!(matches!(result, Err(Error::UnsupportedMediaType(_))));
    }

    #[test]
    fn test_upload_rejects_missing_content_type() {
        assert!(validate_upload(None, b"data", 1024).is_err());
    }

    #[test]
    fn test_upload_rejects_oversized() {
        let result = validate_upload(Some("image/png"), &[0u8; 32], 16);
        assert!(matches!(result, Err(Error::PayloadTooLarge { .. })));
    }

    #[test]
    fn test_upload_rejects_empty() {
        let result = validate_upload(Some("image/jpeg"), &[], 1024);
        assert!(matches!(result, Err(Error::EmptyPayload)));
    }

    #[test]
    fn test_upload_accepts_valid() {
        assert!(validate_upload(Some("image/png"), &[1, 2, 3], 1024).is_ok());
    }
}
