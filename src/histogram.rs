// this_file: src/histogram.rs
//! Luminance distribution histogram.

use serde::{Deserialize, Serialize};

use crate::luminance::{LuminanceGrid, LUMINANCE_MAX};

/// Number of equal-width buckets in the distribution
pub const HISTOGRAM_BUCKETS: usize = 10;

/// A single bucket in the brightness histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    /// Luminance range label (e.g. "0-24")
    pub range: String,
    /// Percentage of pixels in this range, rounded to one decimal
    pub percent: f64,
}

/// Partition luminance values into `HISTOGRAM_BUCKETS` equal-width buckets
/// and report the percentage of cells falling into each.
///
/// Buckets are half-open except the last, which is closed at `LUMINANCE_MAX`
/// so the maximum value is captured exactly. An empty grid yields an empty
/// list rather than dividing by zero.
pub fn calculate_histogram(grid: &LuminanceGrid) -> Vec<HistogramBucket> {
    let total = grid.len();
    if total == 0 {
        return Vec::new();
    }

    let bucket_size = (LUMINANCE_MAX + 1.0) / HISTOGRAM_BUCKETS as f64;
    let values = grid.values();
    let mut histogram = Vec::with_capacity(HISTOGRAM_BUCKETS);

    for i in 0..HISTOGRAM_BUCKETS {
        let start = (i as f64 * bucket_size) as u32;
        let last = i == HISTOGRAM_BUCKETS - 1;

        let (end, count) = if last {
            let count = values
                .iter()
                .filter(|&&v| v >= f64::from(start) && v <= LUMINANCE_MAX)
                .count();
            (LUMINANCE_MAX as u32, count)
        } else {
            let upper = (i + 1) as f64 * bucket_size;
            let end = (upper as u32) - 1;
            let count = values
                .iter()
                .filter(|&&v| v >= f64::from(start) && v < upper)
                .count();
            (end, count)
        };

        let percent = (count as f64 / total as f64 * 1000.0).round() / 10.0;
        histogram.push(HistogramBucket {
            range: format!("{}-{}", start, end),
            percent,
        });
    }

    histogram
}
