// this_file: src/luminance.rs
//! Perceptual luminance computation using the Rec. 709 standard.
//!
//! The engine is pure: it turns an RGB raster into a flat row-major grid of
//! f64 luminance values and derives aggregate statistics from it. Nothing in
//! this module touches shared state.

use std::str::FromStr;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Rec. 709 red coefficient
pub const REC709_R: f64 = 0.2126;
/// Rec. 709 green coefficient
pub const REC709_G: f64 = 0.7152;
/// Rec. 709 blue coefficient
pub const REC709_B: f64 = 0.0722;

/// Maximum luminance value for 8-bit channels
pub const LUMINANCE_MAX: f64 = 255.0;

/// Identifier reported in every analysis result
pub const ALGORITHM: &str = "rec709";

/// Fraction of each dimension treated as "edge" for edge-mode analysis
const EDGE_FRACTION: f64 = 0.1;

/// Which outer regions to aggregate for edge brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeMode {
    /// Left and right 10% column strips
    LeftRight,
    /// Top and bottom 10% row strips
    TopBottom,
    /// All four strips; corners counted once
    All,
}

impl EdgeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeMode::LeftRight => "left_right",
            EdgeMode::TopBottom => "top_bottom",
            EdgeMode::All => "all",
        }
    }
}

impl FromStr for EdgeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left_right" => Ok(EdgeMode::LeftRight),
            "top_bottom" => Ok(EdgeMode::TopBottom),
            "all" => Ok(EdgeMode::All),
            other => Err(Error::InvalidEdgeMode(format!(
                "'{}' (valid modes: left_right, top_bottom, all)",
                other
            ))),
        }
    }
}

/// Row-major grid of per-pixel luminance values.
#[derive(Debug, Clone)]
pub struct LuminanceGrid {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl LuminanceGrid {
    /// Compute luminance for every pixel of an RGB raster.
    pub fn from_rgb(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let mut values = Vec::with_capacity((width * height) as usize);
        for pixel in image.pixels() {
            let [r, g, b] = pixel.0;
            values.push(REC709_R * f64::from(r) + REC709_G * f64::from(g) + REC709_B * f64::from(b));
        }
        Self {
            width: width as usize,
            height: height as usize,
            values,
        }
    }

    /// Build a grid from raw values. `values.len()` must equal `width * height`.
    pub fn from_values(width: usize, height: usize, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), width * height);
        Self {
            width,
            height,
            values,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All luminance values in row-major order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    fn at(&self, x: usize, y: usize) -> f64 {
        self.values[y * self.width + x]
    }

    /// Arithmetic mean over all cells (0.0 for an empty grid).
    pub fn average(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Statistical median; even-count grids average the two central values.
    pub fn median(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        }
    }

    /// Luminance values from the outer 10% strips selected by `mode`.
    ///
    /// Strip width is at least one pixel. In `All` mode the top and bottom
    /// strips skip the columns already covered by the left and right strips,
    /// so corner pixels are counted exactly once.
    pub fn edge_values(&self, mode: EdgeMode) -> Vec<f64> {
        let edge_w = ((self.width as f64 * EDGE_FRACTION) as usize).max(1);
        let edge_h = ((self.height as f64 * EDGE_FRACTION) as usize).max(1);
        let right_start = self.width.saturating_sub(edge_w);
        let bottom_start = self.height.saturating_sub(edge_h);

        let mut edges = Vec::new();

        match mode {
            EdgeMode::LeftRight => {
                self.collect_columns(&mut edges, 0..edge_w.min(self.width));
                self.collect_columns(&mut edges, right_start..self.width);
            }
            EdgeMode::TopBottom => {
                self.collect_rows(&mut edges, 0..edge_h.min(self.height), 0..self.width);
                self.collect_rows(&mut edges, bottom_start..self.height, 0..self.width);
            }
            EdgeMode::All => {
                self.collect_columns(&mut edges, 0..edge_w.min(self.width));
                self.collect_columns(&mut edges, right_start..self.width);
                // Interior columns only: corners already covered above
                if self.width > 2 * edge_w {
                    self.collect_rows(&mut edges, 0..edge_h.min(self.height), edge_w..right_start);
                    self.collect_rows(&mut edges, bottom_start..self.height, edge_w..right_start);
                }
            }
        }

        edges
    }

    fn collect_columns(&self, out: &mut Vec<f64>, cols: std::ops::Range<usize>) {
        for y in 0..self.height {
            for x in cols.clone() {
                out.push(self.at(x, y));
            }
        }
    }

    fn collect_rows(
        &self,
        out: &mut Vec<f64>,
        rows: std::ops::Range<usize>,
        cols: std::ops::Range<usize>,
    ) {
        for y in rows {
            for x in cols.clone() {
                out.push(self.at(x, y));
            }
        }
    }
}

/// Convert an average luminance (0-255) to a brightness score (0-100).
pub fn brightness_score(average: f64) -> u8 {
    ((average / LUMINANCE_MAX) * 100.0).round() as u8
}

/// Arithmetic mean of a value slice (0.0 when empty).
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
