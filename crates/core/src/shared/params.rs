use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::shared::constants::{
    DEFAULT_BG_WINDOW_SIZE, DEFAULT_CLOSE_KERNEL_SIZE, DEFAULT_FG_THRESHOLD, DEFAULT_MAX_AREA,
    DEFAULT_MAX_BLOBS, DEFAULT_MAX_DIST, DEFAULT_MIN_AREA, DEFAULT_OPEN_KERNEL_SIZE,
    DEFAULT_OUTLIER_FLOOR_PIX, DEFAULT_OUTLIER_MULTIPLIER, DEFAULT_OUTPUT_FPS,
};

/// Rectangle blanked out of every frame at ingest, in pixels.
///
/// Suppresses burned-in overlays (datetime stamps) that would otherwise
/// register as permanent foreground.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct MaskRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Structuring element shape for morphological filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelShape {
    Rect,
    Ellipse,
}

/// Flat configuration surface. Every key is optional and overrides a
/// documented default; unknown keys are rejected so typos surface early.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackingParams {
    pub bg_window_size: usize,
    pub fg_threshold: u8,
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
    pub open_kernel_size: (u32, u32),
    pub close_kernel_size: (u32, u32),
    pub kernel_shape: KernelShape,
    /// Fusion threshold as a fraction of the longest blob dimension;
    /// absent disables fusion.
    pub min_interblob_spacing: Option<f64>,
    pub max_blobs: usize,
    pub max_dist: f64,
    pub output_video_fps: f64,
    pub datetime_mask: Option<MaskRect>,
    pub outlier_multiplier: f64,
    pub outlier_use_mad: bool,
    pub outlier_floor_pixels: f64,
}

impl Default for TrackingParams {
    fn default() -> Self {
        Self {
            bg_window_size: DEFAULT_BG_WINDOW_SIZE,
            fg_threshold: DEFAULT_FG_THRESHOLD,
            min_area: Some(DEFAULT_MIN_AREA),
            max_area: Some(DEFAULT_MAX_AREA),
            open_kernel_size: DEFAULT_OPEN_KERNEL_SIZE,
            close_kernel_size: DEFAULT_CLOSE_KERNEL_SIZE,
            kernel_shape: KernelShape::Ellipse,
            min_interblob_spacing: None,
            max_blobs: DEFAULT_MAX_BLOBS,
            max_dist: DEFAULT_MAX_DIST,
            output_video_fps: DEFAULT_OUTPUT_FPS,
            datetime_mask: None,
            outlier_multiplier: DEFAULT_OUTLIER_MULTIPLIER,
            outlier_use_mad: false,
            outlier_floor_pixels: DEFAULT_OUTLIER_FLOOR_PIX,
        }
    }
}

impl TrackingParams {
    /// Loads parameters from a flat JSON object, filling unset keys with
    /// defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
