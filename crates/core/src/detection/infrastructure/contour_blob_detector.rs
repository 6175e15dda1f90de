use crate::detection::domain::blob_detector::BlobDetector;
use crate::detection::domain::blob_fusion::accept_with_fusion;
use crate::detection::infrastructure::mask_ops::{
    close, find_external_regions, open, Kernel, Region,
};
use crate::shared::blob::Blob;
use crate::shared::mask::BinaryMask;
use crate::shared::params::{KernelShape, TrackingParams};

/// Configuration for contour-based blob extraction.
#[derive(Clone, Debug, PartialEq)]
pub struct BlobDetectorConfig {
    pub filter_by_area: bool,
    /// Lower area bound; absent means unbounded below.
    pub min_area: Option<f64>,
    /// Upper area bound; absent means unbounded above.
    pub max_area: Option<f64>,
    pub open_kernel_size: (u32, u32),
    pub close_kernel_size: (u32, u32),
    pub kernel_shape: KernelShape,
    /// Fusion threshold as a fraction of the longest blob dimension;
    /// absent disables fusion.
    pub min_interblob_spacing: Option<f64>,
}

impl Default for BlobDetectorConfig {
    fn default() -> Self {
        let params = TrackingParams::default();
        Self::from_params(&params)
    }
}

impl BlobDetectorConfig {
    pub fn from_params(params: &TrackingParams) -> Self {
        Self {
            filter_by_area: true,
            min_area: params.min_area,
            max_area: params.max_area,
            open_kernel_size: params.open_kernel_size,
            close_kernel_size: params.close_kernel_size,
            kernel_shape: params.kernel_shape,
            min_interblob_spacing: params.min_interblob_spacing,
        }
    }
}

/// Extracts blobs from a foreground mask via external-region analysis.
///
/// Pipeline per call: morphological open-then-close (skipped entirely when
/// the open kernel has zero area), external-region extraction in discovery
/// order, moment-based area/centroid with area filtering, bounding boxes,
/// and finally single-pass blob fusion for detections judged to be one
/// object split in two.
pub struct ContourBlobDetector {
    config: BlobDetectorConfig,
    open_kernel: Option<Kernel>,
    close_kernel: Option<Kernel>,
}

impl ContourBlobDetector {
    pub fn new(config: BlobDetectorConfig) -> Self {
        let open_kernel = Kernel::new(
            config.kernel_shape,
            config.open_kernel_size.0,
            config.open_kernel_size.1,
        );
        let close_kernel = Kernel::new(
            config.kernel_shape,
            config.close_kernel_size.0,
            config.close_kernel_size.1,
        );
        Self {
            config,
            open_kernel,
            close_kernel,
        }
    }

    fn filtered_mask(&self, mask: &BinaryMask) -> Option<BinaryMask> {
        // A zero-area open kernel disables the whole filtering step.
        let open_kernel = self.open_kernel.as_ref()?;
        let mut filtered = open(mask, open_kernel);
        if let Some(close_kernel) = &self.close_kernel {
            filtered = close(&filtered, close_kernel);
        }
        Some(filtered)
    }

    fn region_passes_area_filter(&self, region: &Region) -> bool {
        if !self.config.filter_by_area {
            return true;
        }
        let area = region.moments.m00;
        if area <= 0.0 {
            return false;
        }
        if self.config.min_area.is_some_and(|min| area < min) {
            return false;
        }
        if self.config.max_area.is_some_and(|max| area > max) {
            return false;
        }
        true
    }
}

impl BlobDetector for ContourBlobDetector {
    fn detect(&mut self, mask: &BinaryMask) -> Result<Vec<Blob>, Box<dyn std::error::Error>> {
        let filtered = self.filtered_mask(mask);
        let working = filtered.as_ref().unwrap_or(mask);

        let mut blobs: Vec<Blob> = Vec::new();
        for region in find_external_regions(working) {
            if !self.region_passes_area_filter(&region) {
                continue;
            }
            // A region with no mass is degenerate geometry: excluded, not
            // a numeric fault.
            let Some((centroid_x, centroid_y)) = region.moments.centroid() else {
                continue;
            };
            let blob = Blob {
                centroid_x,
                centroid_y,
                min_x: region.min_x as f64,
                min_y: region.min_y as f64,
                max_x: (region.max_x + 1) as f64,
                max_y: (region.max_y + 1) as f64,
                area: region.moments.m00,
            };
            accept_with_fusion(&mut blobs, blob, self.config.min_interblob_spacing);
        }
        Ok(blobs)
    }
}
