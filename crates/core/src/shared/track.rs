use serde::{Deserialize, Serialize};

use crate::shared::blob::Blob;

/// One observation within a track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    #[serde(rename = "frame")]
    pub frame_index: usize,
    pub blob: Blob,
}

/// A chain of blobs across frames hypothesized to be the same physical
/// object. Always at least two points with strictly increasing frame
/// indices; each consecutive pair is backed by a blob pair from some
/// frame match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub points: Vec<TrackPoint>,
}

impl Track {
    pub fn new(points: Vec<TrackPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Per-step centroid displacement magnitudes, one per consecutive
    /// point pair.
    pub fn step_magnitudes(&self) -> Vec<f64> {
        self.points
            .windows(2)
            .map(|pair| pair[0].blob.distance_to(&pair[1].blob))
            .collect()
    }
}
