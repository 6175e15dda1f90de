use serde::{Deserialize, Serialize};

/// A filtered, moment-characterized foreground region in one frame.
///
/// Created by the blob detector; mutated only by the fusion step within the
/// same detection pass. `area >= 0` and the bounding box satisfies
/// `min_x <= max_x`, `min_y <= max_y` for valid blobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    pub centroid_x: f64,
    pub centroid_y: f64,
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub area: f64,
}

impl Blob {
    /// Euclidean centroid-to-centroid distance.
    pub fn distance_to(&self, other: &Blob) -> f64 {
        let dx = self.centroid_x - other.centroid_x;
        let dy = self.centroid_y - other.centroid_y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Longest edge of the bounding box.
    pub fn max_dimension(&self) -> f64 {
        let dx = (self.max_x - self.min_x).abs();
        let dy = (self.max_y - self.min_y).abs();
        dx.max(dy)
    }

    /// Merge with another same-frame blob judged to be one object
    /// erroneously split: mean centroid, summed area, union bounding box.
    pub fn merged_with(&self, other: &Blob) -> Blob {
        Blob {
            centroid_x: (self.centroid_x + other.centroid_x) / 2.0,
            centroid_y: (self.centroid_y + other.centroid_y) / 2.0,
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
            area: self.area + other.area,
        }
    }
}

/// Blobs detected in one frame with a ready background model.
///
/// Doubles as the persisted per-frame record: serializes to
/// `{"frame": <index>, "blobs": [...]}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameBlobs {
    #[serde(rename = "frame")]
    pub frame_index: usize,
    pub blobs: Vec<Blob>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn blob(cx: f64, cy: f64) -> Blob {
        Blob {
            centroid_x: cx,
            centroid_y: cy,
            min_x: cx - 1.0,
            min_y: cy - 1.0,
            max_x: cx + 1.0,
            max_y: cy + 1.0,
            area: 4.0,
        }
    }

    #[rstest]
    #[case::same_point(blob(5.0, 5.0), blob(5.0, 5.0), 0.0)]
    #[case::horizontal(blob(0.0, 0.0), blob(3.0, 0.0), 3.0)]
    #[case::diagonal(blob(0.0, 0.0), blob(3.0, 4.0), 5.0)]
    fn test_distance(#[case] a: Blob, #[case] b: Blob, #[case] expected: f64) {
        assert_relative_eq!(a.distance_to(&b), expected);
        assert_relative_eq!(b.distance_to(&a), expected);
    }

    #[test]
    fn test_max_dimension_prefers_longer_edge() {
        let b = Blob {
            centroid_x: 0.0,
            centroid_y: 0.0,
            min_x: 0.0,
            min_y: 0.0,
            max_x: 10.0,
            max_y: 4.0,
            area: 40.0,
        };
        assert_relative_eq!(b.max_dimension(), 10.0);
    }

    #[test]
    fn test_merged_with_averages_centroid_and_sums_area() {
        let a = blob(0.0, 0.0);
        let b = blob(4.0, 2.0);
        let merged = a.merged_with(&b);
        assert_relative_eq!(merged.centroid_x, 2.0);
        assert_relative_eq!(merged.centroid_y, 1.0);
        assert_relative_eq!(merged.area, 8.0);
    }

    #[test]
    fn test_merged_with_takes_union_bbox() {
        let a = blob(0.0, 0.0);
        let b = blob(4.0, 2.0);
        let merged = a.merged_with(&b);
        assert_relative_eq!(merged.min_x, -1.0);
        assert_relative_eq!(merged.min_y, -1.0);
        assert_relative_eq!(merged.max_x, 5.0);
        assert_relative_eq!(merged.max_y, 3.0);
    }

    #[test]
    fn test_frame_blobs_record_shape() {
        let record = FrameBlobs {
            frame_index: 17,
            blobs: vec![blob(1.0, 2.0)],
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.starts_with("{\"frame\":17,"));
        assert!(json.contains("\"blobs\":["));

        let back: FrameBlobs = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
