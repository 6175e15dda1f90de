use crate::shared::blob::Blob;

/// Accepts a newly detected blob into `accepted`, fusing it with an earlier
/// blob when their centroids are closer than the spacing threshold.
///
/// The threshold is `spacing` times the longest bounding-box edge across the
/// two blobs being compared. A fused pair replaces the earlier blob in place
/// and the new blob is discarded, modeling a single object erroneously split
/// into two detections.
///
/// Single-pass and order-dependent: the incoming blob is compared only
/// against previously accepted blobs, and a merged blob is not re-checked
/// transitively afterwards.
pub fn accept_with_fusion(accepted: &mut Vec<Blob>, candidate: Blob, spacing: Option<f64>) {
    let Some(spacing) = spacing else {
        accepted.push(candidate);
        return;
    };

    for earlier in accepted.iter_mut() {
        let threshold = earlier.max_dimension().max(candidate.max_dimension()) * spacing;
        if earlier.distance_to(&candidate) < threshold {
            *earlier = earlier.merged_with(&candidate);
            return;
        }
    }
    accepted.push(candidate);
}
