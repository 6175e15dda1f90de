use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::shared::blob::{Blob, FrameBlobs};

/// A hypothesized identity link between blobs in consecutive frames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlobPair {
    pub from: Blob,
    pub to: Blob,
}

/// Pairwise matching for one consecutive frame pair.
///
/// `pairs` is an injective partial mapping in both directions: at most one
/// pair per earlier-frame blob and at most one per later-frame blob.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameMatch {
    pub frame_pair: (usize, usize),
    pub pairs: Vec<BlobPair>,
}

/// Greedy, distance-ranked 1:1 blob matcher.
///
/// This is a greedy approximation to minimum-weight bipartite matching, not
/// an optimal assignment. That is intentional: ties and near-ties may select
/// an instance-order-dependent pairing, and upgrading to an optimal solver
/// would silently change established behavior.
pub struct BlobMatcher {
    max_blobs: usize,
    max_dist: f64,
}

impl BlobMatcher {
    pub fn new(max_blobs: usize, max_dist: f64) -> Self {
        Self {
            max_blobs,
            max_dist,
        }
    }

    /// Matches blobs of one frame against the next.
    ///
    /// When the earlier frame holds more than `max_blobs` blobs the frame
    /// pair is treated as too ambiguous to match and no pairs are produced;
    /// a deliberate conservative fallback, not an error.
    pub fn match_blobs(&self, earlier: &[Blob], later: &[Blob]) -> Vec<BlobPair> {
        if earlier.len() > self.max_blobs {
            return Vec::new();
        }

        // Candidates in generation order (earlier-major), stable-sorted by
        // distance so ties keep that order.
        let mut candidates: Vec<(f64, usize, usize)> = Vec::with_capacity(earlier.len() * later.len());
        for (ei, from) in earlier.iter().enumerate() {
            for (li, to) in later.iter().enumerate() {
                candidates.push((from.distance_to(to), ei, li));
            }
        }
        candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut resolved_earlier: HashSet<usize> = HashSet::new();
        let mut used_later: HashSet<usize> = HashSet::new();
        let mut pairs = Vec::new();

        for (distance, ei, li) in candidates {
            if resolved_earlier.contains(&ei) || used_later.contains(&li) {
                continue;
            }
            // This is the earlier blob's nearest remaining partner. Accept
            // within the cutoff; beyond it the blob stays unmatched but the
            // remaining earlier blobs are still processed.
            resolved_earlier.insert(ei);
            if distance <= self.max_dist {
                used_later.insert(li);
                pairs.push(BlobPair {
                    from: earlier[ei].clone(),
                    to: later[li].clone(),
                });
            }
        }
        pairs
    }

    /// Matches every consecutive frame pair of a blob sequence.
    pub fn match_sequence(&self, frames: &[FrameBlobs]) -> Vec<FrameMatch> {
        frames
            .windows(2)
            .map(|pair| FrameMatch {
                frame_pair: (pair[0].frame_index, pair[1].frame_index),
                pairs: self.match_blobs(&pair[0].blobs, &pair[1].blobs),
            })
            .collect()
    }
}
