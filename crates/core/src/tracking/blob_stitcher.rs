use crate::shared::track::{Track, TrackPoint};
use crate::tracking::blob_matcher::FrameMatch;

/// Chains pairwise frame-to-frame matches into complete tracks.
///
/// Worklist reformulation of a recursive search-forward-and-remove
/// algorithm: consumed pairs are marked in a per-invocation flag arena
/// instead of being deleted from a deep copy, which avoids recursion limits
/// on long tracks and keeps all working state local to a single `stitch`
/// call.
pub struct BlobStitcher;

impl BlobStitcher {
    pub fn new() -> Self {
        Self
    }

    /// Extracts every track from the match sequence.
    ///
    /// Each pair seeds a track unless it was already consumed as the
    /// continuation of an earlier chain, so every pair ends up in exactly
    /// one track: the multiset of links across all output tracks equals the
    /// multiset of input pairs.
    pub fn stitch(&self, matches: &[FrameMatch]) -> Vec<Track> {
        let mut consumed: Vec<Vec<bool>> = matches
            .iter()
            .map(|m| vec![false; m.pairs.len()])
            .collect();
        let mut tracks = Vec::new();

        for start in 0..matches.len() {
            for seed in 0..matches[start].pairs.len() {
                if consumed[start][seed] {
                    continue;
                }
                consumed[start][seed] = true;
                tracks.push(self.extend_chain(matches, &mut consumed, start, seed));
            }
        }
        tracks
    }

    /// Follows one chain forward from a seed pair until no continuation
    /// exists or the match sequence ends.
    fn extend_chain(
        &self,
        matches: &[FrameMatch],
        consumed: &mut [Vec<bool>],
        start: usize,
        seed: usize,
    ) -> Track {
        let seed_pair = &matches[start].pairs[seed];
        let (from_frame, to_frame) = matches[start].frame_pair;
        let mut points = vec![
            TrackPoint {
                frame_index: from_frame,
                blob: seed_pair.from.clone(),
            },
            TrackPoint {
                frame_index: to_frame,
                blob: seed_pair.to.clone(),
            },
        ];

        let mut tail = seed_pair.to.clone();
        for index in start + 1..matches.len() {
            // Continuation: the first unconsumed pair whose earlier half
            // equals the current tail, compared by value.
            let next = matches[index]
                .pairs
                .iter()
                .enumerate()
                .find(|(j, pair)| !consumed[index][*j] && pair.from == tail);
            let Some((j, pair)) = next else {
                break;
            };
            consumed[index][j] = true;
            points.push(TrackPoint {
                frame_index: matches[index].frame_pair.1,
                blob: pair.to.clone(),
            });
            tail = pair.to.clone();
        }

        Track::new(points)
    }
}

impl Default for BlobStitcher {
    fn default() -> Self {
        Self::new()
    }
}
