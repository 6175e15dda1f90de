use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::blob::FrameBlobs;
use crate::shared::track::Track;
use crate::tracking::blob_matcher::BlobMatcher;
use crate::tracking::blob_stitcher::BlobStitcher;
use crate::tracking::outlier_filter::{OutlierFilterOutcome, OutlierSegmentFilter};

/// Batch half of the pipeline: pairwise matching, stitching, outlier
/// splitting.
///
/// Stitching needs the complete match sequence before it can emit a single
/// track (a chain may span the whole recording), which makes this the
/// pipeline's natural synchronization point. All stages are pure; the only
/// state is the components' configuration.
pub struct BuildTracksUseCase {
    matcher: BlobMatcher,
    stitcher: BlobStitcher,
    outlier_filter: Option<OutlierSegmentFilter>,
    logger: Box<dyn PipelineLogger>,
}

/// Tracks plus the outlier filter's diagnostics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackBuildOutcome {
    pub tracks: Vec<Track>,
    /// One flag per emitted track: true when it came from a split.
    pub changed: Vec<bool>,
    /// Originals that were split, for diagnostics.
    pub flagged_originals: Vec<Track>,
}

impl BuildTracksUseCase {
    pub fn new(
        matcher: BlobMatcher,
        stitcher: BlobStitcher,
        outlier_filter: Option<OutlierSegmentFilter>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            matcher,
            stitcher,
            outlier_filter,
            logger,
        }
    }

    pub fn execute(&mut self, frame_blobs: &[FrameBlobs]) -> TrackBuildOutcome {
        let matches = self.matcher.match_sequence(frame_blobs);
        let total_pairs: usize = matches.iter().map(|m| m.pairs.len()).sum();
        self.logger.info(&format!(
            "matched {} blob pairs across {} frame pairs",
            total_pairs,
            matches.len()
        ));

        let tracks = self.stitcher.stitch(&matches);
        self.logger
            .info(&format!("stitched {} tracks", tracks.len()));

        match &self.outlier_filter {
            Some(filter) => {
                let OutlierFilterOutcome {
                    tracks,
                    changed,
                    flagged_originals,
                } = filter.filter(&tracks);
                if !flagged_originals.is_empty() {
                    self.logger.info(&format!(
                        "outlier filter split {} tracks",
                        flagged_originals.len()
                    ));
                }
                TrackBuildOutcome {
                    tracks,
                    changed,
                    flagged_originals,
                }
            }
            None => {
                let changed = vec![false; tracks.len()];
                TrackBuildOutcome {
                    tracks,
                    changed,
                    flagged_originals: Vec::new(),
                }
            }
        }
    }
}
