use crate::shared::track::Track;

/// Result of outlier-segment filtering over a track list.
///
/// `changed` carries one flag per emitted track; `flagged_originals` holds
/// the pre-split originals for diagnostics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutlierFilterOutcome {
    pub tracks: Vec<Track>,
    pub changed: Vec<bool>,
    pub flagged_originals: Vec<Track>,
}

/// Splits tracks at steps with anomalous displacement.
///
/// A step is flagged when its deviation from the track's central step
/// length exceeds `max(spread * multiplier, floor_pixels)`, where central
/// value and spread are either (mean, standard deviation) or (median,
/// median absolute deviation). The floor keeps short jittery tracks from
/// being shredded by a tiny spread.
pub struct OutlierSegmentFilter {
    multiplier: f64,
    use_mad: bool,
    floor_pixels: f64,
}

impl OutlierSegmentFilter {
    pub fn new(multiplier: f64, use_mad: bool, floor_pixels: f64) -> Self {
        Self {
            multiplier,
            use_mad,
            floor_pixels,
        }
    }

    pub fn filter(&self, tracks: &[Track]) -> OutlierFilterOutcome {
        let mut outcome = OutlierFilterOutcome::default();

        for track in tracks {
            // Too short to compute a spread: passes through unchanged.
            if track.len() <= 2 {
                outcome.tracks.push(track.clone());
                outcome.changed.push(false);
                continue;
            }

            let cuts = self.flagged_cut_points(track);
            if cuts.is_empty() {
                outcome.tracks.push(track.clone());
                outcome.changed.push(false);
                continue;
            }

            outcome.flagged_originals.push(track.clone());

            let mut boundaries = Vec::with_capacity(cuts.len() + 2);
            boundaries.push(0);
            boundaries.extend(cuts);
            boundaries.push(track.len());

            for pair in boundaries.windows(2) {
                let fragment = &track.points[pair[0]..pair[1]];
                if fragment.len() > 1 {
                    outcome.tracks.push(Track::new(fragment.to_vec()));
                    outcome.changed.push(true);
                }
            }
        }
        outcome
    }

    /// Point indices at which to cut: a flagged step between points `i` and
    /// `i + 1` cuts before point `i + 1`.
    fn flagged_cut_points(&self, track: &Track) -> Vec<usize> {
        let steps = track.step_magnitudes();
        let (center, spread) = if self.use_mad {
            (median(&steps), mad(&steps))
        } else {
            (mean(&steps), std_dev(&steps))
        };
        let threshold = (spread * self.multiplier).max(self.floor_pixels);

        steps
            .iter()
            .enumerate()
            .filter(|(_, &step)| (step - center).abs() > threshold)
            .map(|(i, _)| i + 1)
            .collect()
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Median absolute deviation from the median.
fn mad(values: &[f64]) -> f64 {
    let med = median(values);
    let deviations: Vec<f64> = values.iter().map(|v| (v - med).abs()).collect();
    median(&deviations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::blob::Blob;
    use crate::shared::track::TrackPoint;
    use approx::assert_relative_eq;

    fn point(frame_index: usize, cx: f64) -> TrackPoint {
        TrackPoint {
            frame_index,
            blob: Blob {
                centroid_x: cx,
                centroid_y: 0.0,
                min_x: cx,
                min_y: 0.0,
                max_x: cx,
                max_y: 0.0,
                area: 1.0,
            },
        }
    }

    /// Track walking the given x positions at one frame per step.
    fn track_from_xs(xs: &[f64]) -> Track {
        Track::new(
            xs.iter()
                .enumerate()
                .map(|(i, &x)| point(i, x))
                .collect(),
        )
    }

    // ── Statistics helpers ───────────────────────────────────────────

    #[test]
    fn test_mean_and_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&values), 5.0);
        assert_relative_eq!(std_dev(&values), 2.0);
    }

    #[test]
    fn test_median_odd_even() {
        assert_relative_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_relative_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_mad() {
        // median 2, |dev| = [1, 0, 1] -> mad 1
        assert_relative_eq!(mad(&[1.0, 2.0, 3.0]), 1.0);
    }

    #[test]
    fn test_empty_stats_are_zero() {
        assert_relative_eq!(mean(&[]), 0.0);
        assert_relative_eq!(std_dev(&[]), 0.0);
        assert_relative_eq!(median(&[]), 0.0);
    }

    // ── Filtering ────────────────────────────────────────────────────

    #[test]
    fn test_short_tracks_pass_through() {
        let filter = OutlierSegmentFilter::new(1.0, false, 0.0);
        let tracks = vec![track_from_xs(&[0.0, 500.0])];
        let outcome = filter.filter(&tracks);

        assert_eq!(outcome.tracks, tracks);
        assert_eq!(outcome.changed, vec![false]);
        assert!(outcome.flagged_originals.is_empty());
    }

    #[test]
    fn test_uniform_track_unchanged() {
        let filter = OutlierSegmentFilter::new(1.0, false, 5.0);
        let tracks = vec![track_from_xs(&[0.0, 10.0, 20.0, 30.0, 40.0])];
        let outcome = filter.filter(&tracks);

        assert_eq!(outcome.tracks.len(), 1);
        assert_eq!(outcome.changed, vec![false]);
        assert!(outcome.flagged_originals.is_empty());
    }

    #[test]
    fn test_outlier_step_splits_track() {
        // Steps: 10, 10, 10, 300, 10, 10: the jump is flagged and the
        // track splits around it.
        let filter = OutlierSegmentFilter::new(1.0, false, 50.0);
        let tracks = vec![track_from_xs(&[
            0.0, 10.0, 20.0, 30.0, 330.0, 340.0, 350.0,
        ])];
        let outcome = filter.filter(&tracks);

        assert_eq!(outcome.tracks.len(), 2);
        assert_eq!(outcome.changed, vec![true, true]);
        assert_eq!(outcome.flagged_originals.len(), 1);
        assert_eq!(outcome.tracks[0].len(), 4);
        assert_eq!(outcome.tracks[1].len(), 3);
    }

    #[test]
    fn test_fragments_reassemble_original() {
        let filter = OutlierSegmentFilter::new(1.0, false, 50.0);
        let original = track_from_xs(&[0.0, 10.0, 20.0, 30.0, 330.0, 340.0, 350.0]);
        let outcome = filter.filter(&[original.clone()]);

        let reassembled: Vec<TrackPoint> = outcome
            .tracks
            .iter()
            .flat_map(|t| t.points.iter().cloned())
            .collect();
        assert_eq!(reassembled, original.points);
    }

    #[test]
    fn test_no_singleton_fragments() {
        // Outlier on the very first step: the leading fragment would be a
        // single point and must be dropped.
        let filter = OutlierSegmentFilter::new(1.0, false, 50.0);
        let tracks = vec![track_from_xs(&[0.0, 300.0, 310.0, 320.0, 330.0])];
        let outcome = filter.filter(&tracks);

        assert!(outcome.tracks.iter().all(|t| t.len() > 1));
        assert_eq!(outcome.tracks.len(), 1);
        assert_eq!(outcome.tracks[0].len(), 4);
        assert_eq!(outcome.changed, vec![true]);
        assert_eq!(outcome.flagged_originals.len(), 1);
    }

    #[test]
    fn test_floor_suppresses_small_deviations() {
        // Deviations well above the spread but below the pixel floor.
        let filter = OutlierSegmentFilter::new(1.0, false, 500.0);
        let tracks = vec![track_from_xs(&[0.0, 10.0, 20.0, 130.0, 140.0])];
        let outcome = filter.filter(&tracks);

        assert_eq!(outcome.changed, vec![false]);
        assert_eq!(outcome.tracks.len(), 1);
    }

    #[test]
    fn test_mad_mode_resists_outlier_inflation() {
        // With the outlier itself inflating mean and std, the MAD variant
        // still flags the jump.
        let filter = OutlierSegmentFilter::new(3.0, true, 10.0);
        let tracks = vec![track_from_xs(&[
            0.0, 10.0, 20.0, 30.0, 40.0, 440.0, 450.0, 460.0, 470.0,
        ])];
        let outcome = filter.filter(&tracks);

        assert_eq!(outcome.flagged_originals.len(), 1);
        assert_eq!(outcome.tracks.len(), 2);
        assert_eq!(outcome.tracks[0].len(), 5);
        assert_eq!(outcome.tracks[1].len(), 4);
    }

    #[test]
    fn test_three_point_track_is_eligible() {
        // Length 3 is the shortest track the filter will consider. With two
        // steps each deviation equals the spread, so a sub-1 multiplier is
        // needed to flag anything.
        let filter = OutlierSegmentFilter::new(0.5, false, 10.0);
        let tracks = vec![track_from_xs(&[0.0, 5.0, 400.0])];
        let outcome = filter.filter(&tracks);
        // Steps 5 and 395 both deviate 195 > max(195 * 0.5, 10): every
        // fragment is a singleton and gets dropped.
        assert!(outcome.tracks.is_empty());
        assert!(outcome.changed.is_empty());
        assert_eq!(outcome.flagged_originals.len(), 1);
    }

    #[test]
    fn test_mixed_tracks_keep_flag_alignment() {
        let filter = OutlierSegmentFilter::new(1.0, false, 50.0);
        let clean = track_from_xs(&[0.0, 10.0, 20.0]);
        let split = track_from_xs(&[0.0, 10.0, 20.0, 30.0, 330.0, 340.0, 350.0]);
        let outcome = filter.filter(&[clean.clone(), split]);

        assert_eq!(outcome.tracks.len(), 3);
        assert_eq!(outcome.changed, vec![false, true, true]);
        assert_eq!(outcome.tracks[0], clean);
    }
}
