//! Pixel-level primitives over binary masks.
//!
//! External-region extraction with image moments and bounding boxes, plus
//! binary morphology with rectangular and elliptical structuring elements.
//! These are the image-processing collaborators the detector builds on; the
//! domain layer never touches pixels directly.

use std::collections::VecDeque;

use crate::shared::mask::BinaryMask;
use crate::shared::params::KernelShape;

/// Zeroth and first image moments of a pixel region.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    /// Centroid `(x, y)`, or `None` for a degenerate region with `m00 == 0`.
    /// The caller excludes such regions instead of dividing by zero.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.m00 > 0.0 {
            Some((self.m10 / self.m00, self.m01 / self.m00))
        } else {
            None
        }
    }
}

/// One external region of set pixels: moments plus inclusive pixel bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub moments: Moments,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

/// Extracts all external 4-connected regions of set pixels.
///
/// Regions are returned in discovery order: a row-major scan, so ordering is
/// deterministic for a given mask.
pub fn find_external_regions(mask: &BinaryMask) -> Vec<Region> {
    let (w, h) = (mask.width(), mask.height());
    let mut visited = vec![false; (w as usize) * (h as usize)];
    let mut regions = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) as usize;
            if visited[idx] || !mask.is_set(x, y) {
                continue;
            }
            regions.push(flood_region(mask, &mut visited, x, y));
        }
    }
    regions
}

fn flood_region(mask: &BinaryMask, visited: &mut [bool], start_x: u32, start_y: u32) -> Region {
    let w = mask.width();
    let mut queue = VecDeque::from([(start_x, start_y)]);
    visited[(start_y * w + start_x) as usize] = true;

    let mut moments = Moments::default();
    let (mut min_x, mut min_y) = (start_x, start_y);
    let (mut max_x, mut max_y) = (start_x, start_y);

    while let Some((x, y)) = queue.pop_front() {
        moments.m00 += 1.0;
        moments.m10 += x as f64;
        moments.m01 += y as f64;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);

        for (nx, ny) in neighbors4(x, y, mask.width(), mask.height()) {
            let idx = (ny * w + nx) as usize;
            if !visited[idx] && mask.is_set(nx, ny) {
                visited[idx] = true;
                queue.push_back((nx, ny));
            }
        }
    }

    Region {
        moments,
        min_x,
        min_y,
        max_x,
        max_y,
    }
}

fn neighbors4(x: u32, y: u32, w: u32, h: u32) -> impl Iterator<Item = (u32, u32)> {
    let (x, y) = (x as i64, y as i64);
    [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]
        .into_iter()
        .filter(move |&(nx, ny)| nx >= 0 && ny >= 0 && nx < w as i64 && ny < h as i64)
        .map(|(nx, ny)| (nx as u32, ny as u32))
}

/// Structuring element for binary morphology: a set of offsets around an
/// anchor at the kernel center.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    offsets: Vec<(i64, i64)>,
}

impl Kernel {
    /// Builds a kernel of the given shape and size.
    ///
    /// Returns `None` for a zero-area kernel, which callers treat as
    /// "morphology disabled".
    pub fn new(shape: KernelShape, width: u32, height: u32) -> Option<Kernel> {
        if width == 0 || height == 0 {
            return None;
        }
        let cx = (width as i64 - 1) / 2;
        let cy = (height as i64 - 1) / 2;
        let mut offsets = Vec::new();
        for ky in 0..height as i64 {
            for kx in 0..width as i64 {
                if shape == KernelShape::Rect || in_ellipse(kx, ky, width, height) {
                    offsets.push((kx - cx, ky - cy));
                }
            }
        }
        if offsets.is_empty() {
            // Tiny even-sized ellipses can miss every cell; keep the anchor
            // so the kernel stays a no-op rather than degenerate.
            offsets.push((0, 0));
        }
        Some(Kernel { offsets })
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Membership test for the inscribed ellipse of a `width x height` kernel.
fn in_ellipse(kx: i64, ky: i64, width: u32, height: u32) -> bool {
    let rx = ((width as f64) - 1.0) / 2.0;
    let ry = ((height as f64) - 1.0) / 2.0;
    if rx == 0.0 || ry == 0.0 {
        // Degenerate axis: a line kernel
        return (rx == 0.0 || (kx as f64 - rx).abs() <= rx)
            && (ry == 0.0 || (ky as f64 - ry).abs() <= ry);
    }
    let dx = (kx as f64 - rx) / rx;
    let dy = (ky as f64 - ry) / ry;
    dx * dx + dy * dy <= 1.0
}

/// Erosion: a pixel survives only if every kernel offset lands on a set
/// pixel. Out-of-bounds offsets count as unset.
pub fn erode(mask: &BinaryMask, kernel: &Kernel) -> BinaryMask {
    morphology(mask, kernel, true)
}

/// Dilation: a pixel is set if any kernel offset lands on a set pixel.
pub fn dilate(mask: &BinaryMask, kernel: &Kernel) -> BinaryMask {
    morphology(mask, kernel, false)
}

/// Open (erode then dilate): suppresses isolated noise pixels.
pub fn open(mask: &BinaryMask, kernel: &Kernel) -> BinaryMask {
    dilate(&erode(mask, kernel), kernel)
}

/// Close (dilate then erode): rejoins regions split by small gaps.
pub fn close(mask: &BinaryMask, kernel: &Kernel) -> BinaryMask {
    erode(&dilate(mask, kernel), kernel)
}

fn morphology(mask: &BinaryMask, kernel: &Kernel, require_all: bool) -> BinaryMask {
    let (w, h) = (mask.width(), mask.height());
    let mut out = BinaryMask::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut hits = 0usize;
            for &(dx, dy) in &kernel.offsets {
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                let set = nx >= 0
                    && ny >= 0
                    && nx < w as i64
                    && ny < h as i64
                    && mask.is_set(nx as u32, ny as u32);
                if set {
                    hits += 1;
                } else if require_all {
                    hits = 0;
                    break;
                }
            }
            let on = if require_all {
                hits == kernel.offsets.len()
            } else {
                hits > 0
            };
            if on {
                out.set(x, y, true);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn mask_from_rows(rows: &[&str]) -> BinaryMask {
        let h = rows.len() as u32;
        let w = rows[0].len() as u32;
        let mut mask = BinaryMask::new(w, h);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                if c == '#' {
                    mask.set(x as u32, y as u32, true);
                }
            }
        }
        mask
    }

    // ── Region extraction ────────────────────────────────────────────

    #[test]
    fn test_empty_mask_has_no_regions() {
        let mask = BinaryMask::new(8, 8);
        assert!(find_external_regions(&mask).is_empty());
    }

    #[test]
    fn test_single_pixel_region() {
        let mask = mask_from_rows(&["....", ".#..", "....", "...."]);
        let regions = find_external_regions(&mask);
        assert_eq!(regions.len(), 1);
        assert_relative_eq!(regions[0].moments.m00, 1.0);
        assert_eq!(regions[0].moments.centroid(), Some((1.0, 1.0)));
        assert_eq!(
            (regions[0].min_x, regions[0].min_y, regions[0].max_x, regions[0].max_y),
            (1, 1, 1, 1)
        );
    }

    #[test]
    fn test_square_region_moments() {
        let mask = mask_from_rows(&["....", ".##.", ".##.", "...."]);
        let regions = find_external_regions(&mask);
        assert_eq!(regions.len(), 1);
        assert_relative_eq!(regions[0].moments.m00, 4.0);
        let (cx, cy) = regions[0].moments.centroid().unwrap();
        assert_relative_eq!(cx, 1.5);
        assert_relative_eq!(cy, 1.5);
    }

    #[test]
    fn test_two_separate_regions_in_discovery_order() {
        let mask = mask_from_rows(&["#....", ".....", "...##", "...##"]);
        let regions = find_external_regions(&mask);
        assert_eq!(regions.len(), 2);
        // Row-major scan finds the top-left pixel first
        assert_eq!(regions[0].moments.centroid(), Some((0.0, 0.0)));
        let (cx, cy) = regions[1].moments.centroid().unwrap();
        assert_relative_eq!(cx, 3.5);
        assert_relative_eq!(cy, 2.5);
    }

    #[test]
    fn test_diagonal_pixels_are_separate_regions() {
        // 4-connectivity: diagonal adjacency does not join regions
        let mask = mask_from_rows(&["#.", ".#"]);
        assert_eq!(find_external_regions(&mask).len(), 2);
    }

    #[test]
    fn test_l_shape_is_one_region() {
        let mask = mask_from_rows(&["#..", "#..", "##."]);
        let regions = find_external_regions(&mask);
        assert_eq!(regions.len(), 1);
        assert_relative_eq!(regions[0].moments.m00, 4.0);
        assert_eq!(
            (regions[0].min_x, regions[0].min_y, regions[0].max_x, regions[0].max_y),
            (0, 0, 1, 2)
        );
    }

    #[test]
    fn test_zero_moment_centroid_is_none() {
        assert_eq!(Moments::default().centroid(), None);
    }

    // ── Kernels ──────────────────────────────────────────────────────

    #[test]
    fn test_zero_area_kernel_is_none() {
        assert!(Kernel::new(KernelShape::Rect, 0, 0).is_none());
        assert!(Kernel::new(KernelShape::Ellipse, 0, 3).is_none());
        assert!(Kernel::new(KernelShape::Rect, 3, 0).is_none());
    }

    #[test]
    fn test_rect_kernel_is_full() {
        let kernel = Kernel::new(KernelShape::Rect, 3, 3).unwrap();
        assert_eq!(kernel.len(), 9);
    }

    #[test]
    fn test_ellipse_3x3_is_cross() {
        let kernel = Kernel::new(KernelShape::Ellipse, 3, 3).unwrap();
        assert_eq!(kernel.len(), 5);
    }

    #[rstest]
    #[case::one_by_one(1, 1, 1)]
    #[case::five_by_five(5, 5, 13)]
    fn test_ellipse_kernel_sizes(#[case] w: u32, #[case] h: u32, #[case] expected: usize) {
        let kernel = Kernel::new(KernelShape::Ellipse, w, h).unwrap();
        assert_eq!(kernel.len(), expected);
    }

    // ── Morphology ───────────────────────────────────────────────────

    #[test]
    fn test_erode_removes_isolated_pixel() {
        let mask = mask_from_rows(&[".....", "..#..", ".....", ".....", "....."]);
        let kernel = Kernel::new(KernelShape::Rect, 3, 3).unwrap();
        assert_eq!(erode(&mask, &kernel).count_set(), 0);
    }

    #[test]
    fn test_erode_keeps_core_of_solid_block() {
        let mask = mask_from_rows(&["#####", "#####", "#####", "#####", "#####"]);
        let kernel = Kernel::new(KernelShape::Rect, 3, 3).unwrap();
        let eroded = erode(&mask, &kernel);
        // Only the 3x3 interior survives (borders see out-of-bounds)
        assert_eq!(eroded.count_set(), 9);
        assert!(eroded.is_set(2, 2));
        assert!(!eroded.is_set(0, 0));
    }

    #[test]
    fn test_dilate_grows_single_pixel() {
        let mask = mask_from_rows(&[".....", ".....", "..#..", ".....", "....."]);
        let kernel = Kernel::new(KernelShape::Ellipse, 3, 3).unwrap();
        let dilated = dilate(&mask, &kernel);
        assert_eq!(dilated.count_set(), 5); // cross shape
        assert!(dilated.is_set(2, 2));
        assert!(dilated.is_set(1, 2));
        assert!(dilated.is_set(3, 2));
        assert!(dilated.is_set(2, 1));
        assert!(dilated.is_set(2, 3));
    }

    #[test]
    fn test_open_suppresses_noise_keeps_blob() {
        let mask = mask_from_rows(&[
            "#......",
            ".......",
            "..###..",
            "..###..",
            "..###..",
            ".......",
            ".......",
        ]);
        let kernel = Kernel::new(KernelShape::Rect, 2, 2).unwrap();
        let opened = open(&mask, &kernel);
        assert!(!opened.is_set(0, 0), "isolated noise pixel removed");
        assert!(opened.is_set(3, 3), "blob core preserved");
    }

    #[test]
    fn test_close_rejoins_split_region() {
        let mask = mask_from_rows(&["##.##"]);
        let kernel = Kernel::new(KernelShape::Rect, 3, 1).unwrap();
        let closed = close(&mask, &kernel);
        assert!(closed.is_set(2, 0), "one-pixel gap bridged");
        assert_eq!(find_external_regions(&closed).len(), 1);
    }
}
