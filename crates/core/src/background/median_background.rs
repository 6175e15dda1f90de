use std::collections::VecDeque;

use ndarray::Array2;

use crate::shared::frame::Frame;
use crate::shared::mask::{BinaryMask, MASK_ON};

/// Rolling-median background model with threshold foreground extraction.
///
/// Keeps the last `window_size` frames and estimates the background as the
/// per-pixel median over the window. A pixel is foreground when its absolute
/// difference from the background strictly exceeds `threshold`.
///
/// `window_size == 1` is an accepted degenerate configuration: the median
/// equals the current frame, so the foreground mask is always empty.
pub struct MedianBackground {
    window_size: usize,
    threshold: u8,
    window: VecDeque<Frame>,
    ready: bool,
    background: Array2<u8>,
    foreground_mask: BinaryMask,
}

impl MedianBackground {
    pub fn new(window_size: usize, threshold: u8) -> Self {
        Self {
            window_size: window_size.max(1),
            threshold,
            window: VecDeque::new(),
            ready: false,
            background: Array2::zeros((0, 0)),
            foreground_mask: BinaryMask::new(0, 0),
        }
    }

    /// Folds one frame into the window and recomputes background and mask.
    ///
    /// The background is recomputed on every update, even before the model
    /// is ready, to allow early preview.
    pub fn update(&mut self, frame: &Frame) {
        debug_assert!(
            self.window
                .front()
                .map_or(true, |f| f.width() == frame.width()
                    && f.height() == frame.height()),
            "all frames must share dimensions"
        );

        self.window.push_back(frame.clone());
        if self.window.len() > self.window_size {
            self.window.pop_front();
        }
        if self.window.len() == self.window_size {
            self.ready = true;
        }

        self.background = self.compute_background(frame);
        self.foreground_mask = self.compute_mask(frame);
    }

    /// Latches true the first time the window has held `window_size` frames.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn background(&self) -> &Array2<u8> {
        &self.background
    }

    pub fn foreground_mask(&self) -> &BinaryMask {
        &self.foreground_mask
    }

    /// The frame with background pixels zeroed. Derived convenience view;
    /// downstream stages consume the mask instead.
    pub fn foreground(&self, frame: &Frame) -> Frame {
        let mask = self.foreground_mask.as_array();
        let data = frame
            .data()
            .iter()
            .zip(mask.iter())
            .map(|(&px, &m)| if m != 0 { px } else { 0 })
            .collect();
        Frame::new(data, frame.width(), frame.height(), frame.index())
    }

    /// Drops all window state, returning the model to its initial state.
    pub fn reset(&mut self) {
        self.window.clear();
        self.ready = false;
        self.background = Array2::zeros((0, 0));
        self.foreground_mask = BinaryMask::new(0, 0);
    }

    fn compute_background(&self, frame: &Frame) -> Array2<u8> {
        let shape = (frame.height() as usize, frame.width() as usize);
        let mut background = Array2::zeros(shape);
        let mut vals: Vec<u8> = Vec::with_capacity(self.window.len());
        for (i, bg) in background.iter_mut().enumerate() {
            vals.clear();
            vals.extend(self.window.iter().map(|f| f.data()[i]));
            vals.sort_unstable();
            *bg = median_of_sorted(&vals);
        }
        background
    }

    fn compute_mask(&self, frame: &Frame) -> BinaryMask {
        let mut mask = Array2::zeros((frame.height() as usize, frame.width() as usize));
        for ((m, &bg), &px) in mask
            .iter_mut()
            .zip(self.background.iter())
            .zip(frame.data())
        {
            if px.abs_diff(bg) > self.threshold {
                *m = MASK_ON;
            }
        }
        BinaryMask::from_array(mask)
    }
}

/// Median of a sorted slice; an even count averages the two middle values
/// with integer truncation.
fn median_of_sorted(vals: &[u8]) -> u8 {
    let mid = vals.len() / 2;
    if vals.len() % 2 == 1 {
        vals[mid]
    } else {
        ((vals[mid - 1] as u16 + vals[mid] as u16) / 2) as u8
    }
}
