use ndarray::{ArrayView2, ArrayViewMut2};

/// A single grayscale video frame: contiguous intensity bytes in row-major
/// order.
///
/// Format conversion happens at I/O boundaries only; the domain layer treats
/// pixel data as opaque intensity samples. `index` is the 0-based decode
/// position, one per successfully decoded input frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize),
            "data length must equal width * height"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView2<'_, u8> {
        ArrayView2::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut2<'_, u8> {
        ArrayViewMut2::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Zeroes a rectangle of pixels, clamped to the frame bounds.
    ///
    /// Used at ingest to blank burned-in overlays (e.g. datetime stamps)
    /// before the background model sees the frame.
    pub fn zero_rect(&mut self, x: u32, y: u32, w: u32, h: u32) {
        let x0 = x.min(self.width) as usize;
        let x1 = x.saturating_add(w).min(self.width) as usize;
        let y0 = y.min(self.height) as usize;
        let y1 = y.saturating_add(h).min(self.height) as usize;
        let row_len = self.width as usize;
        for row in y0..y1 {
            self.data[row * row_len + x0..row * row_len + x1].fill(0);
        }
    }

    fn shape(&self) -> (usize, usize) {
        (self.height as usize, self.width as usize)
    }
}
