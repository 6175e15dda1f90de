use ndarray::Array2;

/// Value of a set mask pixel.
pub const MASK_ON: u8 = 255;

/// A binary foreground mask; every pixel is either 0 or [`MASK_ON`].
///
/// Stored as `(height, width)` like frame data, so flat iteration order
/// matches `Frame::data`.
#[derive(Clone, Debug, PartialEq)]
pub struct BinaryMask {
    data: Array2<u8>,
}

impl BinaryMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: Array2::zeros((height as usize, width as usize)),
        }
    }

    pub fn from_array(data: Array2<u8>) -> Self {
        Self { data }
    }

    pub fn width(&self) -> u32 {
        self.data.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.data.nrows() as u32
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        self.data[[y as usize, x as usize]] != 0
    }

    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        self.data[[y as usize, x as usize]] = if on { MASK_ON } else { 0 };
    }

    pub fn count_set(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    pub fn as_array(&self) -> &Array2<u8> {
        &self.data
    }
}
