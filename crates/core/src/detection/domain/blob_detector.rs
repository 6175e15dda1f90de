use crate::shared::blob::Blob;
use crate::shared::mask::BinaryMask;

/// Domain interface for per-frame blob extraction.
///
/// Implementations may carry configuration or scratch state, hence
/// `&mut self`.
pub trait BlobDetector: Send {
    /// Extracts the blobs present in one frame's foreground mask, in
    /// discovery order. An empty result is a normal outcome, not an error.
    fn detect(&mut self, mask: &BinaryMask) -> Result<Vec<Blob>, Box<dyn std::error::Error>>;
}
