use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

/// Adapts a directory of image files to the [`VideoReader`] interface.
///
/// Files are ordered by name, so zero-padded frame numbering yields decode
/// order. Every image is converted to 8-bit grayscale on read; frame
/// indices count successfully decoded frames from 0.
pub struct ImageSequenceReader {
    fps: f64,
    files: Vec<PathBuf>,
    metadata: Option<VideoMetadata>,
}

impl ImageSequenceReader {
    pub fn new() -> Self {
        Self::with_fps(0.0)
    }

    /// Image sequences carry no timing; callers provide the nominal rate
    /// recorded in the metadata.
    pub fn with_fps(fps: f64) -> Self {
        Self {
            fps,
            files: Vec::new(),
            metadata: None,
        }
    }
}

impl Default for ImageSequenceReader {
    fn default() -> Self {
        Self::new()
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn decode_gray(path: &Path) -> Result<(Vec<u8>, u32, u32), Box<dyn std::error::Error>> {
    let gray = image::open(path)
        .map_err(|e| format!("failed to decode {}: {e}", path.display()))?
        .into_luma8();
    let (width, height) = gray.dimensions();
    Ok((gray.into_raw(), width, height))
}

impl VideoReader for ImageSequenceReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        let mut files: Vec<PathBuf> = fs::read_dir(path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_image_file(p))
            .collect();
        files.sort();

        let first = files
            .first()
            .ok_or_else(|| format!("no image frames found in {}", path.display()))?;
        let (_, width, height) = decode_gray(first)?;

        let metadata = VideoMetadata {
            width,
            height,
            fps: self.fps,
            total_frames: files.len(),
            source_path: Some(path.to_path_buf()),
        };
        self.files = files;
        self.metadata = Some(metadata.clone());
        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let Some(metadata) = self.metadata.clone() else {
            return Box::new(std::iter::once(Err("ImageSequenceReader: not opened".into())));
        };
        let files = std::mem::take(&mut self.files);
        Box::new(files.into_iter().enumerate().map(move |(index, file)| {
            let (data, width, height) = decode_gray(&file)?;
            if width != metadata.width || height != metadata.height {
                return Err(format!(
                    "frame dimension mismatch in {}: got {}x{}, expected {}x{}",
                    file.display(),
                    width,
                    height,
                    metadata.width,
                    metadata.height
                )
                .into());
            }
            Ok(Frame::new(data, width, height, index))
        }))
    }

    fn close(&mut self) {
        self.files.clear();
        self.metadata = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_gray_image(dir: &Path, name: &str, width: u32, height: u32, value: u8) -> PathBuf {
        let path = dir.join(name);
        let img = image::GrayImage::from_pixel(width, height, image::Luma([value]));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_open_returns_metadata() {
        let dir = tempfile::tempdir().unwrap();
        write_gray_image(dir.path(), "frame_000.png", 32, 24, 10);
        write_gray_image(dir.path(), "frame_001.png", 32, 24, 20);

        let mut reader = ImageSequenceReader::with_fps(20.0);
        let meta = reader.open(dir.path()).unwrap();
        assert_eq!(meta.width, 32);
        assert_eq!(meta.height, 24);
        assert_eq!(meta.fps, 20.0);
        assert_eq!(meta.total_frames, 2);
        assert_eq!(meta.source_path, Some(dir.path().to_path_buf()));
    }

    #[test]
    fn test_frames_in_name_order_with_indices() {
        let dir = tempfile::tempdir().unwrap();
        // Written out of order; names decide decode order
        write_gray_image(dir.path(), "frame_002.png", 8, 8, 30);
        write_gray_image(dir.path(), "frame_000.png", 8, 8, 10);
        write_gray_image(dir.path(), "frame_001.png", 8, 8, 20);

        let mut reader = ImageSequenceReader::new();
        reader.open(dir.path()).unwrap();
        let frames: Vec<Frame> = reader.frames().map(|f| f.unwrap()).collect();

        assert_eq!(frames.len(), 3);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.index(), i);
        }
        assert_eq!(frames[0].data()[0], 10);
        assert_eq!(frames[1].data()[0], 20);
        assert_eq!(frames[2].data()[0], 30);
    }

    #[test]
    fn test_non_image_files_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_gray_image(dir.path(), "frame_000.png", 8, 8, 10);
        std::fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();

        let mut reader = ImageSequenceReader::new();
        let meta = reader.open(dir.path()).unwrap();
        assert_eq!(meta.total_frames, 1);
    }

    #[test]
    fn test_empty_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = ImageSequenceReader::new();
        assert!(reader.open(dir.path()).is_err());
    }

    #[test]
    fn test_missing_directory_is_error() {
        let mut reader = ImageSequenceReader::new();
        assert!(reader.open(Path::new("/nonexistent/frames")).is_err());
    }

    #[test]
    fn test_frames_without_open_returns_error() {
        let mut reader = ImageSequenceReader::new();
        let result = reader.frames().next().unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn test_dimension_mismatch_is_error() {
        let dir = tempfile::tempdir().unwrap();
        write_gray_image(dir.path(), "frame_000.png", 8, 8, 10);
        write_gray_image(dir.path(), "frame_001.png", 16, 16, 20);

        let mut reader = ImageSequenceReader::new();
        reader.open(dir.path()).unwrap();
        let results: Vec<_> = reader.frames().collect();
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn test_close_then_frames_is_error() {
        let dir = tempfile::tempdir().unwrap();
        write_gray_image(dir.path(), "frame_000.png", 8, 8, 10);

        let mut reader = ImageSequenceReader::new();
        reader.open(dir.path()).unwrap();
        reader.close();
        assert!(reader.frames().next().unwrap().is_err());
    }
}
