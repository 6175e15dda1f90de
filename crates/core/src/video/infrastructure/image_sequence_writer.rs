use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

/// Writes frames as a numbered PNG sequence: `frame_000000.png`, ...
///
/// The nominal frame rate travels in the metadata; a still-image sequence
/// has no per-file use for it.
pub struct ImageSequenceWriter {
    dir: Option<PathBuf>,
    next_number: usize,
}

impl ImageSequenceWriter {
    pub fn new() -> Self {
        Self {
            dir: None,
            next_number: 0,
        }
    }
}

impl Default for ImageSequenceWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoWriter for ImageSequenceWriter {
    fn open(
        &mut self,
        path: &Path,
        _metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        fs::create_dir_all(path)?;
        self.dir = Some(path.to_path_buf());
        self.next_number = 0;
        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let dir = self
            .dir
            .as_ref()
            .ok_or("ImageSequenceWriter: not opened")?;
        let image =
            image::GrayImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
                .ok_or("frame buffer does not match its dimensions")?;
        let path = dir.join(format!("frame_{:06}.png", self.next_number));
        image.save(&path)?;
        self.next_number += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.dir = None;
        Ok(())
    }
}
