use std::path::Path;
use std::time::Instant;

use crate::background::median_background::MedianBackground;
use crate::detection::domain::blob_detector::BlobDetector;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::blob::FrameBlobs;
use crate::shared::drawing::annotate_frame;
use crate::shared::params::MaskRect;
use crate::shared::video_metadata::VideoMetadata;
use crate::storage::blob_records::BlobRecordWriter;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

/// Streaming half of the pipeline: frame source -> datetime mask ->
/// background model -> blob detector, with optional blob-record and
/// annotated-frame sinks.
///
/// Frames are processed one at a time in decode order; frames seen before
/// the background model is ready update the model but produce no blobs.
/// End-of-stream is the normal termination signal.
pub struct DetectBlobsUseCase {
    reader: Box<dyn VideoReader>,
    detector: Box<dyn BlobDetector>,
    background: MedianBackground,
    record_writer: Option<BlobRecordWriter>,
    annotated_writer: Option<Box<dyn VideoWriter>>,
    datetime_mask: Option<MaskRect>,
    logger: Box<dyn PipelineLogger>,
}

impl DetectBlobsUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        detector: Box<dyn BlobDetector>,
        background: MedianBackground,
        record_writer: Option<BlobRecordWriter>,
        annotated_writer: Option<Box<dyn VideoWriter>>,
        datetime_mask: Option<MaskRect>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            reader,
            detector,
            background,
            record_writer,
            annotated_writer,
            datetime_mask,
            logger,
        }
    }

    /// Runs the streaming loop to end-of-stream and returns the collected
    /// per-frame blob lists.
    ///
    /// `annotated_path` is required when an annotated writer was supplied.
    pub fn execute(
        &mut self,
        metadata: &VideoMetadata,
        annotated_path: Option<&Path>,
    ) -> Result<Vec<FrameBlobs>, Box<dyn std::error::Error>> {
        if let Some(writer) = self.annotated_writer.as_mut() {
            let path = annotated_path.ok_or("annotated output path required")?;
            writer.open(path, metadata)?;
        }

        let result = self.process_frames(metadata);

        // Sinks are closed on both success and failure; the first error wins.
        self.reader.close();
        let writer_closed = match self.annotated_writer.as_mut() {
            Some(writer) => writer.close(),
            None => Ok(()),
        };
        let records_finished: Result<(), Box<dyn std::error::Error>> =
            match self.record_writer.take() {
                Some(writer) => writer.finish().map_err(Into::into),
                None => Ok(()),
            };

        let collected = result?;
        writer_closed?;
        records_finished?;
        Ok(collected)
    }

    fn process_frames(
        &mut self,
        metadata: &VideoMetadata,
    ) -> Result<Vec<FrameBlobs>, Box<dyn std::error::Error>> {
        let total = metadata.total_frames;
        let mut collected = Vec::new();

        let mut frames = self.reader.frames();
        while let Some(frame_result) = frames.next() {
            let mut frame = frame_result?;
            if let Some(rect) = self.datetime_mask {
                frame.zero_rect(rect.x, rect.y, rect.w, rect.h);
            }

            self.background.update(&frame);
            self.logger.progress(frame.index() + 1, total);
            if !self.background.is_ready() {
                continue;
            }

            let started = Instant::now();
            let blobs = self.detector.detect(self.background.foreground_mask())?;
            self.logger
                .timing("detect", started.elapsed().as_secs_f64() * 1000.0);

            let record = FrameBlobs {
                frame_index: frame.index(),
                blobs,
            };
            if let Some(writer) = self.record_writer.as_mut() {
                writer.write(&record)?;
            }
            if let Some(writer) = self.annotated_writer.as_mut() {
                let mut annotated = frame.clone();
                annotate_frame(&mut annotated, &record.blobs);
                writer.write(&annotated)?;
            }
            collected.push(record);
        }

        self.logger.info(&format!(
            "detection finished: {} frames with blob data",
            collected.len()
        ));
        Ok(collected)
    }
}
