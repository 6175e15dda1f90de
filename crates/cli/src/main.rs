use std::path::PathBuf;
use std::process;

use clap::Parser;

use blobtrack_core::background::median_background::MedianBackground;
use blobtrack_core::detection::domain::blob_detector::BlobDetector;
use blobtrack_core::detection::infrastructure::contour_blob_detector::{
    BlobDetectorConfig, ContourBlobDetector,
};
use blobtrack_core::pipeline::build_tracks_use_case::BuildTracksUseCase;
use blobtrack_core::pipeline::detect_blobs_use_case::DetectBlobsUseCase;
use blobtrack_core::pipeline::pipeline_logger::{PipelineLogger, StdoutPipelineLogger};
use blobtrack_core::shared::blob::FrameBlobs;
use blobtrack_core::shared::params::{KernelShape, MaskRect, TrackingParams};
use blobtrack_core::storage::blob_records::{read_blob_records, BlobRecordWriter};
use blobtrack_core::storage::track_records::TrackRecordWriter;
use blobtrack_core::tracking::blob_matcher::BlobMatcher;
use blobtrack_core::tracking::blob_stitcher::BlobStitcher;
use blobtrack_core::tracking::outlier_filter::OutlierSegmentFilter;
use blobtrack_core::video::domain::video_reader::VideoReader;
use blobtrack_core::video::domain::video_writer::VideoWriter;
use blobtrack_core::video::infrastructure::image_sequence_reader::ImageSequenceReader;
use blobtrack_core::video::infrastructure::image_sequence_writer::ImageSequenceWriter;

/// Blob detection and trajectory stitching for static-camera frame
/// sequences.
#[derive(Parser)]
#[command(name = "blobtrack")]
struct Cli {
    /// Directory of input frames (image files, processed in name order).
    /// Not required with --from-blobs.
    input: Option<PathBuf>,

    /// Blob record output file, one JSON record per line.
    #[arg(long, default_value = "blob_data.jsonl")]
    blobs: PathBuf,

    /// Track output file, one JSON record per line.
    #[arg(long, default_value = "track_data.jsonl")]
    tracks: PathBuf,

    /// Directory for annotated output frames (omit to disable).
    #[arg(long)]
    annotated: Option<PathBuf>,

    /// JSON configuration file; flags override file values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip detection and build tracks from an existing blob record file.
    #[arg(long)]
    from_blobs: Option<PathBuf>,

    /// Background model window length in frames.
    #[arg(long)]
    bg_window_size: Option<usize>,

    /// Foreground threshold in intensity levels.
    #[arg(long)]
    fg_threshold: Option<u8>,

    /// Minimum blob area in pixels.
    #[arg(long)]
    min_area: Option<f64>,

    /// Maximum blob area in pixels.
    #[arg(long)]
    max_area: Option<f64>,

    /// Morphological open kernel size (square).
    #[arg(long)]
    open_kernel_size: Option<u32>,

    /// Morphological close kernel size (square).
    #[arg(long)]
    close_kernel_size: Option<u32>,

    /// Kernel shape: rect or ellipse.
    #[arg(long)]
    kernel_shape: Option<String>,

    /// Blob fusion threshold as a fraction of the longest blob dimension.
    #[arg(long)]
    min_interblob_spacing: Option<f64>,

    /// Skip matching for frames with more blobs than this.
    #[arg(long)]
    max_blobs: Option<usize>,

    /// Maximum centroid distance for a match, in pixels.
    #[arg(long)]
    max_dist: Option<f64>,

    /// Nominal frame rate recorded in output metadata.
    #[arg(long)]
    output_video_fps: Option<f64>,

    /// Rectangle to blank at ingest: x,y,w,h.
    #[arg(long, value_delimiter = ',')]
    datetime_mask: Option<Vec<u32>>,

    /// Outlier filter spread multiplier.
    #[arg(long)]
    outlier_multiplier: Option<f64>,

    /// Use median/MAD statistics instead of mean/stddev.
    #[arg(long)]
    outlier_mad: bool,

    /// Outlier filter floor in pixels.
    #[arg(long)]
    outlier_floor: Option<f64>,

    /// Disable outlier-segment splitting entirely.
    #[arg(long)]
    no_outlier_filter: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;
    let params = build_params(&cli)?;

    let frame_blobs = match &cli.from_blobs {
        Some(path) => {
            log::info!("reading blob records from {}", path.display());
            read_blob_records(path)?
        }
        None => run_detection(&cli, &params)?,
    };

    run_tracking(&cli, &params, &frame_blobs)
}

fn run_detection(
    cli: &Cli,
    params: &TrackingParams,
) -> Result<Vec<FrameBlobs>, Box<dyn std::error::Error>> {
    let input = cli.input.as_ref().expect("validated");
    let mut reader: Box<dyn VideoReader> =
        Box::new(ImageSequenceReader::with_fps(params.output_video_fps));
    let metadata = reader.open(input)?;
    log::info!(
        "opened {}: {}x{}, {} frames",
        input.display(),
        metadata.width,
        metadata.height,
        metadata.total_frames
    );

    let detector: Box<dyn BlobDetector> = Box::new(ContourBlobDetector::new(
        BlobDetectorConfig::from_params(params),
    ));
    let background = MedianBackground::new(params.bg_window_size, params.fg_threshold);
    let record_writer = Some(BlobRecordWriter::create(&cli.blobs)?);
    let annotated_writer: Option<Box<dyn VideoWriter>> = cli
        .annotated
        .as_ref()
        .map(|_| Box::new(ImageSequenceWriter::new()) as Box<dyn VideoWriter>);
    let logger: Box<dyn PipelineLogger> = Box::new(StdoutPipelineLogger::default());

    let mut use_case = DetectBlobsUseCase::new(
        reader,
        detector,
        background,
        record_writer,
        annotated_writer,
        params.datetime_mask,
        logger,
    );
    let collected = use_case.execute(&metadata, cli.annotated.as_deref())?;
    log::info!("blob records written to {}", cli.blobs.display());
    Ok(collected)
}

fn run_tracking(
    cli: &Cli,
    params: &TrackingParams,
    frame_blobs: &[FrameBlobs],
) -> Result<(), Box<dyn std::error::Error>> {
    let outlier_filter = if cli.no_outlier_filter {
        None
    } else {
        Some(OutlierSegmentFilter::new(
            params.outlier_multiplier,
            params.outlier_use_mad,
            params.outlier_floor_pixels,
        ))
    };

    let mut use_case = BuildTracksUseCase::new(
        BlobMatcher::new(params.max_blobs, params.max_dist),
        BlobStitcher::new(),
        outlier_filter,
        Box::new(StdoutPipelineLogger::default()),
    );
    let outcome = use_case.execute(frame_blobs);

    let mut writer = TrackRecordWriter::create(&cli.tracks)?;
    for track in &outcome.tracks {
        writer.write(track)?;
    }
    writer.finish()?;

    log::info!(
        "{} tracks written to {} ({} split by the outlier filter)",
        outcome.tracks.len(),
        cli.tracks.display(),
        outcome.flagged_originals.len()
    );
    Ok(())
}

fn build_params(cli: &Cli) -> Result<TrackingParams, Box<dyn std::error::Error>> {
    let mut params = match &cli.config {
        Some(path) => TrackingParams::from_json_file(path)?,
        None => TrackingParams::default(),
    };

    if let Some(v) = cli.bg_window_size {
        params.bg_window_size = v;
    }
    if let Some(v) = cli.fg_threshold {
        params.fg_threshold = v;
    }
    if let Some(v) = cli.min_area {
        params.min_area = Some(v);
    }
    if let Some(v) = cli.max_area {
        params.max_area = Some(v);
    }
    if let Some(v) = cli.open_kernel_size {
        params.open_kernel_size = (v, v);
    }
    if let Some(v) = cli.close_kernel_size {
        params.close_kernel_size = (v, v);
    }
    if let Some(shape) = &cli.kernel_shape {
        params.kernel_shape = parse_kernel_shape(shape)?;
    }
    if let Some(v) = cli.min_interblob_spacing {
        params.min_interblob_spacing = Some(v);
    }
    if let Some(v) = cli.max_blobs {
        params.max_blobs = v;
    }
    if let Some(v) = cli.max_dist {
        params.max_dist = v;
    }
    if let Some(v) = cli.output_video_fps {
        params.output_video_fps = v;
    }
    if let Some(rect) = &cli.datetime_mask {
        params.datetime_mask = Some(MaskRect {
            x: rect[0],
            y: rect[1],
            w: rect[2],
            h: rect[3],
        });
    }
    if let Some(v) = cli.outlier_multiplier {
        params.outlier_multiplier = v;
    }
    if cli.outlier_mad {
        params.outlier_use_mad = true;
    }
    if let Some(v) = cli.outlier_floor {
        params.outlier_floor_pixels = v;
    }
    Ok(params)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match (&cli.input, &cli.from_blobs) {
        (None, None) => {
            return Err("an input frame directory or --from-blobs is required".into());
        }
        (Some(_), Some(_)) => {
            return Err("input frame directory and --from-blobs are mutually exclusive".into());
        }
        (Some(input), None) if !input.exists() => {
            return Err(format!("input directory not found: {}", input.display()).into());
        }
        _ => {}
    }
    if let Some(path) = &cli.from_blobs {
        if !path.exists() {
            return Err(format!("blob record file not found: {}", path.display()).into());
        }
    }
    if cli.bg_window_size == Some(0) {
        return Err("bg-window-size must be at least 1".into());
    }
    if let Some(shape) = &cli.kernel_shape {
        parse_kernel_shape(shape)?;
    }
    if let Some(rect) = &cli.datetime_mask {
        if rect.len() != 4 {
            return Err(format!(
                "datetime-mask needs exactly four values x,y,w,h, got {}",
                rect.len()
            )
            .into());
        }
    }
    if let Some(m) = cli.outlier_multiplier {
        if m < 0.0 {
            return Err(format!("outlier-multiplier must be non-negative, got {m}").into());
        }
    }
    Ok(())
}

fn parse_kernel_shape(shape: &str) -> Result<KernelShape, Box<dyn std::error::Error>> {
    match shape {
        "rect" => Ok(KernelShape::Rect),
        "ellipse" => Ok(KernelShape::Ellipse),
        other => Err(format!("kernel shape must be 'rect' or 'ellipse', got '{other}'").into()),
    }
}
