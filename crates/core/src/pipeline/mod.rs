pub mod build_tracks_use_case;
pub mod detect_blobs_use_case;
pub mod pipeline_logger;
