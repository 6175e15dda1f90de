pub mod blob_detector;
pub mod blob_fusion;
