pub mod blob_matcher;
pub mod blob_stitcher;
pub mod outlier_filter;
