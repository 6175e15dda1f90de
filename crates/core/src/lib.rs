//! Blob detection and trajectory stitching for static-camera video.
//!
//! The pipeline separates three concerns: per-frame foreground/background
//! separation (`background`), per-frame blob extraction (`detection`), and
//! cross-frame association of blobs into tracks (`tracking`). Frame I/O
//! lives behind the `video` traits and persisted records behind `storage`;
//! `pipeline` wires the stages into streaming and batch use cases.

pub mod background;
pub mod detection;
pub mod pipeline;
pub mod shared;
pub mod storage;
pub mod tracking;
pub mod video;
