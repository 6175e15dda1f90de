/// Rolling window length for the median background model.
pub const DEFAULT_BG_WINDOW_SIZE: usize = 11;

/// Intensity difference above which a pixel counts as foreground.
pub const DEFAULT_FG_THRESHOLD: u8 = 10;

pub const DEFAULT_MIN_AREA: f64 = 0.0;
pub const DEFAULT_MAX_AREA: f64 = 100_000.0;

pub const DEFAULT_OPEN_KERNEL_SIZE: (u32, u32) = (3, 3);
pub const DEFAULT_CLOSE_KERNEL_SIZE: (u32, u32) = (3, 3);

/// Earlier-frame blob count above which matching is skipped as too ambiguous.
pub const DEFAULT_MAX_BLOBS: usize = 10;

/// Centroid distance (pixels) beyond which a candidate pair is rejected.
pub const DEFAULT_MAX_DIST: f64 = 300.0;

pub const DEFAULT_OUTPUT_FPS: f64 = 20.0;

pub const DEFAULT_OUTLIER_MULTIPLIER: f64 = 1.0;

/// Minimum displacement deviation (pixels) before a track step can be flagged.
pub const DEFAULT_OUTLIER_FLOOR_PIX: f64 = 50.0;

/// Marker geometry for annotated output frames.
pub const MARKER_RADIUS_MARGIN: u32 = 15;
pub const MARKER_MIN_RADIUS: u32 = 10;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
