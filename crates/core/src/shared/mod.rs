pub mod blob;
pub mod constants;
pub mod drawing;
pub mod frame;
pub mod mask;
pub mod params;
pub mod track;
pub mod video_metadata;
