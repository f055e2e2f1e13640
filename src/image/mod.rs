//! Image preprocessing and generation.

pub mod preprocess;
pub mod providers;
mod types;

pub use preprocess::{center_crop_region, center_square, encode_png, square_image};
pub use types::{CropRegion, GeneratedImage, GenerationMetadata, OutputSize, ProcessedImage};
