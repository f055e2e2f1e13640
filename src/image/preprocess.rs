//! Input preprocessing: center-crop to a square and resize.

use crate::error::{CaricatureError, Result};
use crate::image::types::{CropRegion, ProcessedImage};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageError, ImageFormat, ImageReader, RgbImage};
use std::io::Cursor;
use std::path::Path;

/// Returns the largest square centered inside a `width` x `height` image.
pub fn center_crop_region(width: u32, height: u32) -> CropRegion {
    let size = width.min(height);
    CropRegion {
        left: (width - size) / 2,
        top: (height - size) / 2,
        size,
    }
}

/// Center-crops `image` to a square and resizes it to `edge` x `edge` RGB.
pub fn square_image(image: &DynamicImage, edge: u32) -> Result<RgbImage> {
    if edge == 0 {
        return Err(CaricatureError::InvalidRequest(
            "target edge length must be positive".into(),
        ));
    }

    let rgb = image.to_rgb8();
    let region = center_crop_region(rgb.width(), rgb.height());
    if region.size == 0 {
        return Err(CaricatureError::InvalidRequest(format!(
            "source image has no pixels ({}x{})",
            rgb.width(),
            rgb.height()
        )));
    }
    tracing::debug!(
        left = region.left,
        top = region.top,
        size = region.size,
        "center crop region"
    );

    let cropped =
        imageops::crop_imm(&rgb, region.left, region.top, region.size, region.size).to_image();
    Ok(imageops::resize(&cropped, edge, edge, FilterType::Lanczos3))
}

/// Encodes an RGB image as PNG into memory.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(CaricatureError::Encode)?;
    Ok(buf.into_inner())
}

/// Loads the image at `path`, center-crops it, and resizes it to `edge` x `edge`.
///
/// The format is sniffed from the file contents rather than the extension.
/// Nothing is written to disk; the result is a PNG buffer in memory.
pub fn center_square(path: impl AsRef<Path>, edge: u32) -> Result<ProcessedImage> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), edge, "preprocessing input image");

    let source = load(path)?;
    tracing::info!(
        width = source.width(),
        height = source.height(),
        "decoded source image"
    );

    let square = square_image(&source, edge)?;
    let data = encode_png(&square)?;
    tracing::info!(bytes = data.len(), "encoded {edge}x{edge} PNG buffer");

    Ok(ProcessedImage { data, edge })
}

fn load(path: &Path) -> Result<DynamicImage> {
    let decode_err = |source: ImageError| CaricatureError::Decode {
        path: path.to_path_buf(),
        source,
    };

    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| decode_err(ImageError::IoError(e)))?
        .decode()
        .map_err(decode_err)
}
