//! The end-to-end photo to caricature workflow.

use crate::error::Result;
use crate::image::preprocess::center_square;
use crate::image::providers::OpenAiEditProvider;
use crate::image::OutputSize;
use std::path::{Path, PathBuf};

/// Sample input used when the binary runs without arguments.
pub const DEFAULT_INPUT: &str = "img/yun1.jpg";

/// Output file written when no path is given.
pub const DEFAULT_OUTPUT: &str = "caricature.png";

/// Turns the photo at `input` into a caricature written to `output`.
///
/// The input is center-cropped and resized to `size.width` pixels square,
/// sent to the provider once, and the result is written only after it has
/// been fully decoded. On any error the output path is left untouched.
pub async fn make_caricature(
    provider: &OpenAiEditProvider,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    size: OutputSize,
) -> Result<PathBuf> {
    let (input, output) = (input.as_ref(), output.as_ref());
    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        size = %size,
        "starting caricature generation"
    );

    let processed = center_square(input, size.input_edge())?;
    let image = provider.edit(processed, size).await?;

    image.save(output)?;
    tracing::info!(
        output = %output.display(),
        bytes = image.size(),
        duration_ms = image.metadata.duration_ms,
        "caricature saved"
    );

    Ok(output.to_path_buf())
}
