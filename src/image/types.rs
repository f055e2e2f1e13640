//! Core types for caricature generation.

use crate::error::{CaricatureError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

/// Requested output resolution, rendered as `"WxH"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OutputSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl OutputSize {
    /// 1024x1024, the default output size.
    pub const SQUARE_1024: Self = Self {
        width: 1024,
        height: 1024,
    };

    /// Creates a size, rejecting zero dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CaricatureError::InvalidRequest(format!(
                "output size must be positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Edge length used for the square input sent alongside this size.
    pub fn input_edge(&self) -> u32 {
        self.width
    }
}

impl Default for OutputSize {
    fn default() -> Self {
        Self::SQUARE_1024
    }
}

impl fmt::Display for OutputSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for OutputSize {
    type Err = CaricatureError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CaricatureError::InvalidRequest(format!("invalid size {s:?}, expected WxH"));
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let width = w.trim().parse().map_err(|_| invalid())?;
        let height = h.trim().parse().map_err(|_| invalid())?;
        Self::new(width, height)
    }
}

impl TryFrom<String> for OutputSize {
    type Error = CaricatureError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<OutputSize> for String {
    fn from(size: OutputSize) -> Self {
        size.to_string()
    }
}

/// The square region cut out of a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    /// Left offset in pixels.
    pub left: u32,
    /// Top offset in pixels.
    pub top: u32,
    /// Side length of the square.
    pub size: u32,
}

/// A preprocessed, PNG-encoded square image ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImage {
    /// PNG bytes.
    pub data: Vec<u8>,
    /// Edge length in pixels.
    pub edge: u32,
}

impl ProcessedImage {
    /// MIME type of the encoded buffer.
    pub const MIME_TYPE: &'static str = "image/png";

    /// Returns the size of the encoded buffer in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Metadata about the generation process.
#[derive(Debug, Clone, Default)]
pub struct GenerationMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Generation duration in milliseconds.
    pub duration_ms: Option<u64>,
}

/// A generated image with its data and metadata.
#[derive(Debug, Clone)]
#[must_use = "generated image should be saved or processed"]
pub struct GeneratedImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
}

impl GeneratedImage {
    /// Creates a new generated image.
    pub fn new(data: Vec<u8>, metadata: GenerationMetadata) -> Self {
        Self { data, metadata }
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Saves the image to the specified path, replacing any existing file.
    ///
    /// The bytes go to a temporary file in the same directory first, which is
    /// then renamed over `path`, so readers never observe a partial image.
    /// An existing file keeps its permissions; a new one gets the same mode a
    /// plain create would.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let existing = std::fs::metadata(path).ok().map(|m| m.permissions());

        let mut tmp = new_temp_file(dir)?;
        tmp.write_all(&self.data)?;
        if let Some(permissions) = existing {
            tmp.as_file().set_permissions(permissions)?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| CaricatureError::Io(e.error))?;
        Ok(())
    }
}

/// Temp files default to 0600; ask for 0666 so the umask decides, as with `File::create`.
#[cfg(unix)]
fn new_temp_file(dir: &Path) -> std::io::Result<tempfile::NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;
    tempfile::Builder::new()
        .permissions(std::fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn new_temp_file(dir: &Path) -> std::io::Result<tempfile::NamedTempFile> {
    tempfile::NamedTempFile::new_in(dir)
}
