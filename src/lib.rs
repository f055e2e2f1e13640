#![warn(missing_docs)]
//! Caricature - turn a portrait photo into a colored-pencil caricature.
//!
//! The photo is center-cropped to a square, resized, and sent once to the
//! OpenAI image edits endpoint together with a fixed style prompt. The
//! returned image is decoded and written to disk.
//!
//! # Quick Start
//!
//! ```no_run
//! use caricature::{make_caricature, OpenAiEditProvider, OutputSize};
//!
//! #[tokio::main]
//! async fn main() -> caricature::Result<()> {
//!     let provider = OpenAiEditProvider::builder().api_key("sk-...").build()?;
//!     let path = make_caricature(&provider, "me.jpg", "me-caricature.png", OutputSize::default())
//!         .await?;
//!     println!("saved {}", path.display());
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `cli` (default): the `caricature` command-line binary

mod caricature;
mod error;
pub mod image;

pub use caricature::{make_caricature, DEFAULT_INPUT, DEFAULT_OUTPUT};
pub use error::{CaricatureError, ErrorKind, Result};
pub use crate::image::providers::{
    InputFidelity, OpenAiEditProvider, OpenAiEditProviderBuilder, CARICATURE_PROMPT,
};
pub use crate::image::{GeneratedImage, GenerationMetadata, OutputSize, ProcessedImage};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::caricature::make_caricature;
    pub use crate::error::{CaricatureError, Result};
    pub use crate::image::providers::OpenAiEditProvider;
    pub use crate::image::OutputSize;
}
