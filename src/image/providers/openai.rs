//! OpenAI image edits provider (gpt-image-1).

use crate::error::{truncate, CaricatureError, Result};
use crate::image::types::{GeneratedImage, GenerationMetadata, OutputSize, ProcessedImage};
use base64::Engine;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Default API root; the edits endpoint lives at `{base}/images/edits`.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-image-1";

/// Default request timeout. Edits routinely take over a minute.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the API root.
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Style prompt sent with every request.
pub const CARICATURE_PROMPT: &str = "A simplified colored-pencil caricature of the person in the photo. \
     Clean contour lines, soft cross-hatching, warm umber/sienna with a bit of blue, \
     textured off-white paper background. Exaggerate smile lines gently, keep likeness.";

/// Multipart field carrying the input image. Repeatable; we send one.
const IMAGE_FIELD: &str = "image[]";
const IMAGE_FILE_NAME: &str = "input.png";

/// How closely the model should stick to the input's features.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputFidelity {
    /// Preserve faces and fine details of the input.
    #[default]
    High,
    /// Let the model reinterpret the input more freely.
    Low,
}

impl InputFidelity {
    /// Returns the API parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for InputFidelity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputFidelity {
    type Err = CaricatureError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            other => Err(CaricatureError::InvalidRequest(format!(
                "unknown input fidelity {other:?}, expected \"high\" or \"low\""
            ))),
        }
    }
}

/// Builder for OpenAiEditProvider.
#[derive(Debug, Clone)]
pub struct OpenAiEditProviderBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    model: String,
    input_fidelity: InputFidelity,
    timeout: Duration,
}

impl Default for OpenAiEditProviderBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            input_fidelity: InputFidelity::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl OpenAiEditProviderBuilder {
    /// Creates a new builder with default settings and no credential.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder seeded from `OPENAI_API_KEY` and `OPENAI_BASE_URL`.
    ///
    /// Call this once at startup; the provider never looks at the
    /// environment afterwards.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var(API_KEY_ENV).ok(),
            base_url: std::env::var(BASE_URL_ENV).ok(),
            ..Self::default()
        }
    }

    /// Sets the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the API root, e.g. `https://api.openai.com/v1`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the input fidelity hint.
    pub fn input_fidelity(mut self, fidelity: InputFidelity) -> Self {
        self.input_fidelity = fidelity;
        self
    }

    /// Sets the overall request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the provider. Fails if no non-blank API key was supplied.
    pub fn build(self) -> Result<OpenAiEditProvider> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                CaricatureError::Configuration(format!(
                    "{API_KEY_ENV} not set and no API key provided"
                ))
            })?;

        if self.model.trim().is_empty() {
            return Err(CaricatureError::Configuration(
                "model identifier must not be empty".into(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(CaricatureError::Configuration(
                "timeout must be greater than zero".into(),
            ));
        }

        let base_url = self
            .base_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let endpoint = format!("{}/images/edits", base_url.trim().trim_end_matches('/'));

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| CaricatureError::Configuration(format!("HTTP client: {e}")))?;

        Ok(OpenAiEditProvider {
            client,
            api_key,
            endpoint,
            model: self.model,
            input_fidelity: self.input_fidelity,
            timeout: self.timeout,
        })
    }
}

/// OpenAI image edits provider.
///
/// Each call to [`edit`](Self::edit) performs exactly one HTTP request.
pub struct OpenAiEditProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    input_fidelity: InputFidelity,
    timeout: Duration,
}

impl fmt::Debug for OpenAiEditProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiEditProvider")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("input_fidelity", &self.input_fidelity)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OpenAiEditProvider {
    /// Creates a new `OpenAiEditProviderBuilder`.
    pub fn builder() -> OpenAiEditProviderBuilder {
        OpenAiEditProviderBuilder::new()
    }

    /// Full URL of the edits endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Model identifier sent with each request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Fidelity hint sent with each request.
    pub fn input_fidelity(&self) -> InputFidelity {
        self.input_fidelity
    }

    /// Sends `image` to the edits endpoint with the caricature prompt.
    ///
    /// The image is consumed: it is moved into the request body.
    pub async fn edit(&self, image: ProcessedImage, size: OutputSize) -> Result<GeneratedImage> {
        let start = Instant::now();
        let request = EditRequest {
            model: &self.model,
            prompt: CARICATURE_PROMPT,
            size,
            input_fidelity: self.input_fidelity,
            image,
        };

        tracing::info!(
            endpoint = %self.endpoint,
            model = %self.model,
            size = %size,
            input_fidelity = %self.input_fidelity,
            image_bytes = request.image.len(),
            "sending image edit request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(request.into_form()?)
            .send()
            .await?;

        let status = response.status();
        tracing::info!(status = status.as_u16(), "received API response");

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                body = %truncate(&text),
                "API request failed"
            );
            return Err(CaricatureError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let text = response.text().await?;
        let data = decode_response(&text)?;
        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(bytes = data.len(), duration_ms, "decoded generated image");

        Ok(GeneratedImage::new(
            data,
            GenerationMetadata {
                model: Some(self.model.clone()),
                duration_ms: Some(duration_ms),
            },
        ))
    }
}

/// The fields of one edits call.
#[derive(Debug)]
struct EditRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: OutputSize,
    input_fidelity: InputFidelity,
    image: ProcessedImage,
}

impl EditRequest<'_> {
    fn text_fields(&self) -> [(&'static str, String); 4] {
        [
            ("model", self.model.to_string()),
            ("prompt", self.prompt.to_string()),
            ("size", self.size.to_string()),
            ("input_fidelity", self.input_fidelity.as_str().to_string()),
        ]
    }

    fn into_form(self) -> Result<reqwest::multipart::Form> {
        let fields = self.text_fields();
        let image_part = reqwest::multipart::Part::bytes(self.image.data)
            .file_name(IMAGE_FILE_NAME)
            .mime_str(ProcessedImage::MIME_TYPE)
            .map_err(|e| CaricatureError::InvalidRequest(e.to_string()))?;

        let form = fields
            .into_iter()
            .fold(reqwest::multipart::Form::new(), |form, (name, value)| {
                form.text(name, value)
            })
            .part(IMAGE_FIELD, image_part);
        Ok(form)
    }
}

#[derive(Debug, Deserialize)]
struct EditResponse {
    #[serde(default)]
    data: Option<Vec<EditImageData>>,
}

#[derive(Debug, Deserialize)]
struct EditImageData {
    #[serde(default)]
    b64_json: Option<String>,
}

/// Extracts and decodes the first image from an edits response body.
fn decode_response(text: &str) -> Result<Vec<u8>> {
    let invalid = |reason: String| {
        tracing::error!(payload = %truncate(text), "unexpected API response format: {reason}");
        CaricatureError::response_format(reason, text)
    };

    let response: EditResponse =
        serde_json::from_str(text).map_err(|e| invalid(format!("invalid JSON: {e}")))?;

    let first = response
        .data
        .ok_or_else(|| invalid("missing \"data\" field".into()))?
        .into_iter()
        .next()
        .ok_or_else(|| invalid("no images in response".into()))?;

    let b64 = first
        .b64_json
        .ok_or_else(|| invalid("first result has no \"b64_json\" payload".into()))?;
    tracing::debug!(chars = b64.len(), "received base64 image data");

    let data = base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|e| invalid(format!("invalid base64 image data: {e}")))?;
    if data.is_empty() {
        return Err(invalid("decoded image is empty".into()));
    }
    Ok(data)
}
