//! Image generation providers.

mod openai;

pub use openai::{
    InputFidelity, OpenAiEditProvider, OpenAiEditProviderBuilder, API_KEY_ENV, BASE_URL_ENV,
    CARICATURE_PROMPT, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT,
};
