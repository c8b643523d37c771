//! Configuration for an invoice extraction run.
//!
//! Everything a run needs is held in one [`ExtractionConfig`], built via its
//! [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to log the effective configuration and to diff two runs.
//!
//! The two values you are most likely to change — the endpoint URL and the
//! model name — have crate-level defaults in [`DEFAULT_OLLAMA_URL`] and
//! [`DEFAULT_MODEL`]. The CLI layers flags and environment variables on top.

use crate::error::InvoiceError;
use serde::{Deserialize, Serialize};

/// Default Ollama-compatible endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default vision model identifier.
pub const DEFAULT_MODEL: &str = "granite3.2-vision:latest";

/// Configuration for a single extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use invoice2json::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .url("http://ollama.internal:11434")
///     .model("llama3.2-vision")
///     .request_timeout_secs(180)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Base URL of the Ollama-compatible endpoint. Default: [`DEFAULT_OLLAMA_URL`].
    ///
    /// A trailing slash is tolerated; the client trims it before appending
    /// `/api/generate`.
    pub url: String,

    /// Vision model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 2000.
    ///
    /// Invoices are single pages, but page sizes vary; capping the longest
    /// edge keeps pdfium's allocation bounded and the base64 payload under
    /// typical request-size limits while staying sharp enough for the model
    /// to read line items.
    pub max_rendered_pixels: u32,

    /// Sampling temperature for the model. Default: 0.0.
    ///
    /// Field extraction is transcription, not creative writing; zero keeps
    /// the model faithful to what is printed on the invoice.
    pub temperature: f32,

    /// Request timeout for the `/api/generate` call, in seconds. Default: 120.
    ///
    /// Vision models are slow on first load. There is exactly one call per
    /// run and no retry, so the timeout is generous.
    pub request_timeout_secs: u64,

    /// Timeout for the `/api/version` connectivity probe, in seconds. Default: 5.
    pub probe_timeout_secs: u64,

    /// Custom instruction prompt. If None, uses the built-in default
    /// from [`crate::prompts`].
    pub prompt: Option<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_rendered_pixels: 2000,
            temperature: 0.0,
            request_timeout_secs: 120,
            probe_timeout_secs: 5,
            prompt: None,
        }
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The endpoint base URL without any trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Clamped to 100..=10_000; pdfium render dimensions are `i32` and
    /// anything past 10k px is waste for a single invoice page.
    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.clamp(100, 10_000);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn probe_timeout_secs(mut self, secs: u64) -> Self {
        self.config.probe_timeout_secs = secs;
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = Some(prompt.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, InvoiceError> {
        let c = &self.config;
        if c.url.trim().is_empty() {
            return Err(InvoiceError::InvalidConfig(
                "Endpoint URL must not be empty".into(),
            ));
        }
        if !c.url.starts_with("http://") && !c.url.starts_with("https://") {
            return Err(InvoiceError::InvalidConfig(format!(
                "Endpoint URL must be http(s), got '{}'",
                c.url
            )));
        }
        if c.model.trim().is_empty() {
            return Err(InvoiceError::InvalidConfig(
                "Model name must not be empty".into(),
            ));
        }
        if c.request_timeout_secs == 0 {
            return Err(InvoiceError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let c = ExtractionConfig::builder().build().unwrap();
        assert_eq!(c.url, DEFAULT_OLLAMA_URL);
        assert_eq!(c.model, DEFAULT_MODEL);
        assert_eq!(c.request_timeout_secs, 120);
    }

    #[test]
    fn base_url_trims_trailing_slash() {
        let c = ExtractionConfig::builder()
            .url("http://ollama.local:11434/")
            .build()
            .unwrap();
        assert_eq!(c.base_url(), "http://ollama.local:11434");
    }

    #[test]
    fn rejects_non_http_url() {
        let err = ExtractionConfig::builder()
            .url("ftp://nope")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("http(s)"));
    }

    #[test]
    fn rejects_empty_model() {
        let err = ExtractionConfig::builder().model("  ").build().unwrap_err();
        assert!(err.to_string().contains("Model name"));
    }

    #[test]
    fn temperature_is_clamped() {
        let c = ExtractionConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn max_pixels_is_clamped_both_ways() {
        let c = ExtractionConfig::builder()
            .max_rendered_pixels(10)
            .build()
            .unwrap();
        assert_eq!(c.max_rendered_pixels, 100);

        let c = ExtractionConfig::builder()
            .max_rendered_pixels(u32::MAX)
            .build()
            .unwrap();
        assert_eq!(c.max_rendered_pixels, 10_000);
    }
}
