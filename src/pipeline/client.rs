//! Model interaction: the single HTTP call to the Ollama generate endpoint.
//!
//! This module is intentionally thin — all prompt text lives in
//! [`crate::prompts`] so it can be changed without touching transport or
//! error mapping here. There is exactly one POST per run and no retry: a
//! transport failure, timeout, or non-success status is fatal for the
//! invocation, per the pipeline's error model.

use crate::config::ExtractionConfig;
use crate::error::InvoiceError;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Request body for `POST /api/generate`.
///
/// `stream: false` asks Ollama for one complete JSON body instead of
/// newline-delimited chunks; the pipeline has no use for partial replies.
#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub images: Vec<String>,
    pub stream: bool,
    pub options: GenerateOptions,
}

/// Model sampling options forwarded verbatim to Ollama.
#[derive(Debug, Serialize)]
pub struct GenerateOptions {
    pub temperature: f32,
}

/// The fields of the generate response the pipeline cares about.
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    /// The model's full text reply.
    pub response: String,
    /// Model identifier echoed back by the server.
    #[serde(default)]
    pub model: String,
}

/// Response body for `GET /api/version`.
#[derive(Debug, Deserialize)]
pub struct VersionResponse {
    pub version: String,
}

/// Response body for `GET /api/tags`: the models the server has pulled.
#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

/// One pulled model in the tags listing. The server reports more fields
/// (size, digest, modification time); only the name matters here.
#[derive(Debug, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

impl TagsResponse {
    /// Names of all pulled models.
    pub fn model_names(&self) -> Vec<String> {
        self.models.iter().map(|m| m.name.clone()).collect()
    }

    /// True when `model` is among the pulled models.
    pub fn has_model(&self, model: &str) -> bool {
        self.models.iter().any(|m| m.name == model)
    }
}

/// Build the generate request for one encoded invoice image.
pub fn build_request(config: &ExtractionConfig, prompt: String, image_b64: String) -> GenerateRequest {
    GenerateRequest {
        model: config.model.clone(),
        prompt,
        images: vec![image_b64],
        stream: false,
        options: GenerateOptions {
            temperature: config.temperature,
        },
    }
}

/// Send the extraction request and return the model's raw text reply.
pub async fn request_extraction(
    config: &ExtractionConfig,
    request: &GenerateRequest,
) -> Result<String, InvoiceError> {
    let url = format!("{}/api/generate", config.base_url());
    let timeout = config.request_timeout_secs;
    info!("Sending request to {} (model: {})", url, request.model);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout))
        .build()
        .map_err(|e| InvoiceError::Internal(format!("HTTP client build failed: {}", e)))?;

    let start = Instant::now();
    let response = client.post(&url).json(request).send().await.map_err(|e| {
        if e.is_timeout() {
            InvoiceError::ApiTimeout { secs: timeout }
        } else {
            InvoiceError::RequestFailed {
                url: url.clone(),
                reason: e.to_string(),
            }
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(InvoiceError::ApiStatus {
            status: status.as_u16(),
            body,
        });
    }

    let parsed: GenerateResponse =
        response
            .json()
            .await
            .map_err(|e| InvoiceError::MalformedApiResponse {
                detail: e.to_string(),
            })?;

    debug!(
        "Model replied with {} chars in {:?}",
        parsed.response.len(),
        start.elapsed()
    );

    Ok(parsed.response)
}

/// Probe the endpoint's `/api/version` to confirm it is reachable.
///
/// Used by the CLI banner before the user spends time picking a file. Uses
/// a short timeout so an unreachable server fails fast.
pub async fn check_server(config: &ExtractionConfig) -> Result<String, InvoiceError> {
    let url = format!("{}/api/version", config.base_url());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.probe_timeout_secs))
        .build()
        .map_err(|e| InvoiceError::Internal(format!("HTTP client build failed: {}", e)))?;

    let response = client.get(&url).send().await.map_err(|e| {
        if e.is_timeout() {
            InvoiceError::ApiTimeout {
                secs: config.probe_timeout_secs,
            }
        } else {
            InvoiceError::RequestFailed {
                url: url.clone(),
                reason: e.to_string(),
            }
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(InvoiceError::ApiStatus {
            status: status.as_u16(),
            body,
        });
    }

    let version: VersionResponse =
        response
            .json()
            .await
            .map_err(|e| InvoiceError::MalformedApiResponse {
                detail: e.to_string(),
            })?;

    Ok(version.version)
}

/// Fetch the server's pulled-model listing from `/api/tags`.
///
/// Lets the CLI warn about a missing model up front, before the user spends
/// time picking a file only to get a generate-time error.
pub async fn list_models(config: &ExtractionConfig) -> Result<TagsResponse, InvoiceError> {
    let url = format!("{}/api/tags", config.base_url());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.probe_timeout_secs))
        .build()
        .map_err(|e| InvoiceError::Internal(format!("HTTP client build failed: {}", e)))?;

    let response = client.get(&url).send().await.map_err(|e| {
        if e.is_timeout() {
            InvoiceError::ApiTimeout {
                secs: config.probe_timeout_secs,
            }
        } else {
            InvoiceError::RequestFailed {
                url: url.clone(),
                reason: e.to_string(),
            }
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(InvoiceError::ApiStatus {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| InvoiceError::MalformedApiResponse {
            detail: e.to_string(),
        })
}
