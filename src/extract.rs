//! Top-level extraction entry points.
//!
//! The pipeline is strictly linear: validate → normalise → encode → one
//! model call → extract JSON. There is no branching, no retry, and no state
//! between runs; each function here is a straight composition of the
//! [`crate::pipeline`] stages with timing around the expensive ones.

use crate::config::ExtractionConfig;
use crate::error::InvoiceError;
use crate::output::{ExtractionOutput, ExtractionStats};
use crate::pipeline::input::DocumentKind;
use crate::pipeline::{client, encode, input, render, response};
use crate::prompts;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Extract an invoice record from an image or PDF file.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `path` — Local path to a PDF, PNG, JPG, or JPEG file
/// * `config` — Endpoint, model, and rendering configuration
///
/// # Errors
/// Any stage failure is fatal for the run: invalid input, PDF rendering
/// failure, transport/API error, or an unparseable model reply. Parse
/// errors carry the raw reply (see [`InvoiceError::raw_response`]).
pub async fn extract(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, InvoiceError> {
    let total_start = Instant::now();
    let path = path.as_ref();
    info!("Starting extraction: {}", path.display());

    // ── Step 1: Validate input ───────────────────────────────────────────
    let resolved = input::resolve_input(path)?;

    // ── Step 2: Normalise to image bytes ─────────────────────────────────
    let render_start = Instant::now();
    let image_b64 = match resolved.kind {
        DocumentKind::Pdf => {
            let page = render::render_first_page(&resolved.path, config).await?;
            encode::encode_rendered_page(&page)?
        }
        DocumentKind::Png | DocumentKind::Jpeg => encode::encode_image_file(&resolved.path)?,
    };
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    debug!(
        "Normalised {:?} input in {}ms",
        resolved.kind, render_duration_ms
    );

    // ── Step 3: Call the model ───────────────────────────────────────────
    let prompt = config
        .prompt
        .clone()
        .unwrap_or_else(prompts::extraction_prompt);
    let request = client::build_request(config, prompt, image_b64);

    let api_start = Instant::now();
    let raw_response = client::request_extraction(config, &request).await?;
    let api_duration_ms = api_start.elapsed().as_millis() as u64;

    // ── Step 4: Recover the JSON record ──────────────────────────────────
    let record = response::extract_json(&raw_response)?;

    let stats = ExtractionStats {
        render_duration_ms,
        api_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        response_chars: raw_response.chars().count(),
    };

    info!(
        "Extraction complete: {} fields, {}ms total",
        record.as_object().map(|o| o.len()).unwrap_or(0),
        stats.total_duration_ms
    );

    Ok(ExtractionOutput {
        source: resolved.path,
        record,
        raw_response,
        model: config.model.clone(),
        stats,
    })
}

/// Extract and write the record directly to a JSON file.
///
/// Unlike the interactive save in the CLI, a write failure here is returned
/// as an error — the caller asked for a file, not a display.
pub async fn extract_to_file(
    path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, InvoiceError> {
    let output = extract(path, config).await?;
    crate::output::save_record(&output.record, output_path).await?;
    Ok(output)
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally; the process blocks for the
/// duration of the run, matching the pipeline's one-call-at-a-time model.
pub fn extract_sync(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, InvoiceError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| InvoiceError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(path, config))
}
