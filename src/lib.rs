//! # invoice2json
//!
//! Extract structured JSON from invoice images and PDFs using a hosted
//! vision language model.
//!
//! ## What this crate does (and doesn't)
//!
//! There is no OCR engine and no field-extraction heuristic in here: the
//! image understanding is delegated entirely to a remote vision model behind
//! an Ollama-compatible endpoint. This crate's own job is the plumbing
//! around that call — validating the input file, rasterising PDFs, encoding
//! the image, issuing the request, and recovering a JSON object from the
//! model's free-form text reply.
//!
//! ## Pipeline Overview
//!
//! ```text
//! invoice file
//!  │
//!  ├─ 1. Input     validate path, extension, PDF magic bytes
//!  ├─ 2. Render    rasterise page 1 via pdfium (PDF only, spawn_blocking)
//!  ├─ 3. Encode    image → base64 for the request body
//!  ├─ 4. Model     one POST to {url}/api/generate, no retries
//!  ├─ 5. Extract   recover the first balanced JSON object from the reply
//!  └─ 6. Output    record + raw reply + timings
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use invoice2json::{extract, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder()
//!         .url("http://localhost:11434")
//!         .model("granite3.2-vision:latest")
//!         .build()?;
//!     let output = extract("invoice.pdf", &config).await?;
//!     println!("{}", serde_json::to_string_pretty(&output.record)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `invoice2json` binary (clap + console + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! invoice2json = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod present;
pub mod prompts;
pub mod schema;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, DEFAULT_MODEL, DEFAULT_OLLAMA_URL};
pub use error::InvoiceError;
pub use extract::{extract, extract_sync, extract_to_file};
pub use output::{save_record, ExtractionOutput, ExtractionStats};
pub use pipeline::browse::{list_entries, BrowseEntry};
pub use pipeline::client::{check_server, list_models, TagsResponse};
pub use pipeline::input::{is_supported_file, DocumentKind};
pub use pipeline::response::extract_json;
pub use present::render_json;
pub use schema::{InvoiceRecord, LineItem, Party, INVOICE_SCHEMA};
