//! Error types for the invoice2json library.
//!
//! Every failure mode of the pipeline is a variant of [`InvoiceError`].
//! The run is linear — select, normalise, call the model, extract, present —
//! so almost every error is fatal for the current invocation. The one
//! exception is [`InvoiceError::OutputWriteFailed`]: the record has already
//! been displayed by the time a save is attempted, so callers report the
//! write failure and keep the successful extraction.
//!
//! Parse failures carry the model's raw reply so a user can see exactly what
//! the model said when no JSON could be recovered from it.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the invoice2json library.
#[derive(Debug, Error)]
pub enum InvoiceError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file extension is not one of pdf/png/jpg/jpeg.
    #[error("Unsupported file type: '{path}'\nSupported formats: PDF, PNG, JPG, JPEG.")]
    UnsupportedFormat { path: PathBuf },

    /// The file has a .pdf extension but does not start with `%PDF`.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// The interactive selector was cancelled before a file was chosen.
    #[error("No invoice file was selected.")]
    SelectionCancelled,

    // ── Normalisation errors ──────────────────────────────────────────────
    /// pdfium failed to open or rasterise the document.
    #[error("PDF conversion failed for '{path}': {detail}")]
    PdfRenderFailed { path: PathBuf, detail: String },

    /// The PDF opened fine but contains no pages to rasterise.
    #[error("PDF '{path}' contains no pages")]
    EmptyDocument { path: PathBuf },

    /// PNG encoding of the rendered page failed.
    #[error("Image encoding failed: {detail}")]
    ImageEncodingFailed { detail: String },

    // ── Model service errors ──────────────────────────────────────────────
    /// Transport-level failure reaching the model endpoint.
    #[error("Request to '{url}' failed: {reason}\nCheck the endpoint is running and reachable.")]
    RequestFailed { url: String, reason: String },

    /// The endpoint answered with a non-success HTTP status.
    #[error("Model API returned HTTP {status}: {body}")]
    ApiStatus { status: u16, body: String },

    /// The call exceeded the configured request timeout.
    #[error("Model API call timed out after {secs}s\nIncrease the request timeout for large images.")]
    ApiTimeout { secs: u64 },

    /// The endpoint answered 200 but the body was not the expected shape.
    #[error("Malformed API response: {detail}")]
    MalformedApiResponse { detail: String },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The model reply contains no balanced `{...}` span.
    ///
    /// The raw reply is preserved so the caller can log or display it.
    #[error("No JSON object found in the model response")]
    NoJsonFound { raw: String },

    /// A candidate JSON span was found but failed to parse.
    #[error("Model response contained invalid JSON: {detail}")]
    JsonParseFailed { raw: String, detail: String },

    // ── Export errors ─────────────────────────────────────────────────────
    /// Could not write the exported JSON file. Non-fatal to the run.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl InvoiceError {
    /// The model's raw reply, if this error preserves one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            InvoiceError::NoJsonFound { raw } | InvoiceError::JsonParseFailed { raw, .. } => {
                Some(raw)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_display() {
        let e = InvoiceError::UnsupportedFormat {
            path: PathBuf::from("notes.txt"),
        };
        let msg = e.to_string();
        assert!(msg.contains("notes.txt"), "got: {msg}");
        assert!(msg.contains("PDF, PNG, JPG, JPEG"));
    }

    #[test]
    fn api_status_display() {
        let e = InvoiceError::ApiStatus {
            status: 503,
            body: "model loading".into(),
        };
        assert!(e.to_string().contains("503"));
        assert!(e.to_string().contains("model loading"));
    }

    #[test]
    fn parse_errors_preserve_raw_text() {
        let e = InvoiceError::NoJsonFound {
            raw: "I could not read the invoice.".into(),
        };
        assert_eq!(e.raw_response(), Some("I could not read the invoice."));

        let e = InvoiceError::JsonParseFailed {
            raw: "{broken".into(),
            detail: "EOF while parsing".into(),
        };
        assert_eq!(e.raw_response(), Some("{broken"));
        assert!(e.to_string().contains("EOF while parsing"));
    }

    #[test]
    fn timeout_display() {
        let e = InvoiceError::ApiTimeout { secs: 120 };
        assert!(e.to_string().contains("120s"));
    }
}
