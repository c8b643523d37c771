//! Extraction output types and JSON export.
//!
//! [`ExtractionOutput`] bundles the recovered record with the raw model
//! reply and per-stage timings. The raw reply is kept deliberately: when a
//! field looks wrong, the first question is always "what did the model
//! actually say", and re-running a vision call to find out is slow and
//! non-deterministic.

use crate::error::InvoiceError;
use crate::schema::InvoiceRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// The result of one extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// The invoice file the record was extracted from.
    pub source: PathBuf,

    /// The extracted invoice record, exactly as parsed. Loosely typed.
    pub record: Value,

    /// The model's full raw text reply, for diagnostics.
    pub raw_response: String,

    /// Model identifier used for the run.
    pub model: String,

    /// Per-stage timings.
    pub stats: ExtractionStats,
}

impl ExtractionOutput {
    /// Best-effort typed view of the record. `None` for non-object records.
    pub fn to_record(&self) -> Option<InvoiceRecord> {
        InvoiceRecord::from_value(&self.record)
    }
}

/// Wall-clock timings for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Time spent rasterising the PDF, 0 for image inputs.
    pub render_duration_ms: u64,
    /// Time spent in the model API call.
    pub api_duration_ms: u64,
    /// End-to-end duration including encoding and parsing.
    pub total_duration_ms: u64,
    /// Length of the model's raw reply in characters.
    pub response_chars: usize,
}

/// Write a record to disk as indented JSON.
///
/// Atomic write (temp file + rename) so a crash mid-write never leaves a
/// truncated file at the target path. A failure here is non-fatal to the
/// run: the caller already has (and has displayed) the record.
pub async fn save_record(record: &Value, path: impl AsRef<Path>) -> Result<(), InvoiceError> {
    let path = path.as_ref();

    let json = serde_json::to_string_pretty(record)
        .map_err(|e| InvoiceError::Internal(format!("JSON serialisation failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                InvoiceError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;
        }
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| InvoiceError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| InvoiceError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn save_and_reparse_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.json");

        let record = json!({
            "invoice_number": "INV-42",
            "vendor": {"name": "Acme Corp", "tax_id": "DE123"},
            "items": [
                {"description": "Widget", "quantity": 2, "unit_price": 9.99, "total_price": 19.98}
            ],
            "total_amount": 19.98,
            "notes": null
        });

        save_record(&record, &path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let reparsed: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(reparsed, record);

        // Indented output, and no leftover temp file.
        assert!(written.contains("\n  "));
        assert!(!dir.path().join("invoice.json.tmp").exists());
    }

    #[tokio::test]
    async fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exports/2026/invoice.json");

        save_record(&json!({"invoice_number": "INV-1"}), &path)
            .await
            .unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn save_to_unwritable_path_is_reported() {
        let err = save_record(&json!({}), "/proc/invoice2json-test/out.json")
            .await
            .unwrap_err();
        assert!(matches!(err, InvoiceError::OutputWriteFailed { .. }));
    }

    #[test]
    fn typed_view_of_output() {
        let output = ExtractionOutput {
            source: PathBuf::from("a.png"),
            record: json!({"invoice_number": "INV-7"}),
            raw_response: "{}".into(),
            model: "granite3.2-vision:latest".into(),
            stats: ExtractionStats::default(),
        };
        let rec = output.to_record().unwrap();
        assert_eq!(rec.invoice_number.as_deref(), Some("INV-7"));
    }
}
