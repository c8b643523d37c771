//! Integration tests for the offline parts of the pipeline.
//!
//! Everything here runs without a model server or a pdfium library: input
//! validation, directory listing, response extraction, presentation, and
//! the export round trip, all through the crate's public API.

use invoice2json::{
    extract_json, is_supported_file, list_entries, render_json, save_record, BrowseEntry,
    ExtractionConfig, InvoiceError, InvoiceRecord,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

// ── Test helpers ─────────────────────────────────────────────────────────

fn fixture_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    std::fs::create_dir(root.join("2026")).unwrap();
    std::fs::write(root.join("invoice.pdf"), b"%PDF-1.4\n").unwrap();
    std::fs::write(root.join("scan.jpeg"), b"\xFF\xD8\xFF").unwrap();
    std::fs::write(root.join("report.xlsx"), b"PK").unwrap();
    std::fs::write(root.join("notes.txt"), b"hello").unwrap();
    dir
}

// ── File selection ───────────────────────────────────────────────────────

#[test]
fn selector_lists_only_supported_files() {
    let dir = fixture_dir();
    let entries = list_entries(dir.path()).unwrap();

    let files: Vec<PathBuf> = entries
        .iter()
        .filter_map(|e| match e {
            BrowseEntry::File(p) => Some(p.clone()),
            _ => None,
        })
        .collect();

    assert_eq!(files.len(), 2, "expected pdf + jpeg only, got {files:?}");
    assert!(files.iter().all(|p| is_supported_file(p)));
    assert!(!files.iter().any(|p| p.ends_with("report.xlsx")));
    assert!(!files.iter().any(|p| p.ends_with("notes.txt")));

    // The subdirectory is still navigable.
    assert!(entries
        .iter()
        .any(|e| matches!(e, BrowseEntry::Dir(p) if p.ends_with("2026"))));
}

#[test]
fn non_matching_extensions_are_rejected() {
    for name in ["a.txt", "a.docx", "a.csv", "a.pdf.bak", "a"] {
        assert!(
            !is_supported_file(Path::new(name)),
            "'{name}' should be rejected"
        );
    }
    for name in ["a.pdf", "a.PNG", "a.jpg", "b.JPEG"] {
        assert!(is_supported_file(Path::new(name)), "'{name}' should pass");
    }
}

// ── Response extraction ──────────────────────────────────────────────────

#[test]
fn extraction_isolates_json_from_prose() {
    let raw = r#"Here is the data: {"invoice_number":"INV-1","items":[]} Thank you."#;
    let record = extract_json(raw).unwrap();
    assert_eq!(record, json!({"invoice_number": "INV-1", "items": []}));
}

#[test]
fn extraction_without_braces_reports_and_preserves_raw() {
    let raw = "The image appears to be blank.";
    match extract_json(raw).unwrap_err() {
        InvoiceError::NoJsonFound { raw: kept } => assert_eq!(kept, raw),
        other => panic!("expected NoJsonFound, got {other:?}"),
    }
}

#[test]
fn extraction_handles_realistic_model_reply() {
    let raw = concat!(
        "Sure! I analyzed the invoice. Here's the extracted data:\n\n",
        "```json\n",
        "{\n",
        "  \"invoice_number\": \"2026-0042\",\n",
        "  \"invoice_date\": \"2026-08-01\",\n",
        "  \"vendor\": {\"name\": \"Congzhou Machinery\", \"tax_id\": \"91-320583\"},\n",
        "  \"items\": [\n",
        "    {\"description\": \"Bearing assembly\", \"quantity\": 4, \"unit_price\": 118.0, \"total_price\": 472.0}\n",
        "  ],\n",
        "  \"total_amount\": 472.0,\n",
        "  \"notes\": null\n",
        "}\n",
        "```\n",
        "Let me know if you need anything else!"
    );
    let record = extract_json(raw).unwrap();
    assert_eq!(record["invoice_number"], "2026-0042");
    assert_eq!(record["vendor"]["name"], "Congzhou Machinery");
    assert_eq!(record["items"][0]["quantity"], 4);
}

// ── Round trip ───────────────────────────────────────────────────────────

#[tokio::test]
async fn exported_record_reparses_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.json");

    let record = extract_json(
        r#"prefix {"invoice_number":"INV-7","subtotal":100,"tax":19.0,"items":[{"description":"consulting","quantity":1,"unit_price":100,"total_price":100}],"total_amount":119.0} suffix"#,
    )
    .unwrap();

    save_record(&record, &path).await.unwrap();
    let reparsed: Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(reparsed, record);

    // The typed view survives the same trip.
    let typed = InvoiceRecord::from_value(&reparsed).unwrap();
    assert_eq!(typed.invoice_number.as_deref(), Some("INV-7"));
    assert_eq!(typed.items.len(), 1);
}

// ── Presentation ─────────────────────────────────────────────────────────

#[test]
fn plain_rendering_is_valid_json() {
    let record = json!({
        "invoice_number": "INV-1",
        "vendor": {"name": "Acme"},
        "items": [],
        "total_amount": 10.5
    });
    let rendered = render_json(&record, false);
    let reparsed: Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(reparsed, record);
}

// ── Configuration ────────────────────────────────────────────────────────

#[test]
fn config_builder_validates_endpoint() {
    assert!(ExtractionConfig::builder().url("").build().is_err());
    assert!(ExtractionConfig::builder()
        .url("http://localhost:11434/")
        .model("llava")
        .build()
        .is_ok());
}
