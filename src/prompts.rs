//! Instruction prompts for invoice field extraction.
//!
//! Centralising the prompt here serves two purposes:
//!
//! 1. **Single source of truth** — tightening the instructions or changing
//!    the requested fields means editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the assembled prompt without
//!    calling a real model.
//!
//! Callers can override the assembled prompt via
//! [`crate::config::ExtractionConfig::prompt`]; the builder here is used
//! only when no override is provided.

use crate::schema::INVOICE_SCHEMA;

/// Fixed instruction text preceding the schema.
pub const EXTRACTION_INSTRUCTIONS: &str = "\
Analyze this invoice image and extract data according to this schema:";

/// Fixed instruction text following the schema.
///
/// Models love to narrate. Telling them twice not to reduces — but does not
/// eliminate — the prose the response extractor has to cope with.
pub const OUTPUT_RULES: &str = "\
Return ONLY valid JSON without explanations.
Use null for fields that are not present on the invoice.
Do not invent values.";

/// Assemble the full extraction prompt: instructions, schema, output rules.
pub fn extraction_prompt() -> String {
    let schema = serde_json::to_string_pretty(&*INVOICE_SCHEMA)
        .unwrap_or_else(|_| INVOICE_SCHEMA.to_string());
    format!("{EXTRACTION_INSTRUCTIONS}\n{schema}\n\n{OUTPUT_RULES}")
}
