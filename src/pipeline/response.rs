//! Response extraction: recover a JSON object from free-form model output.
//!
//! Even when the prompt demands "ONLY valid JSON", vision models routinely
//! wrap their answer in prose ("Here is the data: … Thank you.") or in
//! ```` ```json ```` fences. Extraction therefore runs three attempts, from
//! cheapest to most tolerant:
//!
//! 1. **Direct parse** — the whole (trimmed) reply is valid JSON.
//! 2. **Fence strip** — unwrap a single outer code fence, then direct parse.
//! 3. **Brace scan** — find the first `{` and its matching `}` by depth
//!    counting, and parse that slice.
//!
//! The scanner tracks string and escape state, so a `{` inside a JSON string
//! value (`"notes": "pay {ref} on receipt"`) cannot unbalance the count.
//! Braces in surrounding prose before the first `{` are impossible by
//! construction (the scan starts at the first `{`); unbalanced input runs
//! off the end and is reported, never sliced blindly.
//!
//! Failures preserve the raw reply inside the error for diagnostics.

use crate::error::InvoiceError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json)?\s*\n?(.*?)\n?```\s*$").unwrap());

/// Extract the invoice record from the model's raw text reply.
///
/// Returns the first JSON *object* recoverable from the text. Arrays and
/// scalars are not accepted: the record is an object by definition, and a
/// stray `[0]` in prose must not masquerade as a result.
pub fn extract_json(raw: &str) -> Result<Value, InvoiceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InvoiceError::NoJsonFound {
            raw: raw.to_string(),
        });
    }

    // Attempt 1: the whole reply is clean JSON.
    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        if v.is_object() {
            debug!("Model returned clean JSON");
            return Ok(v);
        }
    }

    // Attempt 2: unwrap a single outer code fence.
    if let Some(caps) = RE_OUTER_FENCE.captures(trimmed) {
        let inner = caps[1].trim();
        if let Ok(v) = serde_json::from_str::<Value>(inner) {
            if v.is_object() {
                debug!("Model returned fenced JSON");
                return Ok(v);
            }
        }
    }

    // Attempt 3: brace-depth scan for the first balanced object.
    let span = find_balanced_object(trimmed).ok_or_else(|| InvoiceError::NoJsonFound {
        raw: raw.to_string(),
    })?;

    match serde_json::from_str::<Value>(span) {
        Ok(v) if v.is_object() => {
            debug!("Recovered JSON object from {} chars of prose", trimmed.len());
            Ok(v)
        }
        Ok(_) => Err(InvoiceError::NoJsonFound {
            raw: raw.to_string(),
        }),
        Err(e) => Err(InvoiceError::JsonParseFailed {
            raw: raw.to_string(),
            detail: e.to_string(),
        }),
    }
}

/// Slice the first balanced `{...}` span out of `text`.
///
/// Depth counting ignores braces inside string literals and honours `\"`
/// escapes. Returns `None` when no `{` exists or the braces never balance.
fn find_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clean_json_passes_through() {
        let v = extract_json(r#"{"invoice_number": "INV-9", "total_amount": 42.5}"#).unwrap();
        assert_eq!(v["invoice_number"], "INV-9");
    }

    #[test]
    fn json_amid_prose_is_isolated() {
        let raw = r#"Here is the data: {"invoice_number":"INV-1","items":[]} Thank you."#;
        let v = extract_json(raw).unwrap();
        assert_eq!(v, json!({"invoice_number": "INV-1", "items": []}));
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let raw = "```json\n{\"invoice_number\": \"INV-3\"}\n```";
        let v = extract_json(raw).unwrap();
        assert_eq!(v["invoice_number"], "INV-3");

        let raw = "```\n{\"invoice_number\": \"INV-4\"}\n```";
        assert_eq!(extract_json(raw).unwrap()["invoice_number"], "INV-4");
    }

    #[test]
    fn no_braces_fails_cleanly() {
        let err = extract_json("Sorry, I cannot read this invoice.").unwrap_err();
        match err {
            InvoiceError::NoJsonFound { raw } => assert!(raw.contains("Sorry")),
            other => panic!("expected NoJsonFound, got {other:?}"),
        }
    }

    #[test]
    fn unbalanced_braces_fail_cleanly() {
        let err = extract_json(r#"Partial output: {"invoice_number": "INV-1""#).unwrap_err();
        assert!(matches!(err, InvoiceError::NoJsonFound { .. }));
    }

    #[test]
    fn empty_reply_fails_cleanly() {
        assert!(matches!(
            extract_json("   \n "),
            Err(InvoiceError::NoJsonFound { .. })
        ));
    }

    #[test]
    fn braces_inside_strings_do_not_confuse_the_scanner() {
        let raw = r#"Result: {"notes": "pay {ref} on receipt", "total_amount": 10} done"#;
        let v = extract_json(raw).unwrap();
        assert_eq!(v["notes"], "pay {ref} on receipt");
        assert_eq!(v["total_amount"], 10);
    }

    #[test]
    fn escaped_quotes_inside_strings_are_honoured() {
        let raw = r#"{"notes": "vendor said \"net 30\" {firm}", "tax": 1}"#;
        let v = extract_json(raw).unwrap();
        assert_eq!(v["tax"], 1);
    }

    #[test]
    fn nested_objects_balance() {
        let raw = r#"Output: {"vendor": {"name": "Acme", "address": "1 Way"}, "items": [{"description": "x"}]} end"#;
        let v = extract_json(raw).unwrap();
        assert_eq!(v["vendor"]["name"], "Acme");
    }

    #[test]
    fn top_level_array_is_rejected() {
        let err = extract_json(r#"[1, 2, 3]"#).unwrap_err();
        assert!(matches!(err, InvoiceError::NoJsonFound { .. }));
    }

    #[test]
    fn invalid_candidate_reports_parse_detail() {
        // Balanced braces but not valid JSON inside.
        let err = extract_json("see {not: valid json} above").unwrap_err();
        match err {
            InvoiceError::JsonParseFailed { raw, detail } => {
                assert!(raw.contains("not: valid"));
                assert!(!detail.is_empty());
            }
            other => panic!("expected JsonParseFailed, got {other:?}"),
        }
    }
}
