//! Terminal presentation: syntax-coloured pretty JSON.
//!
//! A small hand-rolled colouriser over `serde_json::Value` rather than a
//! full highlighting library: the output language is always JSON, the
//! palette is four colours, and walking the value tree directly guarantees
//! the plain rendering is byte-identical to `serde_json::to_string_pretty`
//! (which the round-trip tests rely on).

use serde_json::Value;

/// Two-space indentation, matching `serde_json`'s pretty printer.
const INDENT: &str = "  ";

// ── ANSI colour helpers ──────────────────────────────────────────────────

fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}
fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn magenta(s: &str) -> String {
    format!("\x1b[35m{s}\x1b[0m")
}

/// Render a JSON value as indented text.
///
/// With `color` on: object keys cyan, strings green, numbers yellow,
/// booleans and null magenta. With `color` off the output is exactly what
/// `serde_json::to_string_pretty` produces.
pub fn render_json(value: &Value, color: bool) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0, color);
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize, color: bool) {
    match value {
        Value::Null => out.push_str(&literal("null", color)),
        Value::Bool(b) => out.push_str(&literal(if *b { "true" } else { "false" }, color)),
        Value::Number(n) => {
            let s = n.to_string();
            let s = if color { yellow(&s) } else { s };
            out.push_str(&s);
        }
        Value::String(s) => {
            let quoted = escape_string(s);
            let quoted = if color { green(&quoted) } else { quoted };
            out.push_str(&quoted);
        }
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                push_indent(out, depth + 1);
                write_value(out, item, depth + 1, color);
                if i + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, depth);
            out.push(']');
        }
        Value::Object(map) => {
            if map.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{\n");
            for (i, (key, val)) in map.iter().enumerate() {
                push_indent(out, depth + 1);
                let quoted = escape_string(key);
                let quoted = if color { cyan(&quoted) } else { quoted };
                out.push_str(&quoted);
                out.push_str(": ");
                write_value(out, val, depth + 1, color);
                if i + 1 < map.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, depth);
            out.push('}');
        }
    }
}

fn literal(s: &str, color: bool) -> String {
    if color {
        magenta(s)
    } else {
        s.to_string()
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

/// JSON-escape and quote a string via serde_json itself, so escaping rules
/// can never drift from the exporter's.
fn escape_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}
