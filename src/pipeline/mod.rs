//! Pipeline stages for invoice-to-JSON extraction.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different rendering backend) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! browse ──▶ input ──▶ render ──▶ encode ──▶ client ──▶ response
//! (select)  (validate) (pdfium)   (base64)   (Ollama)   (JSON scan)
//! ```
//!
//! 1. [`browse`]   — list and filter directory entries for the selector
//! 2. [`input`]    — validate the chosen path and classify its format
//! 3. [`render`]   — rasterise page 1 of a PDF; runs in `spawn_blocking`
//!    because pdfium is not async-safe; images skip this stage
//! 4. [`encode`]   — PNG-encode and base64-wrap the image for the request body
//! 5. [`client`]   — the single model API call; the only stage with network I/O
//! 6. [`response`] — recover the JSON object from the model's free-form reply

pub mod browse;
pub mod client;
pub mod encode;
pub mod input;
pub mod render;
pub mod response;
