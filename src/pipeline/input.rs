//! Input validation: normalise a user-supplied path into a checked document.
//!
//! Validation happens before any rendering or network work so the user gets
//! a meaningful error — wrong extension, missing file, unreadable file, or a
//! `.pdf` that is not actually a PDF — rather than a pdfium crash or a
//! confused model reply. PDF magic bytes (`%PDF`) are checked here because
//! the extension alone is a weak signal for files that came out of email
//! attachments and scanners.

use crate::error::InvoiceError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File extensions the pipeline accepts, lowercase.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg"];

/// Format tag for a validated input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Needs first-page rasterisation before encoding.
    Pdf,
    /// Passed through to the model as-is.
    Png,
    /// Passed through to the model as-is.
    Jpeg,
}

impl DocumentKind {
    /// Classify a path by its extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<DocumentKind> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "png" => Some(DocumentKind::Png),
            "jpg" | "jpeg" => Some(DocumentKind::Jpeg),
            _ => None,
        }
    }
}

/// A validated input: the path exists, is readable, and has a supported format.
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub path: PathBuf,
    pub kind: DocumentKind,
}

/// True when the path has one of the supported extensions.
///
/// This is the filter the file selector applies to directory listings.
pub fn is_supported_file(path: &Path) -> bool {
    DocumentKind::from_path(path).is_some()
}

/// Validate a user-supplied path and classify its format.
///
/// Checks, in order: supported extension, existence, read permission, and
/// for PDFs the `%PDF` magic bytes.
pub fn resolve_input(path_str: impl AsRef<Path>) -> Result<ResolvedInput, InvoiceError> {
    let path = path_str.as_ref().to_path_buf();

    let kind = DocumentKind::from_path(&path)
        .ok_or_else(|| InvoiceError::UnsupportedFormat { path: path.clone() })?;

    if !path.exists() {
        return Err(InvoiceError::FileNotFound { path });
    }

    // Check read permission by attempting to open
    match std::fs::File::open(&path) {
        Ok(mut f) => {
            if kind == DocumentKind::Pdf {
                let mut magic = [0u8; 4];
                if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                    return Err(InvoiceError::NotAPdf { path, magic });
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(InvoiceError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(InvoiceError::FileNotFound { path });
        }
    }

    debug!("Resolved input: {} ({:?})", path.display(), kind);
    Ok(ResolvedInput { path, kind })
}
