//! PDF rasterisation: render the first page to a `DynamicImage` via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto the blocking
//! thread pool so the async worker threads never stall on rendering.
//!
//! ## Why only page 1?
//!
//! Invoices are single-page documents in practice; when a PDF carries extra
//! pages they are terms-and-conditions boilerplate the model does not need.
//! Rendering exactly index 0 keeps the run cheap and the behaviour
//! predictable for multi-page files.

use crate::config::ExtractionConfig;
use crate::error::InvoiceError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Rasterise the first page of a PDF into an image.
///
/// Runs inside `spawn_blocking` since pdfium operations are CPU-bound.
pub async fn render_first_page(
    pdf_path: &Path,
    config: &ExtractionConfig,
) -> Result<DynamicImage, InvoiceError> {
    let path = pdf_path.to_path_buf();
    let max_pixels = config.max_rendered_pixels;

    tokio::task::spawn_blocking(move || render_first_page_blocking(&path, max_pixels))
        .await
        .map_err(|e| InvoiceError::Internal(format!("Render task panicked: {}", e)))?
}

/// Blocking implementation of first-page rendering.
fn render_first_page_blocking(
    pdf_path: &Path,
    max_pixels: u32,
) -> Result<DynamicImage, InvoiceError> {
    let pdfium = Pdfium::default();

    let document =
        pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| InvoiceError::PdfRenderFailed {
                path: pdf_path.to_path_buf(),
                detail: format!("{:?}", e),
            })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    let index = select_page(total_pages, pdf_path)?;
    info!("PDF loaded: {} pages, rendering page {}", total_pages, index + 1);

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let page = pages.get(index).map_err(|e| InvoiceError::PdfRenderFailed {
        path: pdf_path.to_path_buf(),
        detail: format!("{:?}", e),
    })?;

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| InvoiceError::PdfRenderFailed {
            path: pdf_path.to_path_buf(),
            detail: format!("{:?}", e),
        })?;

    let image = bitmap.as_image();
    debug!("Rendered page 1 → {}x{} px", image.width(), image.height());

    Ok(image)
}

/// Choose which page index to rasterise.
///
/// Always the first page, regardless of how many the document has; an empty
/// document is an error.
fn select_page(total_pages: usize, pdf_path: &Path) -> Result<u16, InvoiceError> {
    if total_pages == 0 {
        return Err(InvoiceError::EmptyDocument {
            path: pdf_path.to_path_buf(),
        });
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_page_document_uses_first_page() {
        assert_eq!(select_page(1, Path::new("a.pdf")).unwrap(), 0);
    }

    #[test]
    fn multi_page_document_still_uses_first_page() {
        // Extra pages are boilerplate; only page 1 is ever rendered.
        assert_eq!(select_page(2, Path::new("a.pdf")).unwrap(), 0);
        assert_eq!(select_page(40, Path::new("a.pdf")).unwrap(), 0);
    }

    #[test]
    fn empty_document_is_an_error() {
        let err = select_page(0, Path::new("empty.pdf")).unwrap_err();
        assert!(matches!(err, InvoiceError::EmptyDocument { .. }));
    }
}
