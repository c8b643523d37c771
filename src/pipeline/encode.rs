//! Image encoding: document → base64 payload for the model API.
//!
//! Ollama's generate endpoint accepts images as plain base64 strings in the
//! `images` array. Rendered PDF pages are PNG-encoded first — lossless
//! compression keeps printed figures crisp, which matters more than payload
//! size for field extraction. PNG and JPEG inputs are already in a format
//! the model accepts, so their bytes are base64'd unchanged.

use crate::error::InvoiceError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// PNG-encode a rendered page and base64 it for the request body.
pub fn encode_rendered_page(img: &DynamicImage) -> Result<String, InvoiceError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| InvoiceError::ImageEncodingFailed {
            detail: e.to_string(),
        })?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded rendered page → {} bytes base64", b64.len());
    Ok(b64)
}

/// Read an image file and base64 its bytes unchanged.
pub fn encode_image_file(path: &Path) -> Result<String, InvoiceError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => InvoiceError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => InvoiceError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;

    let b64 = STANDARD.encode(&bytes);
    debug!(
        "Encoded {} → {} bytes base64",
        path.display(),
        b64.len()
    );
    Ok(b64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_small_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let b64 = encode_rendered_page(&img).expect("encode should succeed");
        assert!(!b64.is_empty());

        let decoded = STANDARD.decode(&b64).expect("valid base64");
        // PNG magic bytes survive the round trip
        assert_eq!(&decoded[..4], b"\x89PNG");
    }

    #[test]
    fn encode_file_passthrough() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.jpg");
        std::fs::write(&path, b"\xFF\xD8\xFF\xE0 fake jpeg body").unwrap();

        let b64 = encode_image_file(&path).unwrap();
        let decoded = STANDARD.decode(&b64).unwrap();
        assert_eq!(decoded, b"\xFF\xD8\xFF\xE0 fake jpeg body");
    }

    #[test]
    fn encode_missing_file_errors() {
        let err = encode_image_file(Path::new("/nope/missing.png")).unwrap_err();
        assert!(matches!(err, InvoiceError::FileNotFound { .. }));
    }
}
