//! Loading and encoding of user-supplied reference images.
//!
//! Reference photos condition both the analysis call and per-poster image
//! generation; they travel as base64 payloads with an explicit mime type.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// A reference image encoded for the generation API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedImage {
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

#[derive(Debug, Error)]
pub enum ReferenceImageError {
    #[error("Reference image not found: {path}. Hint: check the path relative to the current working directory or use an absolute path.")]
    NotFound { path: String },
    #[error("Unsupported file extension '{extension}'. Supported image extensions: {supported}.")]
    UnsupportedExtension {
        extension: String,
        supported: String,
    },
    #[error("Failed to read reference image {path}: {message}")]
    Read { path: String, message: String },
}

/// Reads an image file and encodes it for the generation API.
pub fn load_reference_image(path: impl AsRef<Path>) -> Result<EncodedImage, ReferenceImageError> {
    let path = path.as_ref();

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ReferenceImageError::UnsupportedExtension {
            extension: if extension.is_empty() {
                "no extension".to_string()
            } else {
                extension
            },
            supported: IMAGE_EXTENSIONS.join(", "),
        });
    }

    if !path.is_file() {
        return Err(ReferenceImageError::NotFound {
            path: path.to_string_lossy().into_owned(),
        });
    }

    let bytes = fs::read(path).map_err(|e| ReferenceImageError::Read {
        path: path.to_string_lossy().into_owned(),
        message: e.to_string(),
    })?;

    Ok(EncodedImage {
        mime_type: mime_for_extension(&extension).to_string(),
        data: BASE64_STANDARD.encode(bytes),
    })
}

fn mime_for_extension(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}
