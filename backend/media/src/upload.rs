//! Upload validation: size cap and image-only filter, applied before any pipeline stage runs.

use bytes::Bytes;
use tracing::debug;

pub use geoclass_core::defaults::MAX_UPLOAD_BYTES;
use geoclass_core::{ClassifyError, ImageInput};

use crate::mime_detect::{is_image, sniff_image_mime};

pub const NO_FILE_MESSAGE: &str = "No image file provided";
pub const NOT_IMAGE_MESSAGE: &str = "Only image files are allowed";
pub const TOO_LARGE_MESSAGE: &str = "File too large (max 10MB)";

/// Validate an uploaded file and turn it into pipeline input.
///
/// The declared content type wins; when it is missing or generic
/// (`application/octet-stream`) the magic bytes decide.
pub fn validate_upload(
    data: Bytes,
    content_type: Option<&str>,
    file_name: Option<&str>,
    max_bytes: usize,
) -> Result<ImageInput, ClassifyError> {
    if data.is_empty() {
        return Err(ClassifyError::InvalidInput(NO_FILE_MESSAGE.into()));
    }
    if data.len() > max_bytes {
        return Err(ClassifyError::InvalidInput(too_large_message(max_bytes)));
    }

    let declared = content_type
        .map(str::trim)
        .filter(|ct| !ct.is_empty() && !ct.eq_ignore_ascii_case("application/octet-stream"));
    let mime = match declared {
        Some(ct) if is_image(ct) => ct.to_ascii_lowercase(),
        Some(_) => return Err(ClassifyError::InvalidInput(NOT_IMAGE_MESSAGE.into())),
        None => sniff_image_mime(&data)
            .ok_or_else(|| ClassifyError::InvalidInput(NOT_IMAGE_MESSAGE.into()))?
            .to_string(),
    };

    debug!(mime = %mime, bytes = data.len(), "Accepted upload");
    let mut image = ImageInput::new(data, mime);
    if let Some(name) = file_name {
        image = image.with_file_name(name);
    }
    Ok(image)
}

/// Size-limit message; names the limit in whole megabytes.
pub fn too_large_message(max_bytes: usize) -> String {
    if max_bytes == MAX_UPLOAD_BYTES {
        TOO_LARGE_MESSAGE.to_string()
    } else {
        format!("File too large (max {}MB)", max_bytes / (1024 * 1024))
    }
}
