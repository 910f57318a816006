//! Image intake: MIME detection and upload validation.

pub mod mime_detect;
pub mod upload;

pub use mime_detect::{detect_mime_type, is_image, sniff_image_mime};
pub use upload::{
    too_large_message, validate_upload, MAX_UPLOAD_BYTES, NOT_IMAGE_MESSAGE, NO_FILE_MESSAGE,
    TOO_LARGE_MESSAGE,
};
