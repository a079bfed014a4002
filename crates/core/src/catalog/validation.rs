use chrono::{DateTime, Utc};

use crate::errors::ValidationError;
use crate::jst;

pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10_000_000;

const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/gif", "image/png"];

pub fn validate_credential(expected: &str, input: &str) -> bool {
    !expected.is_empty() && expected == input
}

pub fn validate_tags<S: AsRef<str>>(tags: &[S]) -> Result<(), ValidationError> {
    if tags.is_empty() {
        return Err(ValidationError::EmptyTags);
    }
    if let Some(index) = tags.iter().position(|tag| tag.as_ref().trim().is_empty()) {
        return Err(ValidationError::BlankTag { index });
    }
    Ok(())
}

pub fn validate_file_type(mime_type: &str) -> Result<(), ValidationError> {
    if ALLOWED_MIME_TYPES.contains(&mime_type) {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedFileType(mime_type.to_string()))
    }
}

pub fn validate_file_size(size_bytes: u64, max_bytes: u64) -> Result<(), ValidationError> {
    if size_bytes == 0 {
        return Err(ValidationError::EmptyFile);
    }
    if size_bytes > max_bytes {
        return Err(ValidationError::FileTooLarge { size: size_bytes, max: max_bytes });
    }
    Ok(())
}

/// File names are used as-is under the image directory, so anything that could escape it
/// is refused.
pub fn validate_file_name(file_name: &str) -> Result<(), ValidationError> {
    let invalid = file_name.trim().is_empty()
        || file_name.contains('/')
        || file_name.contains('\\')
        || file_name.contains("..")
        || file_name.starts_with('.');
    if invalid {
        return Err(ValidationError::InvalidFileName(file_name.to_string()));
    }
    Ok(())
}

pub fn file_extension(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/png" => "png",
        _ => "unknown",
    }
}

/// `YYYY-MM-DD-HH-mm-ss.<ext>` stamped in JST.
pub fn generate_file_name(mime_type: &str, timestamp: DateTime<Utc>) -> String {
    format!("{}.{}", jst::format_file_stem(timestamp), file_extension(mime_type))
}
