use std::path::PathBuf;

use thiserror::Error;

use crate::domain::image::ImageId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid credential")]
    InvalidCredential,
    #[error("at least one tag is required")]
    EmptyTags,
    #[error("tag at position {index} is blank")]
    BlankTag { index: usize },
    #[error("unsupported file type `{0}` (expected image/jpeg, image/gif or image/png)")]
    UnsupportedFileType(String),
    #[error("file is empty")]
    EmptyFile,
    #[error("file size {size} bytes exceeds the maximum of {max} bytes")]
    FileTooLarge { size: u64, max: u64 },
    #[error("invalid file name `{0}`")]
    InvalidFileName(String),
    #[error("invalid image id `{0}`")]
    InvalidImageId(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("image `{0}` does not exist")]
    NotFound(ImageId),
    #[error("file `{0}` already exists")]
    FileExists(String),
    #[error("catalog I/O failed on `{path}`: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("catalog document `{path}` could not be parsed: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("catalog could not be serialized: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl CatalogError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("unauthorized: {message}")]
    Unauthorized { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("conflict: {message}")]
    Conflict { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    /// Message safe to return to clients. Validation details are user-correctable, so they
    /// pass through; internal failures never leak paths or OS errors.
    pub fn user_message(&self) -> String {
        match self {
            Self::BadRequest { message, .. }
            | Self::NotFound { message, .. }
            | Self::Conflict { message, .. } => message.clone(),
            Self::Unauthorized { .. } => "Invalid Credential".to_owned(),
            Self::Internal { .. } => "An unexpected internal error occurred.".to_owned(),
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::Unauthorized { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::Conflict { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl CatalogError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::Unauthorized { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::Conflict { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<CatalogError> for InterfaceError {
    fn from(value: CatalogError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            CatalogError::Validation(ValidationError::InvalidCredential) => {
                Self::Unauthorized { message: "invalid credential".to_owned(), correlation_id }
            }
            CatalogError::Validation(error) => {
                Self::BadRequest { message: error.to_string(), correlation_id }
            }
            CatalogError::NotFound(id) => Self::NotFound {
                message: format!("the image of the id `{id}` does not exist"),
                correlation_id,
            },
            CatalogError::FileExists(name) => {
                Self::Conflict { message: format!("file `{name}` already exists"), correlation_id }
            }
            error @ (CatalogError::Io { .. }
            | CatalogError::Parse { .. }
            | CatalogError::Serialize(_)) => {
                Self::Internal { message: error.to_string(), correlation_id }
            }
        }
    }
}
