use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Fault classes a backend can report.
///
/// Backends map their own failure modes onto these codes; the facade only ever
/// distinguishes "on the benign allow-list" from "everything else".
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendErrorCode {
    Unknown,
    Internal,
    InvalidArgument,
    PermissionDenied,
    Unauthenticated,
    NotFound,
    ObjectNotFound,
    AlreadyExists,
    DownloadSizeExceeded,
    Unavailable,
    Cancelled,
    Serialization,
}

impl BackendErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendErrorCode::Unknown => "unknown",
            BackendErrorCode::Internal => "internal",
            BackendErrorCode::InvalidArgument => "invalid-argument",
            BackendErrorCode::PermissionDenied => "permission-denied",
            BackendErrorCode::Unauthenticated => "unauthenticated",
            BackendErrorCode::NotFound => "not-found",
            BackendErrorCode::ObjectNotFound => "object-not-found",
            BackendErrorCode::AlreadyExists => "already-exists",
            BackendErrorCode::DownloadSizeExceeded => "download-size-exceeded",
            BackendErrorCode::Unavailable => "unavailable",
            BackendErrorCode::Cancelled => "cancelled",
            BackendErrorCode::Serialization => "serialization",
        }
    }
}

impl Display for BackendErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct BackendError {
    pub code: BackendErrorCode,
    message: String,
}

impl BackendError {
    pub fn new(code: BackendErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for BackendError {}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        internal_error(format!("I/O failure: {err}"))
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        serialization_error(format!("JSON conversion failed: {err}"))
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

pub fn internal_error(message: impl Into<String>) -> BackendError {
    BackendError::new(BackendErrorCode::Internal, message)
}

pub fn invalid_argument(message: impl Into<String>) -> BackendError {
    BackendError::new(BackendErrorCode::InvalidArgument, message)
}

pub fn permission_denied(message: impl Into<String>) -> BackendError {
    BackendError::new(BackendErrorCode::PermissionDenied, message)
}

pub fn unauthenticated(message: impl Into<String>) -> BackendError {
    BackendError::new(BackendErrorCode::Unauthenticated, message)
}

pub fn not_found(message: impl Into<String>) -> BackendError {
    BackendError::new(BackendErrorCode::NotFound, message)
}

pub fn object_not_found(path: &str) -> BackendError {
    BackendError::new(
        BackendErrorCode::ObjectNotFound,
        format!("Object '{path}' does not exist."),
    )
}

pub fn already_exists(message: impl Into<String>) -> BackendError {
    BackendError::new(BackendErrorCode::AlreadyExists, message)
}

pub fn download_size_exceeded(size: u64, limit: u64) -> BackendError {
    BackendError::new(
        BackendErrorCode::DownloadSizeExceeded,
        format!("Object is {size} bytes which exceeds the {limit} byte download limit."),
    )
}

pub fn unavailable(message: impl Into<String>) -> BackendError {
    BackendError::new(BackendErrorCode::Unavailable, message)
}

pub fn serialization_error(message: impl Into<String>) -> BackendError {
    BackendError::new(BackendErrorCode::Serialization, message)
}
