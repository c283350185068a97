//! Store status codes and error handling
//!
//! Every store operation succeeds or fails with one of a small set of
//! status codes. Backing-store and configuration problems get their own
//! error variants but still map onto a status code.

use thiserror::Error;

/// Outcome of a store operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StatusCode {
    /// Operation completed successfully
    Success = 0,
    /// Key not present in any live slot
    NotFound = 1,
    /// Key found, but as the other kind (identifier vs password)
    TypeMismatch = 2,
    /// No free slot left for a new record
    CapacityExceeded = 3,
    /// Bad input: both keys zero, slot out of range, names disabled...
    InvalidArgument = 4,
    /// Access outside the backing store
    AddressOutOfRange = 5,
    /// Backing store I/O failed
    IoError = 6,
    /// Unknown status code
    Unknown = 255,
}

impl StatusCode {
    /// Create a StatusCode from a raw u8 value
    pub fn from_raw(code: u8) -> Self {
        match code {
            0 => StatusCode::Success,
            1 => StatusCode::NotFound,
            2 => StatusCode::TypeMismatch,
            3 => StatusCode::CapacityExceeded,
            4 => StatusCode::InvalidArgument,
            5 => StatusCode::AddressOutOfRange,
            6 => StatusCode::IoError,
            _ => StatusCode::Unknown,
        }
    }

    /// Get the raw status code value
    pub fn as_raw(&self) -> u8 {
        *self as u8
    }

    /// Check if this is a success status
    pub fn is_success(&self) -> bool {
        matches!(self, StatusCode::Success)
    }

    /// Check if the key simply was not there
    pub fn is_not_found(&self) -> bool {
        matches!(self, StatusCode::NotFound)
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.as_raw(), match self {
            StatusCode::Success => "Success",
            StatusCode::NotFound => "Key not found",
            StatusCode::TypeMismatch => "Key is of the other kind",
            StatusCode::CapacityExceeded => "Store is full",
            StatusCode::InvalidArgument => "Invalid argument",
            StatusCode::AddressOutOfRange => "Address out of range",
            StatusCode::IoError => "I/O error",
            StatusCode::Unknown => "Error",
        })
    }
}

/// Main error type for the record store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store status {0}")]
    Status(StatusCode),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid geometry: {0}")]
    Geometry(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StoreError {
    /// Get the status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            StoreError::Status(code) => *code,
            StoreError::Io(_) => StatusCode::IoError,
            StoreError::Geometry(_) | StoreError::Config(_) => StatusCode::InvalidArgument,
        }
    }
}

impl From<StatusCode> for StoreError {
    fn from(code: StatusCode) -> Self {
        StoreError::Status(code)
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
