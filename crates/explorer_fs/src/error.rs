//! Error taxonomy shared by every engine operation.

use std::io;
use std::path::{Path, PathBuf};

/// Why a single transfer item, create or rename failed.
///
/// Cloneable so per-item outcomes can be kept around and re-rendered by the
/// caller after a batch finishes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("I/O error on {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("invalid name '{0}'")]
    InvalidName(String),

    #[error("invalid target {}: {reason}", path.display())]
    InvalidTarget { path: PathBuf, reason: String },

    #[error("already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("a transfer into {} is already in progress", .0.display())]
    DestinationBusy(PathBuf),

    /// The trash facility is missing or refused the item. Only used
    /// internally to select the permanent-delete fallback.
    #[error("trash capability unavailable")]
    CapabilityUnavailable,

    #[error("cancelled")]
    Cancelled,
}

impl TransferError {
    /// Maps an I/O error on `path` onto the taxonomy.
    pub fn from_io(path: &Path, err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::AlreadyExists => Self::AlreadyExists(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
        }
    }

    pub fn invalid_target(path: &Path, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Short label used in batch summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not found",
            Self::PermissionDenied(_) => "permission denied",
            Self::Io { .. } => "I/O error",
            Self::InvalidName(_) => "invalid name",
            Self::InvalidTarget { .. } => "invalid target",
            Self::AlreadyExists(_) => "already exists",
            Self::DestinationBusy(_) => "destination busy",
            Self::CapabilityUnavailable => "trash unavailable",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Navigation requests that could not be resolved. State is never changed
/// when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("location not found: {0}")]
    NotFound(String),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("no search result at index {0}")]
    NoSuchResult(usize),

    #[error("no pinned location at index {0}")]
    NoSuchPinned(usize),
}

pub type TransferResult<T> = std::result::Result<T, TransferError>;
