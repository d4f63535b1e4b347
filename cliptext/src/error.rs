//! Error types for cliptext.
//!
//! Each module defines its own error enum; [`CliptextError`] collects them
//! for callers that span several modules.

use thiserror::Error;

use crate::clipboard::ClipboardError;
use crate::config::ConfigError;
use crate::menu::MenuError;
use crate::store::StoreError;

/// Errors that can occur in cliptext operations.
///
/// # Examples
///
/// ```
/// use cliptext::error::{CliptextError, Result};
/// use cliptext::store::StoreError;
///
/// fn lookup(index: u64) -> Result<()> {
///     Err(StoreError::NotFound { index }.into())
/// }
///
/// assert!(matches!(
///     lookup(7),
///     Err(CliptextError::Store(StoreError::NotFound { index: 7 }))
/// ));
/// ```
#[derive(Error, Debug)]
pub enum CliptextError {
    /// Configuration-related error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// History or preference storage error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// System clipboard error.
    #[error("clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    /// Invalid menu input.
    #[error("menu error: {0}")]
    Menu(#[from] MenuError),

    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking-pool task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A specialized `Result` type for cliptext operations.
pub type Result<T> = std::result::Result<T, CliptextError>;
