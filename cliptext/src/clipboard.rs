//! System clipboard access.
//!
//! The watcher and the restore action talk to the clipboard through the
//! [`ClipboardIo`] trait so tests can script clipboard contents. The real
//! implementation, [`SystemClipboard`], uses [`arboard`].

use arboard::Clipboard;
use thiserror::Error;

/// Errors from clipboard operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// The system clipboard could not be opened.
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    /// Reading the clipboard failed. Usually transient.
    #[error("failed to read clipboard: {0}")]
    Read(String),

    /// Writing the clipboard failed.
    #[error("failed to write clipboard: {0}")]
    Write(String),
}

/// Text access to a clipboard.
pub trait ClipboardIo {
    /// Returns the current clipboard text.
    ///
    /// Non-text content reads as the empty string.
    fn read_text(&mut self) -> Result<String, ClipboardError>;

    /// Replaces the clipboard contents with `text`.
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The operating system clipboard.
pub struct SystemClipboard {
    clipboard: Clipboard,
}

impl SystemClipboard {
    /// Connects to the system clipboard.
    ///
    /// # Errors
    ///
    /// Returns [`ClipboardError::Unavailable`] if no clipboard is reachable,
    /// e.g. without a display server.
    pub fn new() -> Result<Self, ClipboardError> {
        let clipboard = Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        Ok(Self { clipboard })
    }
}

impl ClipboardIo for SystemClipboard {
    fn read_text(&mut self) -> Result<String, ClipboardError> {
        match self.clipboard.get_text() {
            Ok(text) => Ok(text),
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(ClipboardError::Read(e.to_string())),
        }
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }
}
