//! cliptext - clipboard history keeper.
//!
//! This crate watches the system clipboard and keeps a deduplicated,
//! recency-ordered history of the text that passed through it, so earlier
//! clips can be listed and copied back.
//!
//! # Overview
//!
//! A [`ClipboardWatcher`] polls the clipboard and reports each change to the
//! [`HistoryStore`]. The store keys entries by a fingerprint of their text:
//! copying the same text again refreshes the existing entry instead of adding
//! a new one. Every entry carries a display index that never changes and is
//! never reused, which the [`presenter`] uses to select entries. The
//! [`PreferenceStore`] holds how many entries to show.
//!
//! # Modules
//!
//! - [`types`]: Entry, preference and notification types
//! - [`store`]: Persistent history and preference stores
//! - [`watcher`]: Clipboard polling loop
//! - [`clipboard`]: System clipboard access
//! - [`menu`]: Menu model and user actions
//! - [`input`]: Line-based menu input
//! - [`presenter`]: Applies menu actions to the stores
//! - [`broadcast`]: Change notifications
//! - [`config`]: Configuration from environment variables
//! - [`error`]: Error types
//! - [`utils`]: Fingerprints and labels

pub mod broadcast;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod input;
pub mod menu;
pub mod presenter;
pub mod store;
pub mod types;
pub mod utils;
pub mod watcher;

pub use broadcast::HistoryNotifier;
pub use clipboard::{ClipboardError, ClipboardIo, SystemClipboard};
pub use config::{Config, ConfigError};
pub use error::{CliptextError, Result};
pub use input::spawn_line_reader;
pub use menu::{LimitChoice, Menu, MenuAction, MenuError};
pub use presenter::{restore_selection, Presenter, Response};
pub use store::{HistoryStore, PreferenceStore, Storage, StoreError};
pub use types::{Entry, HistoryEvent, Preference, PreferenceKind, UpsertOutcome};
pub use utils::{fingerprint, truncate_label, LABEL_WIDTH};
pub use watcher::{ClipboardWatcher, TickOutcome};
