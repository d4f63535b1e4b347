//! Applies [`MenuAction`]s to the stores and the clipboard.
//!
//! The presenter is the boundary where store and clipboard failures stop:
//! they are logged and the user sees no menu change.
//!
//! Store transactions run on the blocking pool, like the watcher's upserts,
//! so a menu action waiting for the write lock never stalls a runtime worker.

use tracing::{debug, error, info, warn};

use crate::clipboard::ClipboardIo;
use crate::error::{CliptextError, Result};
use crate::menu::{Menu, MenuAction};
use crate::store::{HistoryStore, PreferenceStore, StoreError};
use crate::types::{Entry, DEFAULT_DISPLAY_LIMIT};

/// Result of applying an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Render this menu.
    Menu(Menu),
    /// The entry was copied back to the clipboard.
    Restored(Entry),
    /// The stores changed; a change notification will follow.
    Updated,
    /// The action failed or referred to a stale entry.
    Nothing,
    /// The user asked to stop.
    Quit,
}

/// Copies the entry at `index` back to the clipboard.
///
/// The history is not modified here; the watcher observes the write as a
/// change on its next tick and refreshes the entry.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] (wrapped) if no entry has `index`, or the
/// clipboard's write error.
pub fn restore_selection<C: ClipboardIo>(
    history: &HistoryStore,
    clipboard: &mut C,
    index: u64,
) -> Result<Entry> {
    let entry = history.find_by_display_index(index)?;
    write_entry(clipboard, &entry)?;
    Ok(entry)
}

fn write_entry<C: ClipboardIo>(clipboard: &mut C, entry: &Entry) -> Result<()> {
    clipboard.write_text(&entry.text)?;
    debug!(
        index = entry.sequence_index,
        text_len = entry.text.len(),
        "Restored entry to clipboard"
    );
    Ok(())
}

/// Runs a store operation on the blocking pool.
async fn run_blocking<T, F>(op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> std::result::Result<T, StoreError> + Send + 'static,
{
    Ok(tokio::task::spawn_blocking(op).await??)
}

/// Reads the display limit, falling back to the default.
fn limit_or_default(preferences: &PreferenceStore) -> usize {
    preferences.get_limit().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to read display limit, using default");
        DEFAULT_DISPLAY_LIMIT
    })
}

/// Menu front end over the history and preference stores.
pub struct Presenter<C> {
    history: HistoryStore,
    preferences: PreferenceStore,
    clipboard: C,
}

impl<C: ClipboardIo> Presenter<C> {
    pub fn new(history: HistoryStore, preferences: PreferenceStore, clipboard: C) -> Self {
        Self {
            history,
            preferences,
            clipboard,
        }
    }

    /// The display limit, falling back to the default if it cannot be read.
    pub async fn limit(&self) -> usize {
        let preferences = self.preferences.clone();
        match tokio::task::spawn_blocking(move || limit_or_default(&preferences)).await {
            Ok(limit) => limit,
            Err(e) => {
                warn!(error = %e, "Display limit task failed, using default");
                DEFAULT_DISPLAY_LIMIT
            }
        }
    }

    /// Builds the current menu.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read.
    pub async fn menu(&self) -> Result<Menu> {
        let history = self.history.clone();
        let preferences = self.preferences.clone();
        run_blocking(move || {
            let limit = limit_or_default(&preferences);
            let entries = history.list_recent(limit)?;
            Ok(Menu::build(&entries, limit))
        })
        .await
    }

    async fn restore(&mut self, index: u64) -> Result<Entry> {
        let history = self.history.clone();
        let entry = run_blocking(move || history.find_by_display_index(index)).await?;
        write_entry(&mut self.clipboard, &entry)?;
        Ok(entry)
    }

    /// Applies `action`, logging any failure.
    pub async fn apply(&mut self, action: MenuAction) -> Response {
        match action {
            MenuAction::Show => match self.menu().await {
                Ok(menu) => Response::Menu(menu),
                Err(e) => {
                    error!(error = %e, "Failed to load history");
                    Response::Nothing
                }
            },
            MenuAction::Restore(index) => match self.restore(index).await {
                Ok(entry) => Response::Restored(entry),
                Err(CliptextError::Store(StoreError::NotFound { index })) => {
                    warn!(index, "Selected entry no longer exists");
                    Response::Nothing
                }
                Err(e) => {
                    error!(index, error = %e, "Failed to restore entry");
                    Response::Nothing
                }
            },
            MenuAction::Clear => {
                let history = self.history.clone();
                match run_blocking(move || history.clear_all()).await {
                    Ok(_) => Response::Updated,
                    Err(e) => {
                        error!(error = %e, "Failed to clear history");
                        Response::Nothing
                    }
                }
            }
            MenuAction::SetLimit(choice) => {
                let preferences = self.preferences.clone();
                match run_blocking(move || preferences.set_limit(choice.limit())).await {
                    Ok(()) => {
                        info!(limit = choice.label(), "Display limit selected");
                        Response::Updated
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to store display limit");
                        Response::Nothing
                    }
                }
            }
            MenuAction::Quit => Response::Quit,
        }
    }

    /// The clipboard used for restores.
    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }
}
