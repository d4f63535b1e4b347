//! Menu model for presenting the clipboard history.
//!
//! [`Menu`] is a snapshot of what a tray-style presenter shows: a title, the
//! most recent entries with short labels and accelerators, the display-limit
//! choices and the clear/quit actions. It is plain data so any front end (the
//! terminal presenter in the binary, a tray, a test) can render it.
//!
//! [`MenuAction`] is the set of things a user can do with the menu, parsed
//! from a text command.

use std::fmt::Write as _;
use std::str::FromStr;

use thiserror::Error;

use crate::types::Entry;
use crate::utils::{truncate_label, LABEL_WIDTH};

/// Limit stored for the "unlimited" choice.
pub const UNLIMITED_LIMIT: usize = 300;

/// Text shown when there are no entries to list.
pub const EMPTY_PLACEHOLDER: &str = "clipboard is empty";

/// Number of entries that receive a keyboard accelerator.
pub const MAX_ACCELERATORS: usize = 9;

/// Errors from parsing menu input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MenuError {
    /// The command word was not recognized.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A display index was missing or not a positive number.
    #[error("invalid display index: {0:?}")]
    InvalidIndex(String),

    /// A limit choice was not one of `10`, `30` or `unlimited`.
    #[error("invalid limit {0:?} (expected 10, 30 or unlimited)")]
    InvalidLimit(String),
}

/// The display-limit choices offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitChoice {
    Ten,
    Thirty,
    Unlimited,
}

impl LimitChoice {
    /// All choices in menu order.
    pub const ALL: [LimitChoice; 3] = [
        LimitChoice::Ten,
        LimitChoice::Thirty,
        LimitChoice::Unlimited,
    ];

    /// The limit value stored for this choice.
    #[must_use]
    pub fn limit(self) -> usize {
        match self {
            LimitChoice::Ten => 10,
            LimitChoice::Thirty => 30,
            LimitChoice::Unlimited => UNLIMITED_LIMIT,
        }
    }

    /// The label shown in the menu.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            LimitChoice::Ten => "10",
            LimitChoice::Thirty => "30",
            LimitChoice::Unlimited => "unlimited",
        }
    }

    /// The choice whose stored value equals `limit`, if any.
    #[must_use]
    pub fn from_limit(limit: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|choice| choice.limit() == limit)
    }
}

impl FromStr for LimitChoice {
    type Err = MenuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "10" => Ok(LimitChoice::Ten),
            "30" => Ok(LimitChoice::Thirty),
            "unlimited" | "300" => Ok(LimitChoice::Unlimited),
            other => Err(MenuError::InvalidLimit(other.to_string())),
        }
    }
}

/// One history entry as shown in the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Index used to select the entry. Stable for the entry's lifetime.
    pub display_index: u64,
    /// Text truncated to [`LABEL_WIDTH`] characters.
    pub label: String,
    /// Keyboard shortcut, for the first [`MAX_ACCELERATORS`] items.
    pub accelerator: Option<String>,
}

/// A display-limit choice and whether it is the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitOption {
    pub choice: LimitChoice,
    pub checked: bool,
}

/// Snapshot of the presenter menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub title: String,
    pub items: Vec<MenuItem>,
    pub limit_options: Vec<LimitOption>,
}

impl Menu {
    /// Builds a menu from entries already ordered most recent first.
    ///
    /// At most `limit` entries are shown. Entries with empty text are listed
    /// nowhere; they stay in the history.
    #[must_use]
    pub fn build(entries: &[Entry], limit: usize) -> Self {
        let items = entries
            .iter()
            .take(limit)
            .filter(|entry| !entry.text.is_empty())
            .enumerate()
            .map(|(position, entry)| MenuItem {
                display_index: entry.sequence_index,
                label: truncate_label(&entry.text, LABEL_WIDTH).to_string(),
                accelerator: (position < MAX_ACCELERATORS)
                    .then(|| format!("Command+{}", position + 1)),
            })
            .collect();

        let limit_options = LimitChoice::ALL
            .into_iter()
            .map(|choice| LimitOption {
                choice,
                checked: choice.limit() == limit,
            })
            .collect();

        Self {
            title: format!("cliptext v{}", env!("CARGO_PKG_VERSION")),
            items,
            limit_options,
        }
    }

    /// True when no entry is listed and the placeholder is shown instead.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Renders the menu as plain text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out, "{}", "-".repeat(self.title.len()));

        if self.items.is_empty() {
            let _ = writeln!(out, "  {EMPTY_PLACEHOLDER}");
        }
        for item in &self.items {
            let accelerator = item.accelerator.as_deref().unwrap_or("");
            let _ = writeln!(
                out,
                "  [{:>3}] {:<10} {}",
                item.display_index,
                accelerator,
                item.label.replace(['\n', '\r'], " ")
            );
        }

        let _ = writeln!(out);
        let choices: Vec<String> = self
            .limit_options
            .iter()
            .map(|option| {
                let mark = if option.checked { 'x' } else { ' ' };
                format!("[{mark}] {}", option.choice.label())
            })
            .collect();
        let _ = writeln!(out, "Limit: {}", choices.join("  "));
        let _ = writeln!(out, "Commands: restore <n>, clear, limit <10|30|unlimited>, list, quit");
        out
    }
}

/// A user action on the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Show the current menu.
    Show,
    /// Copy the entry with this display index back to the clipboard.
    Restore(u64),
    /// Remove every history entry.
    Clear,
    /// Change the display limit.
    SetLimit(LimitChoice),
    /// Stop the program.
    Quit,
}

impl FromStr for MenuAction {
    type Err = MenuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let command = words.next().unwrap_or("list").to_ascii_lowercase();
        let argument = words.next();

        match command.as_str() {
            "list" | "ls" | "show" => Ok(MenuAction::Show),
            "restore" | "r" => {
                let raw = argument.unwrap_or_default();
                match raw.parse::<u64>() {
                    Ok(index) if index > 0 => Ok(MenuAction::Restore(index)),
                    _ => Err(MenuError::InvalidIndex(raw.to_string())),
                }
            }
            "clear" => Ok(MenuAction::Clear),
            "limit" => argument
                .unwrap_or_default()
                .parse::<LimitChoice>()
                .map(MenuAction::SetLimit),
            "quit" | "exit" | "q" => Ok(MenuAction::Quit),
            other => match other.parse::<u64>() {
                Ok(index) if index > 0 => Ok(MenuAction::Restore(index)),
                _ => Err(MenuError::UnknownCommand(other.to_string())),
            },
        }
    }
}
