//! cliptext - clipboard history keeper.
//!
//! This binary records clipboard text into a local history and lets earlier
//! entries be listed and copied back.
//!
//! # Commands
//!
//! - `cliptext run`: Start the watcher with an interactive menu on stdin
//! - `cliptext list`: Print the history menu
//! - `cliptext restore <INDEX>`: Copy an entry back to the clipboard
//! - `cliptext clear`: Remove every entry
//! - `cliptext limit [CHOICE]`: Show or set the display limit
//!
//! # Environment Variables
//!
//! See the [`config`] module for available configuration options.

use std::io::BufReader;
use std::num::NonZeroUsize;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use cliptext::clipboard::SystemClipboard;
use cliptext::config::Config;
use cliptext::input::spawn_line_reader;
use cliptext::menu::{LimitChoice, Menu, MenuAction};
use cliptext::presenter::{restore_selection, Presenter, Response};
use cliptext::store::Storage;
use cliptext::types::HistoryEvent;
use cliptext::watcher::ClipboardWatcher;

/// Grace period for blocking-pool work after the daemon loop exits.
const SHUTDOWN_TIMEOUT_SECS: u64 = 5;

/// cliptext - clipboard history keeper.
///
/// Records text copied to the clipboard and lets earlier entries be
/// listed and copied back.
#[derive(Parser, Debug)]
#[command(name = "cliptext")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
ENVIRONMENT VARIABLES:
    CLIPTEXT_DATA_DIR          History directory (default: ~/.cliptext)
    CLIPTEXT_POLL_INTERVAL_MS  Clipboard polling interval (default: 500)
    CLIPTEXT_ENV               Set to 'development' for debug logging
    RUST_LOG                   Log filter (overrides the default level)

EXAMPLES:
    # Start recording the clipboard
    cliptext run

    # Show the 30 most recent entries
    cliptext list --limit 30

    # Copy entry 4 back to the clipboard
    cliptext restore 4

    # Show up to 30 entries from now on
    cliptext limit 30
")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Start the clipboard watcher.
    ///
    /// Reads menu commands from stdin: list, restore <n>, clear,
    /// limit <10|30|unlimited>, quit.
    Run,

    /// Print the history menu.
    List {
        /// Number of entries to show (default: stored limit).
        #[arg(short, long)]
        limit: Option<NonZeroUsize>,
    },

    /// Copy an entry back to the clipboard.
    Restore {
        /// Display index shown by `list`.
        index: u64,
    },

    /// Remove every history entry.
    Clear,

    /// Show or set the display limit.
    Limit {
        /// One of 10, 30 or unlimited.
        choice: Option<LimitChoice>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_logging(&config);

    match cli.command {
        Command::Run => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to create tokio runtime")?;

            let result = runtime.block_on(run_daemon(config));
            runtime.shutdown_timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS));
            result
        }
        Command::List { limit } => run_list(&config, limit),
        Command::Restore { index } => run_restore(&config, index),
        Command::Clear => run_clear(&config),
        Command::Limit { choice } => run_limit(&config, choice),
    }
}

/// Opens the history database, explaining the common lock failure.
fn open_storage(config: &Config) -> Result<Storage> {
    let path = config.database_path();
    Storage::open(&path).with_context(|| {
        format!(
            "Failed to open history database at {} (is `cliptext run` already running?)",
            path.display()
        )
    })
}

/// Prints the menu.
fn run_list(config: &Config, limit: Option<NonZeroUsize>) -> Result<()> {
    let storage = open_storage(config)?;

    let limit = match limit {
        Some(limit) => limit.get(),
        None => storage
            .preferences()
            .get_limit()
            .context("Failed to read display limit")?,
    };
    let entries = storage
        .history()
        .list_recent(limit)
        .context("Failed to read history")?;

    print!("{}", Menu::build(&entries, limit).render());
    Ok(())
}

/// Copies one entry back to the clipboard.
fn run_restore(config: &Config, index: u64) -> Result<()> {
    let storage = open_storage(config)?;
    let mut clipboard = SystemClipboard::new().context("Failed to open clipboard")?;

    let entry = restore_selection(&storage.history(), &mut clipboard, index)
        .with_context(|| format!("Failed to restore entry {index}"))?;

    println!("Copied entry {} ({} chars)", index, entry.text.chars().count());
    Ok(())
}

/// Removes every entry.
fn run_clear(config: &Config) -> Result<()> {
    let storage = open_storage(config)?;
    let removed = storage
        .history()
        .clear_all()
        .context("Failed to clear history")?;

    println!("Removed {removed} entries");
    Ok(())
}

/// Shows or sets the display limit.
fn run_limit(config: &Config, choice: Option<LimitChoice>) -> Result<()> {
    let storage = open_storage(config)?;
    let preferences = storage.preferences();

    if let Some(choice) = choice {
        preferences
            .set_limit(choice.limit())
            .context("Failed to store display limit")?;
    }

    let limit = preferences
        .get_limit()
        .context("Failed to read display limit")?;
    match LimitChoice::from_limit(limit) {
        Some(choice) => println!("Display limit: {}", choice.label()),
        None => println!("Display limit: {limit}"),
    }
    Ok(())
}

/// Runs the watcher and the stdin menu until shutdown or `quit`.
async fn run_daemon(config: Config) -> Result<()> {
    info!(
        data_dir = %config.data_dir.display(),
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        development = config.development,
        "Starting cliptext"
    );

    let storage = open_storage(&config)?;

    let watcher = ClipboardWatcher::new(
        SystemClipboard::new().context("Failed to open clipboard for watching")?,
        storage.history(),
        config.poll_interval,
    );
    let mut presenter = Presenter::new(
        storage.history(),
        storage.preferences(),
        SystemClipboard::new().context("Failed to open clipboard for restoring")?,
    );

    let mut events = storage.subscribe();
    let mut lines = spawn_line_reader(BufReader::new(std::io::stdin()));
    let mut stdin_open = true;

    show(&mut presenter).await;
    info!("cliptext running. Press Ctrl+C to stop.");

    let watcher_task = watcher.run(wait_for_shutdown());
    tokio::pin!(watcher_task);

    loop {
        tokio::select! {
            // Watcher returns once a shutdown signal arrives
            _ = &mut watcher_task => {
                info!("Shutdown signal received");
                break;
            }

            event = events.recv() => match event {
                Ok(HistoryEvent::Upserted(outcome)) => {
                    debug!(
                        index = outcome.entry().sequence_index,
                        inserted = outcome.is_inserted(),
                        "History entry recorded"
                    );
                    show(&mut presenter).await;
                }
                Ok(_) => show(&mut presenter).await,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Missed history notifications");
                    show(&mut presenter).await;
                }
                Err(RecvError::Closed) => break,
            },

            line = lines.recv(), if stdin_open => match line {
                Some(Ok(line)) => {
                    if !handle_command(&mut presenter, &line).await {
                        break;
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Failed to read stdin, menu commands disabled");
                    stdin_open = false;
                }
                None => {
                    debug!("stdin closed, menu commands disabled");
                    stdin_open = false;
                }
            },
        }
    }

    info!("cliptext stopped");
    Ok(())
}

/// Applies one menu command line. Returns false when the user quits.
async fn handle_command(presenter: &mut Presenter<SystemClipboard>, line: &str) -> bool {
    let action = match line.parse::<MenuAction>() {
        Ok(action) => action,
        Err(e) => {
            eprintln!("{e}");
            return true;
        }
    };

    match presenter.apply(action).await {
        Response::Menu(menu) => print!("{}", menu.render()),
        Response::Restored(entry) => println!("Copied entry {}", entry.sequence_index),
        Response::Updated => {}
        Response::Nothing => {
            if let MenuAction::Restore(index) = action {
                eprintln!("Could not restore entry {index}");
            }
        }
        Response::Quit => return false,
    }
    true
}

/// Prints the current menu, if it can be loaded.
async fn show(presenter: &mut Presenter<SystemClipboard>) {
    if let Response::Menu(menu) = presenter.apply(MenuAction::Show).await {
        print!("{}", menu.render());
    }
}

/// Initializes the tracing subscriber.
///
/// Logs go to stderr so the menu on stdout stays readable.
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
