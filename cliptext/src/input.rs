//! Line-based menu input.
//!
//! Terminal reads block, and a blocking read parked on the runtime's blocking
//! pool keeps the runtime from shutting down until the user presses Enter.
//! [`spawn_line_reader`] therefore reads on its own detached thread and hands
//! lines to the async side through a channel. Dropping the receiver or
//! exiting the process never waits for a pending read.
//!
//! # Example
//!
//! ```no_run
//! use std::io::BufReader;
//! use cliptext::input::spawn_line_reader;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut lines = spawn_line_reader(BufReader::new(std::io::stdin()));
//!     while let Some(Ok(line)) = lines.recv().await {
//!         println!("got {line}");
//!     }
//! }
//! ```

use std::io::{self, BufRead};
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Lines buffered between the reader thread and its consumer.
pub const INPUT_CHANNEL_CAPACITY: usize = 16;

/// Reads lines from `reader` on a dedicated thread.
///
/// Each line (or the read error that ended input) is sent to the returned
/// receiver. The channel closes at end of input, after a read error, or if
/// the thread could not be started.
pub fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<io::Result<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);

    let spawned = thread::Builder::new()
        .name("cliptext-input".to_string())
        .spawn(move || {
            for line in reader.lines() {
                let failed = line.is_err();
                if tx.blocking_send(line).is_err() {
                    debug!("Input receiver dropped, stopping line reader");
                    return;
                }
                if failed {
                    break;
                }
            }
            debug!("Input closed");
        });

    if let Err(e) = spawned {
        warn!(error = %e, "Failed to start input thread, menu commands disabled");
    }

    rx
}
