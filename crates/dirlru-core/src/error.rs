//! Error types for the daemon.
//!
//! Everything in here is fatal. Races the daemon is expected to lose
//! (a directory vanishing before we open it, a client hanging up early)
//! are handled where they happen and never become a `WatchError`.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience type for fallible daemon operations.
pub type Result<T> = std::result::Result<T, WatchError>;

/// Things that stop the daemon.
#[derive(Error, Debug)]
pub enum WatchError {
    /// A filesystem call failed in a way we don't tolerate.
    #[error("i/o error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An ignore pattern doesn't compile.
    #[error("invalid ignore pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// The ignore patterns compiled one by one but not as a set.
    #[error("failed to compile ignore patterns: {0}")]
    IgnoreSet(#[source] globset::Error),

    /// The ignore file exists but couldn't be read.
    #[error("failed to read ignore file '{path}': {source}")]
    IgnoreFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The kernel refused another watch. Raising
    /// `fs.inotify.max_user_watches` usually fixes this.
    #[error("watch limit reached while watching '{path}' (raise fs.inotify.max_user_watches)")]
    WatchLimit { path: PathBuf },

    /// Subscribing to a directory failed for an unexpected reason.
    #[error("failed to watch '{path}': {source}")]
    Subscribe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading from the notification stream failed.
    #[error("failed to read change events: {0}")]
    EventStream(#[source] std::io::Error),

    /// A default path needs the home directory and there isn't one.
    #[error("HOME is not set")]
    HomeNotSet,
}

impl WatchError {
    /// Creates an IO error with the path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
