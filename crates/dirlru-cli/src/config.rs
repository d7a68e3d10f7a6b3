//! Daemon configuration.
//!
//! Command-line values win, then environment (handled by clap), then
//! defaults under the home directory.

use dirlru_core::{Result, WatchError};
use std::path::{Path, PathBuf};

const SOCKET_NAME: &str = ".watchsock";
const IGNORE_FILE_NAME: &str = ".watch-ignore";
const EXTRA_ROOTS: &[&str] = &["/media"];

/// Everything `serve` needs to know before it starts watching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Absolute roots to watch recursively.
    pub roots: Vec<PathBuf>,

    /// Where queries are answered.
    pub socket_path: PathBuf,

    /// Glob patterns of directories never to watch.
    pub ignore_file: PathBuf,

    /// Used for `~` in ignore patterns.
    pub home: Option<PathBuf>,
}

impl DaemonConfig {
    /// Fills in defaults. Fails with [`WatchError::HomeNotSet`] only when a
    /// default is needed and there is no home directory.
    pub fn resolve(
        roots: Vec<PathBuf>,
        socket: Option<PathBuf>,
        ignore_file: Option<PathBuf>,
        home: Option<PathBuf>,
    ) -> Result<Self> {
        let roots = if roots.is_empty() {
            let home = home.clone().ok_or(WatchError::HomeNotSet)?;
            std::iter::once(home)
                .chain(EXTRA_ROOTS.iter().map(PathBuf::from))
                .collect()
        } else {
            roots
                .into_iter()
                .map(|root| absolute(&root))
                .collect::<Result<_>>()?
        };

        let socket_path = match socket {
            Some(socket) => socket,
            None => default_socket(home.as_deref())?,
        };

        let ignore_file = match ignore_file {
            Some(file) => file,
            None => home
                .as_deref()
                .ok_or(WatchError::HomeNotSet)?
                .join(IGNORE_FILE_NAME),
        };

        Ok(Self {
            roots,
            socket_path,
            ignore_file,
            home,
        })
    }
}

/// `~/.watchsock`
pub fn default_socket(home: Option<&Path>) -> Result<PathBuf> {
    home.map(|h| h.join(SOCKET_NAME))
        .ok_or(WatchError::HomeNotSet)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| WatchError::io(path, e))?;
    Ok(cwd.join(path))
}
