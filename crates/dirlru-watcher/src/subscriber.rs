//! Recursive subscription.
//!
//! Walks a tree and puts a watch on every directory that isn't ignored.
//! Directories disappear and change permissions while we walk; those
//! subtrees are skipped quietly. Anything else, running out of watches
//! in particular, stops the daemon: partial coverage is worse than none.
//!
//! A directory renamed inside the tree keeps its watch, and the kernel
//! hands the same handle back when the new path is subscribed. The old
//! path is then dropped from the recency list along with the registry.

use crate::backend::WatchBackend;
use dirlru_core::{IgnoreFilter, Result, WatchError, WatchState};
use std::io::{self, ErrorKind};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use walkdir::WalkDir;

/// Subscribes `root` and every directory below it, returning how many
/// watches were added.
///
/// Symlinks are not followed. Ignored directories are pruned together
/// with everything beneath them. A missing or unreadable root is not an
/// error.
pub fn watch_tree<B: WatchBackend>(
    backend: &mut B,
    ignore: &IgnoreFilter,
    state: &mut WatchState<B::Handle>,
    root: &Path,
) -> Result<usize> {
    let mut added = 0;
    let mut walk = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_type().is_dir() && !ignore.is_ignored(entry.path()));

    while let Some(entry) = walk.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.io_error().is_some_and(vanished) => {
                debug!("Skipping {}: {}", err.path().unwrap_or(root).display(), err);
                continue;
            }
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                return Err(WatchError::io(path, io::Error::from(err)));
            }
        };

        let path: Arc<Path> = Arc::from(entry.path());
        match backend.add_watch(&path) {
            Ok(handle) => {
                debug!("{:?}: {}", handle, path.display());
                if let Some(old) = state.registry.register(handle, Arc::clone(&path)) {
                    if old.as_os_str() != path.as_os_str() {
                        debug!("{} is now {}", old.display(), path.display());
                        state.recent.remove(&old);
                    }
                }
                added += 1;
            }
            Err(e) if vanished(&e) => {
                debug!("Skipping {}: {}", path.display(), e);
                walk.skip_current_dir();
            }
            Err(e) if e.raw_os_error() == Some(libc::ENOSPC) => {
                return Err(WatchError::WatchLimit {
                    path: path.to_path_buf(),
                })
            }
            Err(source) => {
                return Err(WatchError::Subscribe {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    Ok(added)
}

fn vanished(e: &io::Error) -> bool {
    matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied)
}
