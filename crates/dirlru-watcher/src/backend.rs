//! The notification subsystem, seen from the subscriber.

use inotify::{WatchDescriptor, WatchMask, Watches};
use std::fmt::Debug;
use std::hash::Hash;
use std::io;
use std::path::Path;

/// Something that can put a watch on a directory and hand back a handle.
pub trait WatchBackend {
    type Handle: Clone + Eq + Hash + Debug;

    /// Subscribes `path` with [`watch_mask`].
    fn add_watch(&mut self, path: &Path) -> io::Result<Self::Handle>;
}

/// Conditions subscribed on every directory.
///
/// Symlinks are never followed and unlinked children stop reporting.
pub fn watch_mask() -> WatchMask {
    WatchMask::ACCESS
        | WatchMask::ATTRIB
        | WatchMask::CREATE
        | WatchMask::MODIFY
        | WatchMask::MOVE_SELF
        | WatchMask::MOVED_TO
        | WatchMask::OPEN
        | WatchMask::DONT_FOLLOW
        | WatchMask::EXCL_UNLINK
}

impl WatchBackend for Watches {
    type Handle = WatchDescriptor;

    fn add_watch(&mut self, path: &Path) -> io::Result<WatchDescriptor> {
        self.add(path, watch_mask())
    }
}
