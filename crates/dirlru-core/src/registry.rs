//! Watch handle to path mapping.
//!
//! The kernel hands out a handle per watched directory and reuses it once
//! the watch is gone, so entries must be dropped as soon as the kernel says
//! a watch is invalid. Handles are sparse, hence the map.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::path::Path;
use std::sync::Arc;

/// Owns the path of every live watch.
///
/// Paths are handed out as `Arc<Path>` so the recency list can point at
/// the same allocation instead of keeping a copy.
#[derive(Debug)]
pub struct WatchRegistry<H> {
    paths: HashMap<H, Arc<Path>>,
}

impl<H> WatchRegistry<H>
where
    H: Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self {
            paths: HashMap::new(),
        }
    }

    /// Records `path` under `handle`.
    ///
    /// Returns the path previously stored under the same handle, which
    /// happens when a directory is subscribed twice and the kernel hands
    /// back its existing watch.
    pub fn register(&mut self, handle: H, path: Arc<Path>) -> Option<Arc<Path>> {
        self.paths.insert(handle, path)
    }

    /// Looks up the path for a handle. Unknown handles are normal: events
    /// keep arriving for a short while after a watch is torn down.
    pub fn lookup(&self, handle: &H) -> Option<Arc<Path>> {
        self.paths.get(handle).cloned()
    }

    /// Removes and returns the entry for a handle the kernel invalidated.
    pub fn invalidate(&mut self, handle: &H) -> Option<Arc<Path>> {
        self.paths.remove(handle)
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.paths
            .values()
            .any(|p| p.as_os_str() == path.as_os_str())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<H> Default for WatchRegistry<H>
where
    H: Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
