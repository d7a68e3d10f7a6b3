//! Most-recently-changed directories.
//!
//! A tiny LRU: most recent first, no duplicates, oldest entry falls off
//! the end. Paths compare by their exact bytes as the subscriber built
//! them; nothing is normalized.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

/// Number of directories the daemon remembers.
pub const HISTORY: usize = 5;

#[derive(Debug, Clone)]
pub struct RecencyList {
    entries: VecDeque<Arc<Path>>,
    capacity: usize,
}

impl RecencyList {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Moves `path` to the front, inserting it if needed and evicting the
    /// least recent entry when full.
    pub fn promote(&mut self, path: Arc<Path>) {
        match self.position(&path) {
            Some(0) => {}
            Some(i) => {
                if let Some(entry) = self.entries.remove(i) {
                    self.entries.push_front(entry);
                }
            }
            None => {
                self.entries.push_front(path);
                self.entries.truncate(self.capacity);
            }
        }
    }

    /// Splices `path` out, keeping the others in order. Returns whether
    /// anything was removed.
    pub fn remove(&mut self, path: &Path) -> bool {
        match self.position(path) {
            Some(i) => self.entries.remove(i).is_some(),
            None => false,
        }
    }

    /// Copy of the list, most recent first.
    pub fn snapshot(&self) -> Vec<Arc<Path>> {
        self.entries.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|p| &**p)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // At most HISTORY entries, a scan beats any index.
    fn position(&self, path: &Path) -> Option<usize> {
        self.entries
            .iter()
            .position(|p| p.as_os_str() == path.as_os_str())
    }
}

impl Default for RecencyList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &str) -> Arc<Path> {
        Arc::from(Path::new(p))
    }

    fn listed(list: &RecencyList) -> Vec<&str> {
        list.iter().map(|p| p.to_str().unwrap()).collect()
    }

    #[test]
    fn test_promote_inserts_at_front() {
        let mut list = RecencyList::new();
        list.promote(path("/data/a"));
        list.promote(path("/data/b"));

        assert_eq!(listed(&list), ["/data/b", "/data/a"]);
    }

    #[test]
    fn test_promote_existing_moves_without_duplicating() {
        let mut list = RecencyList::new();
        list.promote(path("/data/a"));
        list.promote(path("/data/b"));
        list.promote(path("/data/a"));

        assert_eq!(listed(&list), ["/data/a", "/data/b"]);
    }

    #[test]
    fn test_promote_front_is_noop() {
        let mut list = RecencyList::new();
        list.promote(path("/x"));
        list.promote(path("/y"));
        list.promote(path("/y"));

        assert_eq!(listed(&list), ["/y", "/x"]);
    }

    #[test]
    fn test_overflow_evicts_least_recent() {
        let mut list = RecencyList::new();
        for i in 1..=6 {
            list.promote(path(&format!("/d{i}")));
        }

        assert_eq!(listed(&list), ["/d6", "/d5", "/d4", "/d3", "/d2"]);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut list = RecencyList::new();
        for p in ["/a", "/b", "/c", "/d"] {
            list.promote(path(p));
        }

        assert!(list.remove(Path::new("/c")));
        assert_eq!(listed(&list), ["/d", "/b", "/a"]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut list = RecencyList::new();
        list.promote(path("/a"));
        list.promote(path("/b"));

        assert!(!list.remove(Path::new("/zzz")));
        assert_eq!(listed(&list), ["/b", "/a"]);
    }

    #[test]
    fn test_no_normalization() {
        let mut list = RecencyList::new();
        list.promote(path("/a"));
        list.promote(path("/a/"));

        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_invariants_hold_for_long_sequences() {
        let mut list = RecencyList::new();
        // Deterministic pseudo-random walk over 9 directories
        let mut seed: u32 = 17;
        for _ in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let p = path(&format!("/dir{}", (seed >> 16) % 9));
            list.promote(p.clone());

            assert!(list.len() <= HISTORY);
            assert_eq!(list.iter().next(), Some(&*p));
            let mut seen: Vec<_> = list.iter().collect();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), list.len());
        }
    }
}
