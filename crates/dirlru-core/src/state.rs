//! Shared daemon state.

use crate::ignore::IgnoreFilter;
use crate::recency::RecencyList;
use crate::registry::WatchRegistry;
use std::fmt::Debug;
use std::hash::Hash;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Registry and recency list, always mutated together.
///
/// Every path in `recent` is also owned by `registry`; [`forget`]
/// drops both sides at once.
///
/// [`forget`]: WatchState::forget
#[derive(Debug)]
pub struct WatchState<H> {
    pub registry: WatchRegistry<H>,
    pub recent: RecencyList,
}

impl<H> WatchState<H>
where
    H: Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self {
            registry: WatchRegistry::new(),
            recent: RecencyList::new(),
        }
    }

    /// Drops an invalidated watch and its recency entry, if any.
    pub fn forget(&mut self, handle: &H) -> Option<Arc<Path>> {
        let path = self.registry.invalidate(handle)?;
        self.recent.remove(&path);
        Some(path)
    }
}

impl<H> Default for WatchState<H>
where
    H: Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the event processor and the query server share.
///
/// The ignore filter is fixed at startup; the rest sits behind a single
/// lock so queries see whole batches only.
#[derive(Debug)]
pub struct Context<H> {
    pub ignore: IgnoreFilter,
    pub state: Mutex<WatchState<H>>,
}

impl<H> Context<H>
where
    H: Eq + Hash + Debug,
{
    pub fn new(ignore: IgnoreFilter) -> Self {
        Self {
            ignore,
            state: Mutex::new(WatchState::new()),
        }
    }

    /// Current recency list, most recent first.
    pub async fn recent(&self) -> Vec<Arc<Path>> {
        self.state.lock().await.recent.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &str) -> Arc<Path> {
        Arc::from(Path::new(p))
    }

    #[test]
    fn test_forget_removes_exactly_one_path() {
        let mut state = WatchState::new();
        state.registry.register(1, path("/data/a"));
        state.registry.register(2, path("/data/b"));
        state.registry.register(3, path("/data/c"));
        for p in ["/data/a", "/data/b", "/data/c"] {
            state.recent.promote(path(p));
        }

        let removed = state.forget(&2);

        assert_eq!(removed.as_deref(), Some(Path::new("/data/b")));
        assert_eq!(state.registry.len(), 2);
        let recent: Vec<_> = state.recent.iter().collect();
        assert_eq!(recent, [Path::new("/data/c"), Path::new("/data/a")]);
    }

    #[test]
    fn test_forget_path_not_in_recency_list() {
        let mut state = WatchState::new();
        state.registry.register(1, path("/quiet"));
        state.recent.promote(path("/busy"));

        assert!(state.forget(&1).is_some());
        assert_eq!(state.recent.len(), 1);
    }

    #[test]
    fn test_forget_unknown_handle() {
        let mut state: WatchState<i32> = WatchState::new();
        state.recent.promote(path("/busy"));

        assert!(state.forget(&9).is_none());
        assert_eq!(state.recent.len(), 1);
    }

    #[tokio::test]
    async fn test_context_snapshot() {
        let ctx: Context<i32> = Context::new(IgnoreFilter::default());
        assert!(ctx.recent().await.is_empty());

        ctx.state.lock().await.recent.promote(path("/data/a"));
        let recent = ctx.recent().await;
        assert_eq!(recent.len(), 1);
        assert_eq!(&*recent[0], Path::new("/data/a"));
    }
}
