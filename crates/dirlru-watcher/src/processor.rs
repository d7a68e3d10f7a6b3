//! Event processing.
//!
//! Every raw event either keeps the watch table honest (invalidations,
//! new subdirectories) or bumps its directory to the front of the
//! recency list. A whole batch is applied under one lock.

use crate::backend::WatchBackend;
use crate::event::ChangeEvent;
use crate::source::EventSource;
use crate::subscriber::watch_tree;
use dirlru_core::{Context, Result, WatchError, WatchState};
use inotify::WatchDescriptor;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::block_in_place;
use tracing::{debug, info};

/// Applies change events to the shared state.
pub struct EventProcessor<B: WatchBackend> {
    backend: B,
    ctx: Arc<Context<B::Handle>>,
}

impl<B: WatchBackend> EventProcessor<B> {
    pub fn new(backend: B, ctx: Arc<Context<B::Handle>>) -> Self {
        Self { backend, ctx }
    }

    pub fn context(&self) -> &Arc<Context<B::Handle>> {
        &self.ctx
    }

    /// Subscribes every configured root. Blocks on the state lock, so call
    /// it from a blocking thread.
    pub fn watch_roots(&mut self, roots: &[PathBuf]) -> Result<usize> {
        let ctx = Arc::clone(&self.ctx);
        let mut state = ctx.state.blocking_lock();

        let mut added = 0;
        for root in roots {
            added += watch_tree(&mut self.backend, &ctx.ignore, &mut state, root)?;
        }
        Ok(added)
    }

    /// Applies one batch of events read together from the stream.
    pub fn process_batch<I>(&mut self, state: &mut WatchState<B::Handle>, events: I) -> Result<()>
    where
        I: IntoIterator<Item = ChangeEvent<B::Handle>>,
    {
        for event in events {
            self.handle_event(state, event)?;
        }
        Ok(())
    }

    fn handle_event(
        &mut self,
        state: &mut WatchState<B::Handle>,
        event: ChangeEvent<B::Handle>,
    ) -> Result<()> {
        // Unknown handles belong to watches already torn down. Queue
        // overflows carry no handle at all and end up here too.
        let Some(dir) = state.registry.lookup(&event.handle) else {
            return Ok(());
        };

        if event.concerns_subdirectory() {
            match &event.name {
                Some(name) if event.is_new_subdirectory() => {
                    let child = dir.join(name);
                    let added = watch_tree(&mut self.backend, &self.ctx.ignore, state, &child)?;
                    debug!("Subscribed {} new directories under {}", added, child.display());
                }
                _ => {}
            }
            return Ok(());
        }

        if event.is_invalidation() {
            if let Some(path) = state.forget(&event.handle) {
                debug!("Watch on {} is gone", path.display());
            }
            return Ok(());
        }

        if !event.is_pure_access() {
            info!("{}", event.describe(&dir));
        }

        state.recent.promote(dir);
        Ok(())
    }
}

/// Drains the notification stream until `shutdown` flips to true.
///
/// A batch may walk a freshly created subtree, so batches run under
/// `block_in_place`; this needs the multi-threaded runtime.
pub async fn run<B>(
    mut processor: EventProcessor<B>,
    mut source: EventSource,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()>
where
    B: WatchBackend<Handle = WatchDescriptor>,
{
    let ctx = Arc::clone(processor.context());

    while !*shutdown.borrow() {
        tokio::select! {
            batch = source.next_batch() => {
                let batch = batch.map_err(WatchError::EventStream)?;
                let mut state = ctx.state.lock().await;
                block_in_place(|| processor.process_batch(&mut state, batch))?;
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    info!("Event processing stopped");
    Ok(())
}
