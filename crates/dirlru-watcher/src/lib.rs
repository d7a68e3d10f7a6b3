//! dirlru Watcher - keeps watches on whole directory trees
//!
//! This crate talks to the kernel:
//! - Walking directory trees and subscribing every directory
//! - Reading batches of raw change events from inotify
//! - Turning those events into registry and recency updates
//!
//! Newly created subdirectories are subscribed as soon as their creation
//! event is seen, so coverage follows the tree as it grows.

mod backend;
mod event;
mod processor;
mod source;
mod subscriber;

pub use backend::{watch_mask, WatchBackend};
pub use event::ChangeEvent;
pub use processor::{run, EventProcessor};
pub use source::EventSource;
pub use subscriber::watch_tree;
