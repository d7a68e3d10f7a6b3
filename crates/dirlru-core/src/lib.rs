//! dirlru Core - shared state for the recent-directories daemon
//!
//! This crate holds the pieces that both the watcher and the query
//! server touch:
//! - The ignore filter deciding which directories are never watched
//! - The watch registry mapping OS watch handles to directory paths
//! - The bounded recency list of recently changed directories
//!
//! Registry and recency list live together in [`WatchState`] behind one
//! lock, so a query never sees a half-applied batch of events.
//!
//! # Example
//!
//! ```
//! use dirlru_core::{IgnoreFilter, RecencyList};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let filter = IgnoreFilter::new(["*/.git"]).unwrap();
//! assert!(filter.is_ignored(Path::new("/src/project/.git")));
//!
//! let mut recent = RecencyList::new();
//! recent.promote(Arc::from(Path::new("/src/project")));
//! assert_eq!(recent.len(), 1);
//! ```

pub mod error;
pub mod ignore;
pub mod recency;
pub mod registry;
pub mod state;

pub use error::{Result, WatchError};
pub use ignore::IgnoreFilter;
pub use recency::{RecencyList, HISTORY};
pub use registry::WatchRegistry;
pub use state::{Context, WatchState};
