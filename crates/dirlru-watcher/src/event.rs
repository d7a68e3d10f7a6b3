//! Raw change events.

use inotify::{Event, EventMask, WatchDescriptor};
use std::ffi::{OsStr, OsString};
use std::path::Path;

/// Kind labels in priority order. Several bits can be set at once and the
/// first listed one names the event.
const KINDS: [(EventMask, &str); 7] = [
    (EventMask::ATTRIB, "attrib"),
    (EventMask::CREATE, "create"),
    (EventMask::MODIFY, "modify"),
    (EventMask::MOVE_SELF, "move_self"),
    (EventMask::MOVED_TO, "moved_to"),
    (EventMask::OPEN, "open"),
    (EventMask::Q_OVERFLOW, "<overflow>"),
];

/// One event as read from the notification stream. Consumed right away,
/// never stored.
#[derive(Debug, Clone)]
pub struct ChangeEvent<H> {
    /// Watch that produced the event.
    pub handle: H,

    /// Condition flags.
    pub mask: EventMask,

    /// Entry inside the watched directory, if the event is about one.
    pub name: Option<OsString>,
}

impl<H> ChangeEvent<H> {
    pub fn new(handle: H, mask: EventMask) -> Self {
        Self {
            handle,
            mask,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<OsString>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The kernel dropped the watch (directory deleted, unmounted, ...).
    pub fn is_invalidation(&self) -> bool {
        self.mask.contains(EventMask::IGNORED)
    }

    /// The event is about a subdirectory of the watched directory. The
    /// subdirectory reports its own changes through its own watch.
    pub fn concerns_subdirectory(&self) -> bool {
        self.name.is_some() && self.mask.contains(EventMask::ISDIR)
    }

    /// A directory appeared inside the watched one, by mkdir or by a move.
    pub fn is_new_subdirectory(&self) -> bool {
        self.concerns_subdirectory()
            && self.mask.intersects(EventMask::CREATE | EventMask::MOVED_TO)
    }

    /// Only an access, nothing changed.
    pub fn is_pure_access(&self) -> bool {
        self.mask - EventMask::ISDIR == EventMask::ACCESS
    }

    /// Human readable kind for the diagnostic stream.
    pub fn kind(&self) -> &'static str {
        KINDS
            .iter()
            .find(|(flag, _)| self.mask.contains(*flag))
            .map_or("<unknown>", |(_, label)| *label)
    }

    /// One diagnostic line: mask in hex, kind, directory, then the child
    /// name or `(none)`.
    pub fn describe(&self, dir: &Path) -> String {
        format!(
            "{:08x} {} {} {}",
            self.mask.bits(),
            self.kind(),
            dir.display(),
            self.name
                .as_deref()
                .map_or_else(|| "(none)".into(), OsStr::to_string_lossy)
        )
    }
}

impl From<Event<&OsStr>> for ChangeEvent<WatchDescriptor> {
    fn from(event: Event<&OsStr>) -> Self {
        Self {
            handle: event.wd,
            mask: event.mask,
            name: event.name.map(OsStr::to_os_string),
        }
    }
}
