//! Async reader for the inotify descriptor.
//!
//! Each successful read is returned as one batch; the processor applies a
//! batch under a single lock.

use crate::event::ChangeEvent;
use inotify::{Inotify, WatchDescriptor, Watches};
use std::io::{self, ErrorKind};
use tokio::io::unix::AsyncFd;

// Room for plenty of events plus one maximal name.
const BUFFER_SIZE: usize = 4096 + libc::PATH_MAX as usize;

pub struct EventSource {
    fd: AsyncFd<Inotify>,
    buffer: Vec<u8>,
}

impl EventSource {
    /// Opens a fresh inotify instance. The returned `Watches` adds watches
    /// to it. Must be called inside a tokio runtime.
    pub fn init() -> io::Result<(Self, Watches)> {
        let inotify = Inotify::init()?;
        let watches = inotify.watches();
        let source = Self {
            fd: AsyncFd::new(inotify)?,
            buffer: vec![0; BUFFER_SIZE],
        };
        Ok((source, watches))
    }

    /// Waits for the next batch of events.
    pub async fn next_batch(&mut self) -> io::Result<Vec<ChangeEvent<WatchDescriptor>>> {
        let Self { fd, buffer } = self;

        loop {
            let mut guard = fd.readable_mut().await?;
            match guard.try_io(|inner| read_batch(inner.get_mut(), &mut buffer[..])) {
                Ok(Ok(batch)) => return Ok(batch),
                Ok(Err(e)) if e.kind() == ErrorKind::Interrupted => continue,
                Ok(Err(e)) => return Err(e),
                Err(_would_block) => continue,
            }
        }
    }
}

fn read_batch(
    inotify: &mut Inotify,
    buffer: &mut [u8],
) -> io::Result<Vec<ChangeEvent<WatchDescriptor>>> {
    let batch: Vec<_> = inotify.read_events(buffer)?.map(ChangeEvent::from).collect();
    if batch.is_empty() {
        // Hand readiness back to tokio instead of spinning
        return Err(ErrorKind::WouldBlock.into());
    }
    Ok(batch)
}
