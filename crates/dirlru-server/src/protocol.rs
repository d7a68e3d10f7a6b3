//! Wire format.
//!
//! Server to client only: each path's raw bytes followed by `\n`. Paths
//! are written byte for byte, so non UTF-8 names survive the trip.

use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// Serializes paths, one per line.
pub fn encode<P: AsRef<Path>>(paths: &[P]) -> Vec<u8> {
    let len = paths
        .iter()
        .map(|p| p.as_ref().as_os_str().len() + 1)
        .sum();
    let mut out = Vec::with_capacity(len);
    for path in paths {
        out.extend_from_slice(path.as_ref().as_os_str().as_bytes());
        out.push(b'\n');
    }
    out
}

/// Parses a response back into paths.
pub fn decode(bytes: &[u8]) -> Vec<PathBuf> {
    bytes
        .split(|b| *b == b'\n')
        .filter(|line| !line.is_empty())
        .map(|line| PathBuf::from(OsStr::from_bytes(line)))
        .collect()
}
