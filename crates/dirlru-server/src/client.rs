//! Client side of the protocol.

use crate::protocol::decode;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tokio::net::UnixStream;

/// Connects to a running daemon and reads its recency list.
pub async fn query(socket_path: &Path) -> io::Result<Vec<PathBuf>> {
    let mut stream = UnixStream::connect(socket_path).await?;
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await?;
    Ok(decode(&response))
}
