//! dirlru Server - hands out the recency list over a Unix socket
//!
//! The protocol is as small as it gets: connecting is the request, the
//! response is one directory per line, most recent first, and then the
//! server hangs up. An empty list is an empty response.
//!
//! The server supports:
//! - Concurrent connections, each served from a snapshot
//! - Clients that disconnect before the response is written
//! - Cooperative shutdown through a watch channel

mod client;
mod protocol;
mod server;

pub use client::query;
pub use protocol::{decode, encode};
pub use server::QueryServer;
