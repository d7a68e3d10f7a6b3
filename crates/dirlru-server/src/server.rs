//! Unix socket server.

use crate::protocol::encode;
use dirlru_core::Context;
use std::fmt::Debug;
use std::fs;
use std::hash::Hash;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::watch;
use tracing::{debug, info};

/// Answers every connection with the current recency list.
pub struct QueryServer<H> {
    listener: UnixListener,
    socket_path: PathBuf,
    ctx: Arc<Context<H>>,
}

impl<H> QueryServer<H>
where
    H: Eq + Hash + Debug + Send + 'static,
{
    /// Binds the socket, replacing a stale one left by an earlier run.
    pub fn bind(socket_path: impl Into<PathBuf>, ctx: Arc<Context<H>>) -> io::Result<Self> {
        let socket_path = socket_path.into();
        match fs::remove_file(&socket_path) {
            Ok(()) => debug!("Removed stale socket {}", socket_path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        let listener = UnixListener::bind(&socket_path)?;
        info!("Listening on {}", socket_path.display());

        Ok(Self {
            listener,
            socket_path,
            ctx,
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Serves connections until `shutdown` flips to true, then removes the
    /// socket file.
    ///
    /// Running out of descriptors while accepting is fatal and returned
    /// as an error.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> io::Result<()> {
        let Self {
            listener,
            socket_path,
            ctx,
        } = self;

        while !*shutdown.borrow() {
            tokio::select! {
                accepted = listener.accept() => {
                    let stream = match accepted {
                        Ok((stream, _addr)) => stream,
                        Err(e) if matches!(e.kind(), ErrorKind::ConnectionAborted | ErrorKind::Interrupted) => {
                            debug!("Accept failed: {}", e);
                            continue;
                        }
                        Err(e) => return Err(e),
                    };

                    let ctx = Arc::clone(&ctx);
                    tokio::spawn(async move {
                        respond(stream, &ctx).await;
                    });
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        drop(listener);
        if let Err(e) = fs::remove_file(&socket_path) {
            debug!("Could not remove {}: {}", socket_path.display(), e);
        }
        info!("Query server stopped");
        Ok(())
    }
}

/// Writes the snapshot and hangs up. A client that left early is not our
/// problem.
async fn respond<H>(mut stream: UnixStream, ctx: &Context<H>)
where
    H: Eq + Hash + Debug,
{
    let payload = encode(&ctx.recent().await);

    if let Err(e) = stream.write_all(&payload).await {
        debug!("Client went away: {}", e);
        return;
    }
    let _ = stream.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::query;
    use dirlru_core::IgnoreFilter;
    use tokio::io::AsyncReadExt;
    use tokio::task::JoinHandle;
    use tempfile::tempdir;

    struct Running {
        ctx: Arc<Context<u32>>,
        shutdown: watch::Sender<bool>,
        handle: JoinHandle<io::Result<()>>,
    }

    fn start(socket: &Path) -> Running {
        let ctx = Arc::new(Context::new(IgnoreFilter::default()));
        let server = QueryServer::bind(socket, Arc::clone(&ctx)).unwrap();
        let (shutdown, rx) = watch::channel(false);
        let handle = tokio::spawn(server.run(rx));
        Running {
            ctx,
            shutdown,
            handle,
        }
    }

    #[tokio::test]
    async fn test_empty_list_is_an_empty_response() {
        let dir = tempdir().unwrap();
        let socket = dir.path().join("sock");
        let _server = start(&socket);

        let mut stream = UnixStream::connect(&socket).await.unwrap();
        let mut buf = Vec::new();
        let read = stream.read_to_end(&mut buf).await.unwrap();

        assert_eq!(read, 0);
    }

    #[tokio::test]
    async fn test_response_lists_most_recent_first() {
        let dir = tempdir().unwrap();
        let socket = dir.path().join("sock");
        let server = start(&socket);

        {
            let mut state = server.ctx.state.lock().await;
            for p in ["/data/b", "/data/a"] {
                state.recent.promote(Arc::from(Path::new(p)));
            }
        }

        let mut stream = UnixStream::connect(&socket).await.unwrap();
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"/data/a\n/data/b\n");

        let paths = query(&socket).await.unwrap();
        assert_eq!(paths, [PathBuf::from("/data/a"), PathBuf::from("/data/b")]);
    }

    #[tokio::test]
    async fn test_client_hanging_up_early_is_harmless() {
        let dir = tempdir().unwrap();
        let socket = dir.path().join("sock");
        let server = start(&socket);
        server
            .ctx
            .state
            .lock()
            .await
            .recent
            .promote(Arc::from(Path::new("/data/a")));

        for _ in 0..10 {
            drop(UnixStream::connect(&socket).await.unwrap());
        }

        let paths = query(&socket).await.unwrap();
        assert_eq!(paths, [PathBuf::from("/data/a")]);
    }

    #[tokio::test]
    async fn test_stale_socket_is_replaced() {
        let dir = tempdir().unwrap();
        let socket = dir.path().join("sock");
        fs::write(&socket, "left over").unwrap();

        let _server = start(&socket);

        assert!(query(&socket).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_removes_socket() {
        let dir = tempdir().unwrap();
        let socket = dir.path().join("sock");
        let server = start(&socket);

        server.shutdown.send(true).unwrap();
        server.handle.await.unwrap().unwrap();

        assert!(!socket.exists());
        assert!(query(&socket).await.is_err());
    }
}
