//! CLI command implementations.

use crate::config::{default_socket, DaemonConfig};
use colored::Colorize;
use dirlru_core::{Context, IgnoreFilter, WatchError};
use dirlru_server::QueryServer;
use dirlru_watcher::{EventProcessor, EventSource};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::info;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Run the daemon until SIGINT/SIGTERM or a fatal error.
pub async fn serve(config: DaemonConfig) -> Result<()> {
    let ignore = IgnoreFilter::load(&config.ignore_file, config.home.as_deref())?;
    info!(
        "Loaded {} ignore patterns from {}",
        ignore.len(),
        config.ignore_file.display()
    );

    let ctx = Arc::new(Context::new(ignore));
    let (source, watches) = EventSource::init()?;
    let mut processor = EventProcessor::new(watches, Arc::clone(&ctx));

    let roots = config.roots.clone();
    let (processor, added) = tokio::task::spawn_blocking(move || {
        let added = processor.watch_roots(&roots)?;
        Ok::<_, WatchError>((processor, added))
    })
    .await??;

    println!(
        "{} Watching {} directories under {} roots",
        "✓".green(),
        added.to_string().cyan(),
        config.roots.len()
    );

    let server = QueryServer::bind(&config.socket_path, Arc::clone(&ctx))?;
    println!(
        "{} Listening on {}",
        "✓".green(),
        server.socket_path().display()
    );
    println!("  Press {} to stop", "Ctrl+C".cyan());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut events = tokio::spawn(dirlru_watcher::run(processor, source, shutdown_rx.clone()));
    let mut queries = tokio::spawn(server.run(shutdown_rx));

    // Either task returning early means something fatal happened
    let (mut events_joined, mut queries_joined) = (false, false);
    let outcome: Result<()> = tokio::select! {
        signal = shutdown_signal() => signal.map_err(Into::into),
        joined = &mut events => {
            events_joined = true;
            flatten(joined)
        }
        joined = &mut queries => {
            queries_joined = true;
            flatten(joined)
        }
    };

    info!("Shutting down");
    let _ = shutdown_tx.send(true);
    let events_done = finish(events, events_joined).await;
    let queries_done = finish(queries, queries_joined).await;

    outcome.and(events_done).and(queries_done)
}

/// Ask a running daemon for its list.
pub async fn query(
    socket: Option<PathBuf>,
    home: Option<PathBuf>,
    relative: bool,
    json: bool,
) -> Result<()> {
    let socket = match socket {
        Some(socket) => socket,
        None => default_socket(home.as_deref())?,
    };

    let paths = dirlru_server::query(&socket)
        .await
        .map_err(|e| format!("cannot reach daemon at {}: {}", socket.display(), e))?;

    let base = if relative { home.as_deref() } else { None };
    let shown: Vec<String> = paths.iter().map(|p| display(p, base)).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
    } else {
        for path in shown {
            println!("{}", path);
        }
    }

    Ok(())
}

fn display(path: &Path, base: Option<&Path>) -> String {
    match base.and_then(|b| path.strip_prefix(b).ok()) {
        Some(rel) if !rel.as_os_str().is_empty() => rel.display().to_string(),
        _ => path.display().to_string(),
    }
}

async fn shutdown_signal() -> std::io::Result<()> {
    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res,
        _ = terminate.recv() => Ok(()),
    }
}

fn flatten<E>(joined: std::result::Result<std::result::Result<(), E>, JoinError>) -> Result<()>
where
    E: std::error::Error + 'static,
{
    joined?.map_err(Into::into)
}

/// Waits for a task unless `select!` already consumed its result.
async fn finish<E>(handle: JoinHandle<std::result::Result<(), E>>, joined: bool) -> Result<()>
where
    E: std::error::Error + 'static,
{
    if joined {
        return Ok(());
    }
    flatten(handle.await)
}
