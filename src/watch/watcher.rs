// src/watch/watcher.rs

use std::path::PathBuf;

use anyhow::Result;
use globset::GlobSet;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::watch::filter;
use crate::watch::{FileEvent, FileEventKind};

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive
/// for as long as needed. Dropping this handle closes the watcher, which in
/// turn ends the forwarding task and releases its event-channel sender.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher that observes `root` recursively and forwards
/// every file change as a [`FileEvent`] into `events_tx`.
///
/// Relevance filtering is deliberately left to the event handler; only the
/// configured exclude globs are applied here. Setup failures are returned to
/// the caller and are fatal to the run.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    excludes: GlobSet,
    events_tx: mpsc::Sender<FileEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or_else(|_| root.clone()); // best-effort

    // Channel from the blocking notify callback into the async world.
    let (notify_tx, mut notify_rx) = mpsc::unbounded_channel::<Event>();

    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = notify_tx.send(event) {
                    // We can't log via tracing here easily, so fallback to stderr.
                    eprintln!("snipgen: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("snipgen: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!("file watcher started on {:?}", root);

    // Async task that consumes notify events and forwards them to the pipeline.
    tokio::spawn(async move {
        while let Some(event) = notify_rx.recv().await {
            debug!("received notify event: {:?}", event);

            let kind = match event.kind {
                EventKind::Create(_) => FileEventKind::Create,
                EventKind::Modify(_) => FileEventKind::Write,
                EventKind::Remove(_) => FileEventKind::Remove,
                _ => continue,
            };

            for path in event.paths {
                if let Some(rel) = filter::relative_str(&root, &path) {
                    if filter::in_skipped_dir(&rel) || excludes.is_match(&rel) {
                        debug!(path = %rel, "excluded from watch");
                        continue;
                    }
                }
                if let Err(err) = events_tx.send(FileEvent { path, kind }).await {
                    warn!("failed to forward file event: {err}");
                    // If the pipeline channel is closed, there's no point
                    // keeping the watcher loop alive.
                    return;
                }
            }
        }

        debug!("file watcher loop ended");
    });

    Ok(WatcherHandle { _inner: watcher })
}
