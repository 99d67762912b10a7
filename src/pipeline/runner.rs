// src/pipeline/runner.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use globset::GlobSet;
use tokio::sync::mpsc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::errors::FatalError;
use crate::pipeline::handler::FsEventHandler;
use crate::pipeline::settle::{settle_loop, GenerationEvent, SettleHook};
use crate::watch::{spawn_watcher, walk_files, FileEvent};

/// Everything the pipeline needs to know about one pass.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub root: PathBuf,
    /// Keep a live watcher running after the initial walk.
    pub watch: bool,
    /// Worker pool size; admission is a semaphore of this many permits.
    pub workers: usize,
    pub quiet_period: Duration,
    pub excludes: GlobSet,
}

/// Aggregate result of one pipeline pass.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    /// Number of generation events (regenerations that changed something).
    pub updates: u64,
    /// Number of per-file errors encountered.
    pub errors: u64,
    pub duration: Duration,
}

/// One supervised pipeline pass: push phase (walk + optional watcher),
/// handle phase (bounded worker pool), and settle phase, connected by
/// channels and joined at the end.
///
/// A pass is single-use. The watch-to-production transition is modelled as
/// constructing a second `Pipeline` with a fresh handler rather than
/// mutating a live one.
pub struct Pipeline {
    options: PipelineOptions,
    handler: Arc<FsEventHandler>,
    on_settle: SettleHook,
}

impl Pipeline {
    pub fn new(options: PipelineOptions, handler: Arc<FsEventHandler>) -> Self {
        Self {
            options,
            handler,
            on_settle: Arc::new(|code_changed, text_changed| {
                info!(code_changed, text_changed, "generation settled");
            }),
        }
    }

    /// Replace the settle-time side effect. The default just logs.
    pub fn with_settle_hook(mut self, hook: SettleHook) -> Self {
        self.on_settle = hook;
        self
    }

    /// Run the pass to completion. In watch mode this returns only after
    /// `cancel` fires and all in-flight work has drained; otherwise it
    /// returns once the walk has been fully processed.
    pub async fn run(self, cancel: tokio::sync::watch::Receiver<bool>) -> Result<RunSummary> {
        let start = Instant::now();

        // The initial walk and the live watcher feed the same event channel.
        let (event_tx, event_rx) = mpsc::channel::<FileEvent>(64);
        let (result_tx, result_rx) = mpsc::channel::<GenerationEvent>(256);
        let (err_tx, mut err_rx) = mpsc::channel::<anyhow::Error>(64);

        let push = tokio::spawn(push_events(
            self.options.root.clone(),
            self.options.watch,
            self.options.excludes.clone(),
            event_tx,
            err_tx.clone(),
            cancel,
        ));
        let dispatch = tokio::spawn(dispatch_events(
            event_rx,
            Arc::clone(&self.handler),
            self.options.workers,
            result_tx,
            err_tx,
        ));
        let settle = tokio::spawn(settle_loop(
            result_rx,
            self.options.quiet_period,
            Arc::clone(&self.on_settle),
        ));

        // The error channel closes once the push and handle phases are done.
        // Fatal errors short-circuit; per-file errors are counted.
        let mut error_count: u64 = 0;
        let mut fatal: Option<anyhow::Error> = None;
        while let Some(err) = err_rx.recv().await {
            if err.downcast_ref::<FatalError>().is_some() {
                fatal = Some(err);
                break;
            }
            error!(error = ?err, "event handler failed");
            error_count += 1;
        }
        if let Some(err) = fatal {
            // Stop consuming per-file errors; workers then send into a closed
            // channel and carry on. Already-dispatched work still drains
            // before the run returns.
            drop(err_rx);
            let _ = push.await;
            let _ = dispatch.await;
            let _ = settle.await;
            return Err(err);
        }

        push.await.context("push task panicked")??;
        dispatch.await.context("dispatch task panicked")??;
        let updates = settle.await.context("settle task panicked")?;

        Ok(RunSummary {
            updates,
            errors: error_count,
            duration: start.elapsed(),
        })
    }
}

/// Push phase: full-tree walk, then (in watch mode) a live watcher until
/// cancellation. Dropping the returned senders is what lets the downstream
/// phases finish.
async fn push_events(
    root: PathBuf,
    watch_mode: bool,
    excludes: GlobSet,
    events_tx: mpsc::Sender<FileEvent>,
    errs_tx: mpsc::Sender<anyhow::Error>,
    mut cancel: tokio::sync::watch::Receiver<bool>,
) -> Result<()> {
    debug!(path = %root.display(), watch = watch_mode, "walking directory");
    if let Err(err) = walk_files(&root, &excludes, &events_tx).await {
        let _ = errs_tx
            .send(FatalError::wrap(err.context("failed to walk files")))
            .await;
        return Ok(());
    }

    if !watch_mode {
        return Ok(());
    }

    let handle = match spawn_watcher(root, excludes, events_tx.clone()) {
        Ok(handle) => handle,
        Err(err) => {
            let _ = errs_tx
                .send(FatalError::wrap(
                    err.context("failed to set up recursive watcher"),
                ))
                .await;
            return Ok(());
        }
    };

    info!("watching files");
    // An Err here means the cancel sender was dropped; treat as cancelled.
    let _ = cancel.changed().await;
    debug!("watch cancelled, closing watcher");
    drop(handle);
    Ok(())
}

/// Handle phase: fan events out to a semaphore-bounded worker pool.
/// Acquisition blocks this dispatch loop, never the event producers, which
/// gives backpressure without dropping events.
async fn dispatch_events(
    mut events_rx: mpsc::Receiver<FileEvent>,
    handler: Arc<FsEventHandler>,
    workers: usize,
    results_tx: mpsc::Sender<GenerationEvent>,
    errs_tx: mpsc::Sender<anyhow::Error>,
) -> Result<()> {
    debug!(workers, "starting event handler");
    let sem = Arc::new(Semaphore::new(workers));
    let mut inflight = JoinSet::new();

    while let Some(event) = events_rx.recv().await {
        let permit = Arc::clone(&sem)
            .acquire_owned()
            .await
            .context("worker semaphore closed")?;
        let handler = Arc::clone(&handler);
        let results_tx = results_tx.clone();
        let errs_tx = errs_tx.clone();
        inflight.spawn(async move {
            let _permit = permit;
            debug!(file = %event.path.display(), "processing file");
            match handler.handle(&event) {
                Ok(outcome) => {
                    if outcome.code_changed || outcome.text_changed {
                        let _ = results_tx
                            .send(GenerationEvent {
                                source: event,
                                code_changed: outcome.code_changed,
                                text_changed: outcome.text_changed,
                            })
                            .await;
                    }
                }
                Err(err) => {
                    let _ = errs_tx.send(err).await;
                }
            }
        });
        // Reap already-finished workers so the set does not grow unbounded.
        while inflight.try_join_next().is_some() {}
    }

    // Wait for all in-flight events to be processed before closing.
    while inflight.join_next().await.is_some() {}
    Ok(())
}
