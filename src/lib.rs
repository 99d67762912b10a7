// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod watch;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::pipeline::{
    FsEventHandler, HashStore, Pipeline, PipelineOptions, DEFAULT_QUIET_PERIOD,
};
use crate::render::{ArtifactWriter, FsWriter, Renderer, SnippetRenderer, StreamWriter};
use crate::watch::{build_exclude_set, FileEvent, FileEventKind};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the event-handling pipeline (interactive pass)
/// - Ctrl-C handling
/// - the final production pass after watch mode ends
pub async fn run(args: CliArgs) -> Result<()> {
    if args.watch && args.file.is_some() {
        bail!("cannot watch a single file, remove the -f or --watch flag");
    }
    if args.stdout && args.file.is_none() {
        bail!("--stdout requires -f to name the file to generate code for");
    }

    let cfg = config::load(args.config.as_deref().map(Path::new))?;
    let excludes = build_exclude_set(&cfg.exclude)?;
    let workers = args.workers.or(cfg.workers).unwrap_or_else(default_workers);
    let quiet_period = cfg
        .quiet_period_ms
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_QUIET_PERIOD);

    let root = fs::canonicalize(&args.path)
        .with_context(|| format!("failed to resolve path {:?}", args.path))?;

    let renderer: Arc<dyn Renderer> = Arc::new(SnippetRenderer);
    let writer: Arc<dyn ArtifactWriter> = if args.stdout {
        Arc::new(StreamWriter::new(std::io::stdout()))
    } else {
        Arc::new(FsWriter)
    };
    let hashes = Arc::new(HashStore::default());

    // Single-file mode skips the channels and worker pool entirely.
    if let Some(file) = &args.file {
        let handler = FsEventHandler::new(&root, false, hashes, renderer, writer);
        let event = FileEvent {
            path: PathBuf::from(file),
            kind: FileEventKind::Create,
        };
        handler.handle(&event)?;
        return Ok(());
    }

    let start = Instant::now();

    let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
    if args.watch {
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "failed to listen for Ctrl-C");
                return;
            }
            let _ = cancel_tx.send(true);
        });
    } else {
        drop(cancel_tx);
    }

    let handler = Arc::new(FsEventHandler::new(
        &root,
        args.watch,
        Arc::clone(&hashes),
        Arc::clone(&renderer),
        Arc::clone(&writer),
    ));
    let options = PipelineOptions {
        root: root.clone(),
        watch: args.watch,
        workers,
        quiet_period,
        excludes: excludes.clone(),
    };
    let summary = Pipeline::new(options, handler).run(cancel_rx).await?;
    let mut updates = summary.updates;

    // After watch mode ends, reconcile whatever changed between the last
    // settle and shutdown with a fresh production pass. Fresh modtime store
    // and error registry, reset error count; only the hash store is carried
    // over so unchanged outputs are not rewritten.
    let summary = if args.watch {
        info!(
            errors = summary.errors,
            "watch ended, running walk again in production mode"
        );
        let handler = Arc::new(FsEventHandler::new(&root, false, hashes, renderer, writer));
        let options = PipelineOptions {
            root,
            watch: false,
            workers,
            quiet_period,
            excludes,
        };
        let (_cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
        let production = Pipeline::new(options, handler).run(cancel_rx).await?;
        updates += production.updates;
        production
    } else {
        summary
    };

    if summary.errors > 0 {
        bail!("generation completed with {} errors", summary.errors);
    }

    info!(updates, duration = ?start.elapsed(), "complete");
    Ok(())
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
