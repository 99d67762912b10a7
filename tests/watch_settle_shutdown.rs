mod common;

use std::error::Error;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tempfile::tempdir;

use common::CountingWriter;
use snipgen::pipeline::{
    generated_path, FsEventHandler, HashStore, Pipeline, PipelineOptions, SettleHook,
};
use snipgen::render::{ArtifactWriter, FsWriter, Renderer, SnippetRenderer};
use snipgen::watch::build_exclude_set;

type TestResult = Result<(), Box<dyn Error>>;

/// End-to-end watch mode: rapid edits inside the debounce window coalesce
/// into a single settle, and shutdown runs one production reconciliation
/// walk that rewrites nothing when the tree is already up to date.
#[tokio::test(flavor = "multi_thread")]
async fn watch_coalesces_edits_and_reconciles_on_shutdown() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path().canonicalize()?;
    let source = root.join("demo.code.rs");
    fs::write(&source, "let a = 0;")?;

    let hashes = Arc::new(HashStore::default());
    let settles = Arc::new(AtomicUsize::new(0));
    let hook: SettleHook = {
        let settles = Arc::clone(&settles);
        Arc::new(move |_, _| {
            settles.fetch_add(1, Ordering::SeqCst);
        })
    };

    let handler = Arc::new(FsEventHandler::new(
        &root,
        true,
        Arc::clone(&hashes),
        Arc::new(SnippetRenderer) as Arc<dyn Renderer>,
        Arc::new(FsWriter) as Arc<dyn ArtifactWriter>,
    ));
    let options = PipelineOptions {
        root: root.clone(),
        watch: true,
        workers: 2,
        quiet_period: Duration::from_millis(250),
        excludes: build_exclude_set(&[])?,
    };
    let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
    let watch_run = tokio::spawn(
        Pipeline::new(options, handler)
            .with_settle_hook(hook)
            .run(cancel_rx),
    );

    // Initial walk regenerates the seed file and settles once.
    tokio::time::sleep(Duration::from_millis(800)).await;
    assert_eq!(settles.load(Ordering::SeqCst), 1, "initial walk settle");

    // A burst of edits inside the quiet period coalesces into one settle.
    for i in 1..=5 {
        fs::write(&source, format!("let a = {i};"))?;
        tokio::time::sleep(Duration::from_millis(30)).await;
    }
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(settles.load(Ordering::SeqCst), 2, "edit burst settle");

    cancel_tx.send(true)?;
    let summary = watch_run.await??;
    assert_eq!(summary.errors, 0);

    // Production reconciliation: fresh handler, shared hash store. The last
    // watched state is already on disk, so nothing is rewritten.
    let writer = Arc::new(CountingWriter::default());
    let handler = Arc::new(FsEventHandler::new(
        &root,
        false,
        hashes,
        Arc::new(SnippetRenderer) as Arc<dyn Renderer>,
        writer.clone() as Arc<dyn ArtifactWriter>,
    ));
    let options = PipelineOptions {
        root: root.clone(),
        watch: false,
        workers: 2,
        quiet_period: Duration::from_millis(100),
        excludes: build_exclude_set(&[])?,
    };
    let (_cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
    let production = Pipeline::new(options, handler).run(cancel_rx).await?;

    assert_eq!(production.errors, 0);
    assert_eq!(production.updates, 0, "no changes between last settle and shutdown");
    assert_eq!(writer.writes(), 0);

    let generated = fs::read_to_string(generated_path(&source))?;
    assert!(generated.contains("let a = 5;"));
    Ok(())
}
