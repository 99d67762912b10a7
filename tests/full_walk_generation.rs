mod common;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::tempdir;

use common::{CountingRenderer, CountingWriter};
use snipgen::errors::FatalError;
use snipgen::pipeline::{
    generated_path, FsEventHandler, HashStore, Pipeline, PipelineOptions, RunSummary,
};
use snipgen::render::{ArtifactWriter, FsWriter, Renderer, SnippetRenderer};
use snipgen::watch::{build_exclude_set, TEXT_ARTIFACT_NAME};

type TestResult = Result<(), Box<dyn Error>>;

async fn run_pass(
    root: &Path,
    hashes: Arc<HashStore>,
    renderer: Arc<dyn Renderer>,
    writer: Arc<dyn ArtifactWriter>,
) -> anyhow::Result<RunSummary> {
    let handler = Arc::new(FsEventHandler::new(root, false, hashes, renderer, writer));
    let options = PipelineOptions {
        root: root.to_path_buf(),
        watch: false,
        workers: 4,
        quiet_period: Duration::from_millis(50),
        excludes: build_exclude_set(&[])?,
    };
    let (_cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
    Pipeline::new(options, handler).run(cancel_rx).await
}

#[tokio::test]
async fn full_walk_regenerates_changed_files_and_dedups_identical_output() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path().canonicalize()?;
    let source = root.join("hello.code.rs");
    fs::write(&source, "fn main() {}")?;
    fs::write(root.join("readme.md"), "not a snippet")?;

    let hashes = Arc::new(HashStore::default());

    // First walk: exactly one output write, zero errors.
    let summary = run_pass(
        &root,
        Arc::clone(&hashes),
        Arc::new(SnippetRenderer),
        Arc::new(FsWriter),
    )
    .await?;
    assert_eq!(summary.errors, 0);
    assert_eq!(summary.updates, 1);

    let target = generated_path(&source);
    let generated = fs::read_to_string(&target)?;
    assert!(generated.contains("fn main() {}"));
    assert!(generated.contains("HELLO_RS"));
    assert_eq!(
        fs::read_to_string(root.join(TEXT_ARTIFACT_NAME))?,
        "fn main() {}"
    );
    assert!(!root.join("readme.md_gen.rs").exists());

    // Different content: a second write with a different hash.
    std::thread::sleep(Duration::from_millis(20));
    fs::write(&source, "fn main() { run(); }")?;
    let summary = run_pass(
        &root,
        Arc::clone(&hashes),
        Arc::new(SnippetRenderer),
        Arc::new(FsWriter),
    )
    .await?;
    assert_eq!(summary.errors, 0);
    assert_eq!(summary.updates, 1);
    assert!(fs::read_to_string(&target)?.contains("fn main() { run(); }"));

    // Byte-identical content with a newer modification time: regeneration
    // triggers, but the dedup store suppresses the write.
    std::thread::sleep(Duration::from_millis(20));
    fs::write(&source, "fn main() { run(); }")?;
    let renderer = Arc::new(CountingRenderer::default());
    let writer = Arc::new(CountingWriter::default());
    let summary = run_pass(&root, hashes, renderer.clone(), writer.clone()).await?;
    assert_eq!(summary.errors, 0);
    assert_eq!(summary.updates, 0);
    assert_eq!(renderer.calls(), 1, "the renderer still runs");
    assert_eq!(writer.writes(), 0, "the artifact is not rewritten");
    Ok(())
}

#[tokio::test]
async fn per_file_errors_are_counted_without_stopping_other_files() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path().canonicalize()?;
    fs::write(root.join("good.code.rs"), "fn ok() {}")?;
    // Invalid UTF-8 makes the built-in renderer fail for this file only.
    fs::write(root.join("bad.code.rs"), [0xff, 0xfe, 0x00])?;

    let summary = run_pass(
        &root,
        Arc::new(HashStore::default()),
        Arc::new(SnippetRenderer),
        Arc::new(FsWriter),
    )
    .await?;

    assert_eq!(summary.errors, 1);
    assert!(generated_path(&root.join("good.code.rs")).exists());
    assert!(!generated_path(&root.join("bad.code.rs")).exists());
    Ok(())
}

#[tokio::test]
async fn target_directories_are_skipped_without_configuration() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path().canonicalize()?;
    fs::create_dir(root.join("target"))?;
    fs::write(root.join("target").join("dep.code.rs"), "fn dep() {}")?;
    fs::create_dir(root.join(".cache"))?;
    fs::write(root.join(".cache").join("stale.code.rs"), "fn stale() {}")?;
    fs::write(root.join("app.code.rs"), "fn app() {}")?;

    let summary = run_pass(
        &root,
        Arc::new(HashStore::default()),
        Arc::new(SnippetRenderer),
        Arc::new(FsWriter),
    )
    .await?;

    assert_eq!(summary.errors, 0);
    assert!(generated_path(&root.join("app.code.rs")).exists());
    assert!(!generated_path(&root.join("target").join("dep.code.rs")).exists());
    assert!(!generated_path(&root.join(".cache").join("stale.code.rs")).exists());
    Ok(())
}

#[tokio::test]
async fn missing_root_aborts_the_run_with_a_fatal_error() -> TestResult {
    let root = PathBuf::from("/no/such/snipgen/root");
    let handler = Arc::new(FsEventHandler::new(
        &root,
        false,
        Arc::new(HashStore::default()),
        Arc::new(SnippetRenderer) as Arc<dyn Renderer>,
        Arc::new(FsWriter) as Arc<dyn ArtifactWriter>,
    ));
    let options = PipelineOptions {
        root: root.clone(),
        watch: false,
        workers: 2,
        quiet_period: Duration::from_millis(50),
        excludes: build_exclude_set(&[])?,
    };
    let (_cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);

    let err = Pipeline::new(options, handler)
        .run(cancel_rx)
        .await
        .expect_err("walking a missing root must abort the run");
    assert!(err.downcast_ref::<FatalError>().is_some());
    assert!(format!("{err:#}").contains("failed to walk files"));
    Ok(())
}

#[tokio::test]
async fn excluded_paths_are_skipped_by_the_walk() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path().canonicalize()?;
    fs::create_dir(root.join("vendor"))?;
    fs::write(root.join("vendor").join("dep.code.rs"), "fn dep() {}")?;
    fs::write(root.join("app.code.rs"), "fn app() {}")?;

    let handler = Arc::new(FsEventHandler::new(
        &root,
        false,
        Arc::new(HashStore::default()),
        Arc::new(SnippetRenderer) as Arc<dyn Renderer>,
        Arc::new(FsWriter) as Arc<dyn ArtifactWriter>,
    ));
    let options = PipelineOptions {
        root: root.clone(),
        watch: false,
        workers: 2,
        quiet_period: Duration::from_millis(50),
        excludes: build_exclude_set(&["vendor/**".to_string()])?,
    };
    let (_cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
    let summary = Pipeline::new(options, handler).run(cancel_rx).await?;

    assert_eq!(summary.errors, 0);
    assert!(generated_path(&root.join("app.code.rs")).exists());
    assert!(!generated_path(&root.join("vendor").join("dep.code.rs")).exists());
    Ok(())
}
