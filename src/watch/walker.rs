// src/watch/walker.rs

use std::path::Path;

use anyhow::{Context, Result};
use globset::GlobSet;
use tokio::sync::mpsc;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::watch::filter;
use crate::watch::{FileEvent, FileEventKind};

/// Walk the tree under `root` and push one synthetic `Create` event per
/// existing snippet file (and per text artifact, so stale artifacts get
/// cleaned up in production mode).
///
/// Hidden directories and `target/` are always skipped; `excludes` holds the
/// configured glob patterns, matched against root-relative paths.
pub async fn walk_files(
    root: &Path,
    excludes: &GlobSet,
    events: &mpsc::Sender<FileEvent>,
) -> Result<()> {
    let walk = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry));

    for entry in walk {
        let entry = entry.with_context(|| format!("walking directory {root:?}"))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        if let Some(rel) = filter::relative_str(root, &path) {
            if excludes.is_match(&rel) {
                debug!(path = %rel, "excluded from walk");
                continue;
            }
        }
        if !filter::is_snippet_file(&path) && !filter::is_text_artifact(&path) {
            continue;
        }
        events
            .send(FileEvent {
                path,
                kind: FileEventKind::Create,
            })
            .await
            .context("event channel closed during walk")?;
    }
    Ok(())
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && filter::is_skipped_dir_name(&entry.file_name().to_string_lossy())
}
