// src/watch/mod.rs

//! Filesystem event sources.
//!
//! This module is responsible for:
//! - Deciding which paths are snippet sources (`filter`).
//! - Producing the initial full-tree event stream (`walker`).
//! - Wiring up a cross-platform filesystem watcher (`notify`) for live
//!   change notifications (`watcher`).
//!
//! It does **not** regenerate anything; it only turns the filesystem into a
//! stream of [`FileEvent`]s for the pipeline to consume.

use std::path::PathBuf;

pub mod filter;
pub mod walker;
pub mod watcher;

pub use filter::{
    build_exclude_set, in_skipped_dir, is_snippet_file, is_text_artifact, relative_str,
    CODE_MARKER, DEFAULT_SKIPPED_DIR, TEXT_ARTIFACT_NAME,
};
pub use walker::walk_files;
pub use watcher::{spawn_watcher, WatcherHandle};

/// A single filesystem notification, from either the initial walk or the
/// live watcher. Consumed exactly once by the event handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub path: PathBuf,
    pub kind: FileEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEventKind {
    Create,
    Write,
    Remove,
}
