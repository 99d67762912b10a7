// src/watch/filter.rs

use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::pipeline::GENERATED_SUFFIX;

/// Marker infix that identifies a snippet source file, e.g. `intro.code.rs`.
pub const CODE_MARKER: &str = ".code.";

/// Name of the shared extracted-text artifact written next to the generated
/// code while watching.
pub const TEXT_ARTIFACT_NAME: &str = "_code.txt";

/// Returns true if `path` names a snippet source file: the `.code.` marker
/// must appear with a non-empty extension after it. Generated outputs also
/// contain the marker (their name is the source name plus a suffix), so they
/// are excluded explicitly to keep the pipeline from feeding on itself.
pub fn is_snippet_file(path: &Path) -> bool {
    let name = path.to_string_lossy();
    if name.ends_with(GENERATED_SUFFIX) {
        return false;
    }
    match name.rfind(CODE_MARKER) {
        Some(index) => index + CODE_MARKER.len() < name.len(),
        None => false,
    }
}

/// Returns true if `path` names the shared extracted-text artifact.
pub fn is_text_artifact(path: &Path) -> bool {
    path.to_string_lossy().ends_with(TEXT_ARTIFACT_NAME)
}

/// Build output directory skipped by default, alongside hidden directories.
pub const DEFAULT_SKIPPED_DIR: &str = "target";

/// Directory names the walker prunes without descending: hidden directories
/// and the default build output directory.
pub fn is_skipped_dir_name(name: &str) -> bool {
    name.starts_with('.') || name == DEFAULT_SKIPPED_DIR
}

/// Returns true if any directory component of the root-relative path is
/// skipped by default. Applied by both the walker and the watcher so the two
/// event sources agree on what they ignore.
pub fn in_skipped_dir(rel_path: &str) -> bool {
    let mut components = rel_path.split('/');
    components.next_back(); // the file name itself is not a directory
    components.any(is_skipped_dir_name)
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if the path is not under `root` and cannot be relativized.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

/// Build a `GlobSet` from exclude patterns. Patterns are matched against
/// paths relative to the project root, e.g. `"vendor/**"`.
pub fn build_exclude_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid exclude pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
