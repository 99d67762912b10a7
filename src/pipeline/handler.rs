// src/pipeline/handler.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::pipeline::stores::{ErrorRegistry, HashStore, ModTimeStore};
use crate::render::{ArtifactWriter, Renderer};
use crate::watch::{filter, FileEvent, FileEventKind};

/// Suffix appended to a snippet path to form its generated artifact path.
pub const GENERATED_SUFFIX: &str = "_gen.rs";

/// What one handled event changed on disk. No-op events report both false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub code_changed: bool,
    pub text_changed: bool,
}

/// Per-event orchestration: filter, modtime check, render, hash check,
/// write, error bookkeeping.
///
/// One handler instance serves one pipeline pass. The modtime store and
/// error registry are private to the pass; the hash store is shared so a
/// production pass after watch mode does not rewrite unchanged outputs.
pub struct FsEventHandler {
    dir: PathBuf,
    dev_mode: bool,
    mod_times: ModTimeStore,
    errors: ErrorRegistry,
    hashes: Arc<HashStore>,
    renderer: Arc<dyn Renderer>,
    writer: Arc<dyn ArtifactWriter>,
}

impl FsEventHandler {
    pub fn new(
        dir: impl Into<PathBuf>,
        dev_mode: bool,
        hashes: Arc<HashStore>,
        renderer: Arc<dyn Renderer>,
        writer: Arc<dyn ArtifactWriter>,
    ) -> Self {
        Self {
            dir: dir.into(),
            dev_mode,
            mod_times: ModTimeStore::default(),
            errors: ErrorRegistry::default(),
            hashes,
            renderer,
            writer,
        }
    }

    pub fn handle(&self, event: &FileEvent) -> Result<Outcome> {
        // Handle the shared text artifact. While watching it is logically
        // live; in production mode it is a leftover to delete.
        if event.kind != FileEventKind::Remove && filter::is_text_artifact(&event.path) {
            if self.dev_mode {
                return Ok(Outcome {
                    code_changed: false,
                    text_changed: true,
                });
            }
            debug!(file = %event.path.display(), "deleting watch mode text artifact");
            if let Err(err) = fs::remove_file(&event.path) {
                warn!(error = %err, "failed to remove watch mode text artifact");
            }
            return Ok(Outcome::default());
        }

        // Everything else must carry the snippet marker.
        if !filter::is_snippet_file(&event.path) {
            return Ok(Outcome::default());
        }

        // Duplicate notifications for the same write, and unchanged files
        // seen again during a walk, are dropped here.
        let (_, updated) = self.mod_times.upsert_if_newer(&event.path);
        if !updated {
            debug!(file = %event.path.display(), "skipping file because it wasn't updated");
            return Ok(Outcome::default());
        }

        let start = Instant::now();
        match self.generate(&event.path) {
            Err(err) => {
                error!(file = %event.path.display(), error = %err, "error generating code");
                self.errors.set_error(&event.path, true);
                Err(err.context(format!("failed to generate code for {:?}", event.path)))
            }
            Ok(outcome) => {
                let (previously_had_error, error_count) =
                    self.errors.set_error(&event.path, false);
                if previously_had_error {
                    info!(file = %event.path.display(), errors = error_count, "error cleared");
                }
                debug!(file = %event.path.display(), elapsed = ?start.elapsed(), "generated code");
                Ok(outcome)
            }
        }
    }

    /// Render one snippet file and persist whichever artifacts changed.
    /// The two writes are independent; both, either, or neither may occur.
    fn generate(&self, path: &Path) -> Result<Outcome> {
        let content = fs::read(path).with_context(|| format!("failed to open {path:?}"))?;
        let rendered = self
            .renderer
            .render(path, &content)
            .with_context(|| format!("{path:?} generation error"))?;

        let mut outcome = Outcome::default();

        // Hash commits before the write; a write failure is reported but the
        // hash is not rolled back. The next content change produces a new
        // hash and retriggers the write.
        let target = generated_path(path);
        let code_hash = blake3::hash(&rendered.code);
        if self.hashes.upsert_if_changed(&target, code_hash) {
            outcome.code_changed = true;
            self.writer
                .write(&target, &rendered.code)
                .with_context(|| format!("failed to write target file {target:?}"))?;
        }

        if !rendered.text.is_empty() {
            let text_path = self.dir.join(filter::TEXT_ARTIFACT_NAME);
            let text_hash = blake3::hash(rendered.text.as_bytes());
            if self.hashes.upsert_if_changed(&text_path, text_hash) {
                outcome.text_changed = true;
                fs::write(&text_path, rendered.text.as_bytes())
                    .with_context(|| format!("failed to write text artifact {text_path:?}"))?;
            }
        }

        Ok(outcome)
    }
}

/// Artifact path for a snippet source: the source path with
/// [`GENERATED_SUFFIX`] appended.
pub fn generated_path(source: &Path) -> PathBuf {
    let mut name = source.as_os_str().to_os_string();
    name.push(GENERATED_SUFFIX);
    PathBuf::from(name)
}
