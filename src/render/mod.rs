// src/render/mod.rs

//! The content transformation and artifact persistence seams.
//!
//! The pipeline does not know what generated output looks like; it only
//! hashes and conditionally persists whatever a [`Renderer`] returns. The
//! built-in [`SnippetRenderer`] lives in `snippet.rs`.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};

pub mod snippet;

pub use snippet::SnippetRenderer;

/// Output of rendering one snippet file: the generated code bytes and the
/// extracted literal text (may be empty).
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    pub code: Vec<u8>,
    pub text: String,
}

/// The opaque content transform invoked for one input file.
pub trait Renderer: Send + Sync {
    fn render(&self, path: &Path, content: &[u8]) -> Result<Rendered>;
}

/// Where generated code artifacts go. Injectable so output can be streamed
/// to a single combined destination when operating on exactly one file.
pub trait ArtifactWriter: Send + Sync {
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
}

/// Default writer: plain filesystem write.
#[derive(Debug, Default)]
pub struct FsWriter;

impl ArtifactWriter for FsWriter {
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        fs::write(path, contents).with_context(|| format!("writing artifact {path:?}"))
    }
}

/// Streams every artifact to one destination, ignoring the target path.
/// Used for single-file `--stdout` runs.
pub struct StreamWriter<W: Write + Send> {
    inner: Mutex<W>,
}

impl<W: Write + Send> StreamWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Mutex::new(writer),
        }
    }
}

impl<W: Write + Send> ArtifactWriter for StreamWriter<W> {
    fn write(&self, _path: &Path, contents: &[u8]) -> Result<()> {
        let mut writer = self.inner.lock().expect("stream writer lock poisoned");
        writer.write_all(contents).context("writing to stream")?;
        writer.flush().context("flushing stream")
    }
}
