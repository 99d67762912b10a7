#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use snipgen::render::{ArtifactWriter, FsWriter, Rendered, Renderer, SnippetRenderer};

/// Delegates to the built-in renderer but counts invocations.
#[derive(Default)]
pub struct CountingRenderer {
    calls: AtomicUsize,
    inner: SnippetRenderer,
}

impl CountingRenderer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Renderer for CountingRenderer {
    fn render(&self, path: &Path, content: &[u8]) -> Result<Rendered> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.render(path, content)
    }
}

/// Always returns the same output, whatever the input.
pub struct FixedRenderer {
    calls: AtomicUsize,
    code: Vec<u8>,
    text: String,
}

impl FixedRenderer {
    pub fn new(code: &[u8], text: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            code: code.to_vec(),
            text: text.to_string(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Renderer for FixedRenderer {
    fn render(&self, _path: &Path, _content: &[u8]) -> Result<Rendered> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Rendered {
            code: self.code.clone(),
            text: self.text.clone(),
        })
    }
}

/// Fails on the first call, succeeds afterwards.
#[derive(Default)]
pub struct FlakyRenderer {
    calls: AtomicUsize,
}

impl Renderer for FlakyRenderer {
    fn render(&self, _path: &Path, content: &[u8]) -> Result<Rendered> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            bail!("transient render failure");
        }
        Ok(Rendered {
            code: content.to_vec(),
            text: String::new(),
        })
    }
}

/// In-memory write sink whose contents can be inspected after the fact.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> Vec<u8> {
        self.0.lock().expect("shared buffer lock poisoned").clone()
    }
}

impl std::io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .expect("shared buffer lock poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Forwards to the filesystem writer but counts writes.
#[derive(Default)]
pub struct CountingWriter {
    writes: AtomicUsize,
    inner: FsWriter,
}

impl CountingWriter {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl ArtifactWriter for CountingWriter {
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write(path, contents)
    }
}
