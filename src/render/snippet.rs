// src/render/snippet.rs

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::render::{Rendered, Renderer};
use crate::watch::CODE_MARKER;

/// The built-in renderer: turns a snippet file into a Rust module that
/// embeds the snippet as a raw string constant, named after the file.
///
/// `examples/quick sort.code.py` becomes a module containing
/// `pub const QUICK_SORT_PY: &str = r#"..."#;` plus a language tag constant
/// derived from the snippet's extension. The extracted text is the snippet
/// content itself, which watch-mode tooling consumes via the shared text
/// artifact.
#[derive(Debug, Default)]
pub struct SnippetRenderer;

impl Renderer for SnippetRenderer {
    fn render(&self, path: &Path, content: &[u8]) -> Result<Rendered> {
        let text = std::str::from_utf8(content)
            .with_context(|| format!("snippet {path:?} is not valid UTF-8"))?;
        // Raw string literals reject carriage returns; normalise line endings.
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let name = const_name(path)?;
        let lang = language_tag(path);
        let code = emit_module(&name, &lang, &text);
        Ok(Rendered {
            code: code.into_bytes(),
            text,
        })
    }
}

fn emit_module(name: &str, lang: &str, text: &str) -> String {
    let hashes = "#".repeat(raw_string_hashes(text));
    format!(
        "// Generated by snipgen. DO NOT EDIT.\n\n\
         pub const {name}: &str = r{hashes}\"{text}\"{hashes};\n\n\
         pub const {name}_LANG: &str = \"{lang}\";\n"
    )
}

/// Derive a constant name from the file name, with the `.code.` marker
/// stripped: letters and digits are kept uppercased, every other character
/// becomes a single underscore boundary.
fn const_name(path: &Path) -> Result<String> {
    let file_name = match path.file_name() {
        Some(name) => name.to_string_lossy().replace(CODE_MARKER, "."),
        None => bail!("unexpected file name {path:?}"),
    };

    let mut result = String::new();
    let mut boundary = false;
    for ch in file_name.chars() {
        if ch.is_ascii_alphanumeric() {
            if boundary && !result.is_empty() {
                result.push('_');
            }
            result.push(ch.to_ascii_uppercase());
            boundary = false;
        } else {
            boundary = true;
        }
    }

    if result.is_empty() {
        bail!("cannot derive a constant name from {path:?}");
    }
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    Ok(result)
}

fn language_tag(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Number of `#`s needed so the raw string delimiter cannot collide with the
/// embedded content.
fn raw_string_hashes(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut needed = 1;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'"' {
            let mut run = 0;
            while i + 1 + run < bytes.len() && bytes[i + 1 + run] == b'#' {
                run += 1;
            }
            needed = needed.max(run + 1);
            i += run + 1;
        } else {
            i += 1;
        }
    }
    needed
}
