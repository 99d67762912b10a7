// src/errors.rs

//! Crate-wide error types.
//!
//! Most errors flow through `anyhow` with context attached at each layer.
//! The one structured type here is [`FatalError`], which marks failures that
//! must abort the whole run instead of being counted and skipped.

use thiserror::Error;

/// Unrecoverable setup failure: the initial walk or the watcher could not be
/// constructed. Per-file regeneration failures never use this type; they are
/// counted and the run keeps going.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct FatalError(pub anyhow::Error);

impl FatalError {
    /// Wrap `err` so the pipeline's error loop can recognise it by downcast.
    pub fn wrap(err: anyhow::Error) -> anyhow::Error {
        anyhow::Error::new(FatalError(err))
    }
}
