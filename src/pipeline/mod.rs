// src/pipeline/mod.rs

//! The regeneration pipeline.
//!
//! This module ties together:
//! - the per-event handler (filter, modtime check, render, hash check, write)
//! - the bookkeeping stores it leans on
//! - the bounded worker pool and phase wiring
//! - the debounce/settle coordinator

pub mod handler;
pub mod runner;
pub mod settle;
pub mod stores;

pub use handler::{generated_path, FsEventHandler, Outcome, GENERATED_SUFFIX};
pub use runner::{Pipeline, PipelineOptions, RunSummary};
pub use settle::{settle_loop, GenerationEvent, SettleHook, DEFAULT_QUIET_PERIOD};
pub use stores::{ErrorRegistry, HashStore, ModTimeStore};
