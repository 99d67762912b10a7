// src/config/mod.rs

//! Configuration loading for snipgen.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load an optional config file from disk (`loader.rs`).
//!
//! Exclude patterns are validated when compiled into a globset by
//! `watch::build_exclude_set`.

pub mod loader;
pub mod model;

pub use loader::{load, load_from_path, DEFAULT_CONFIG_PATH};
pub use model::ConfigFile;
