// src/config/model.rs

use serde::Deserialize;

/// Optional TOML-backed settings, e.g.:
///
/// ```toml
/// exclude = ["vendor/**", "target/**"]
/// workers = 4
/// quiet_period_ms = 100
/// ```
///
/// CLI flags override anything set here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Glob patterns, relative to the processed root, that the walker and
    /// watcher should ignore.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Worker pool size. Default: available parallelism.
    pub workers: Option<usize>,

    /// Debounce quiet period in milliseconds. Default: 100.
    pub quiet_period_ms: Option<u64>,
}
