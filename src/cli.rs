// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `snipgen`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "snipgen",
    version,
    about = "Generate embeddable code modules from .code.* snippet files.",
    long_about = None
)]
pub struct CliArgs {
    /// Directory to process; every snippet file under it gets regenerated.
    #[arg(long, value_name = "PATH", default_value = ".")]
    pub path: String,

    /// Generate code for a single file instead of a whole tree.
    #[arg(short = 'f', long, value_name = "FILE")]
    pub file: Option<String>,

    /// Print generated output to stdout instead of writing files.
    /// Only applicable together with -f.
    #[arg(long)]
    pub stdout: bool,

    /// Watch the path for changes and regenerate continuously until Ctrl-C,
    /// then reconcile with a final production pass.
    #[arg(long)]
    pub watch: bool,

    /// Number of concurrent regeneration workers.
    /// Default: available parallelism.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Path to a TOML config file.
    ///
    /// If omitted, `Snipgen.toml` in the current directory is used when it
    /// exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SNIPGEN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
