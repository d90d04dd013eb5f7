//! Command-line interface definitions for the `strata` tools.

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args as ClapArgs, Parser, ValueEnum};
use strata::format::extension;

/// Format written when neither a flag nor a file extension picks one.
pub const FALLBACK_FORMAT: &str = "json";

/// Destination and encoding shared by every tool that writes output.
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct OutputArgs {
    /// Write output to PATH instead of stdout.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub path: Option<Utf8PathBuf>,
    /// Output format (json, json-pretty, toml, yaml).
    #[arg(short = 'f', long, value_name = "FORMAT", env = "STRATA_FORMAT")]
    pub format: Option<String>,
}

impl OutputArgs {
    /// The format to encode with.
    ///
    /// An explicit non-empty format wins, then the extension of the output
    /// path, then the extension of `input`, then [`FALLBACK_FORMAT`].
    #[must_use]
    pub fn resolve_format(&self, input: Option<&Utf8Path>) -> String {
        self.format
            .iter()
            .find(|format| !format.is_empty())
            .cloned()
            .or_else(|| self.path.as_deref().and_then(extension))
            .or_else(|| input.and_then(extension))
            .unwrap_or_else(|| FALLBACK_FORMAT.to_owned())
    }
}

/// Arguments for `strata`.
#[derive(Debug, Parser)]
#[command(name = "strata")]
#[command(about = "Merge layered configuration files and evaluate their directives")]
#[command(version)]
pub struct RenderArgs {
    /// Output destination and format.
    #[command(flatten)]
    pub output: OutputArgs,
    /// Log layer loading and merging to stderr.
    #[arg(short, long)]
    pub verbose: bool,
    /// Layer files; each is merged together with its `$parent` chain.
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<Utf8PathBuf>,
}

/// Arguments for `strata-required`.
#[derive(Debug, Parser)]
#[command(name = "strata-required")]
#[command(about = "Reduce a layered configuration to its required fields")]
#[command(version)]
pub struct RequiredArgs {
    /// Output destination and format.
    #[command(flatten)]
    pub output: OutputArgs,
    /// Log layer loading and merging to stderr.
    #[arg(short, long)]
    pub verbose: bool,
    /// Layer file to reduce.
    #[arg(value_name = "INPUT")]
    pub input: Utf8PathBuf,
}

/// Structural comparisons offered by `strata-diff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DiffOperation {
    /// Keep what both inputs share, marking differences `$required`.
    Intersect,
    /// Keep what the first input adds on top of the second.
    Subtract,
}

/// Arguments for `strata-diff`.
#[derive(Debug, Parser)]
#[command(name = "strata-diff")]
#[command(about = "Derive a shared base or a minimal override from two configurations")]
#[command(version)]
pub struct DiffArgs {
    /// Output destination and format.
    #[command(flatten)]
    pub output: OutputArgs,
    /// Log layer loading and merging to stderr.
    #[arg(short, long)]
    pub verbose: bool,
    /// Comparison to run.
    #[arg(value_enum)]
    pub operation: DiffOperation,
    /// Candidate configuration.
    #[arg(value_name = "A")]
    pub a: Utf8PathBuf,
    /// Baseline configuration.
    #[arg(value_name = "B")]
    pub b: Utf8PathBuf,
}
