//! Running another tool on pre-merged layer files.
//!
//! The wrapper is invoked either as `strata-wrap TOOL ARGS...` or through a
//! symlink named `<tool>-strata`. Every argument naming a layer file (by one
//! of [`LAYER_EXTENSIONS`]) is merged with its parents and replaced by a
//! temporary file holding the rendered result in the format the argument
//! asked for. The temporary files live until the tool exits.

use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::path::Path;
use std::process::Command;

use camino::{Utf8Path, Utf8PathBuf};
use strata::file::find_layer;
use strata::format::extension;
use strata::{FormatRegistry, Session};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StrataCliError;

/// Suffix identifying a `<tool>-strata` symlink.
pub const LINK_SUFFIX: &str = "-strata";

/// Extensions marking an argument as a layer file.
pub const LAYER_EXTENSIONS: [&str; 4] = ["json", "toml", "yaml", "yml"];

/// Run the wrapped tool for the process arguments `argv` (program name
/// included) and return its exit code.
///
/// # Errors
///
/// Returns [`StrataCliError::MissingTool`] when no tool is named, merge and
/// staging failures, and [`StrataCliError::Spawn`] when the tool cannot run.
pub fn run(argv: Vec<OsString>) -> Result<i32, StrataCliError> {
    let (tool, args) = split_invocation(argv)?;
    let registry = FormatRegistry::builtin();
    let (args, staged) = rewrite_args(args, &registry)?;
    debug!(tool = %tool.to_string_lossy(), staged = staged.len(), "running wrapped tool");
    let status = Command::new(&tool)
        .args(&args)
        .status()
        .map_err(|source| StrataCliError::Spawn {
            tool: tool.to_string_lossy().into_owned(),
            source,
        })?;
    drop(staged);
    Ok(status.code().unwrap_or(1))
}

/// Separate the tool to run from its arguments.
///
/// # Errors
///
/// Returns [`StrataCliError::MissingTool`] when neither the program name nor
/// the first argument names a tool.
pub fn split_invocation(argv: Vec<OsString>) -> Result<(OsString, Vec<OsString>), StrataCliError> {
    let mut argv = argv.into_iter();
    let program = argv.next().unwrap_or_default();
    let linked = Path::new(&program)
        .file_stem()
        .and_then(OsStr::to_str)
        .and_then(|name| name.strip_suffix(LINK_SUFFIX))
        .filter(|tool| !tool.is_empty())
        .map(OsString::from);
    let tool = match linked {
        Some(tool) => tool,
        None => argv.next().ok_or(StrataCliError::MissingTool)?,
    };
    Ok((tool, argv.collect()))
}

/// Replace layer file arguments with pre-merged temporary files.
///
/// An argument is rewritten when its extension is one of
/// [`LAYER_EXTENSIONS`] and a layer exists for it, possibly under another
/// extension. Other arguments pass through. The returned temporary files
/// must outlive the tool run.
///
/// # Errors
///
/// Returns merge and encoding failures for the layers, and
/// [`StrataCliError::Io`] when a temporary file cannot be written.
pub fn rewrite_args(
    args: Vec<OsString>,
    registry: &FormatRegistry,
) -> Result<(Vec<OsString>, Vec<NamedTempFile>), StrataCliError> {
    let mut rewritten = Vec::with_capacity(args.len());
    let mut staged = Vec::new();
    for arg in args {
        let Some((layer, format)) = layer_argument(&arg, registry) else {
            rewritten.push(arg);
            continue;
        };
        let file = stage(&layer, &format)?;
        rewritten.push(file.path().as_os_str().to_owned());
        staged.push(file);
    }
    Ok((rewritten, staged))
}

fn layer_argument(arg: &OsStr, registry: &FormatRegistry) -> Option<(Utf8PathBuf, String)> {
    let path = Utf8Path::new(arg.to_str()?);
    let format = extension(path).filter(|ext| LAYER_EXTENSIONS.contains(&ext.as_str()))?;
    let layer = find_layer(path, registry)?;
    Some((layer, format))
}

fn stage(layer: &Utf8Path, format: &str) -> Result<NamedTempFile, StrataCliError> {
    let mut session = Session::new();
    session.merge_file_layers(layer)?;
    let rendered = session.output(format)?;
    let io_err = |source: std::io::Error| StrataCliError::Io {
        path: layer.to_path_buf(),
        source,
    };
    let mut file = tempfile::Builder::new()
        .prefix("strata-")
        .suffix(&format!(".{format}"))
        .tempfile()
        .map_err(io_err)?;
    file.write_all(rendered.as_bytes())
        .and_then(|()| file.flush())
        .map_err(io_err)?;
    debug!(%layer, staged = %file.path().display(), "staged merged layer");
    Ok(file)
}
