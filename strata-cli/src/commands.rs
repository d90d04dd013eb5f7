//! The work behind each binary.

use camino::Utf8Path;
use strata::required::extract_required;
use strata::serde_json::Map;
use strata::{Session, Value, intersect, subtract};
use tracing::debug;

use crate::cli::{DiffArgs, DiffOperation, RenderArgs, RequiredArgs};
use crate::error::StrataCliError;
use crate::output::emit;

/// Merge every input with its parents and write the processed output.
///
/// # Errors
///
/// Returns loading, processing and writing failures.
pub fn render(args: &RenderArgs) -> Result<(), StrataCliError> {
    let mut session = Session::new();
    for input in &args.inputs {
        session.merge_file_layers(input)?;
    }
    let format = args.output.resolve_format(None);
    debug!(documents = session.len(), %format, "rendering session");
    match args.output.path.as_deref() {
        Some(path) => session.output_to_file(path, &format)?,
        None => session.output_to_writer(&mut std::io::stdout().lock(), &format)?,
    }
    Ok(())
}

/// Reduce each merged document of the input to its required fields.
///
/// A document without required fields is written as an empty map.
///
/// # Errors
///
/// Returns loading, encoding and writing failures.
pub fn required(args: &RequiredArgs) -> Result<(), StrataCliError> {
    let mut session = Session::new();
    session.merge_file_layers(&args.input)?;
    let reduced: Vec<Value> = session
        .iter()
        .map(|doc| extract_required(doc.data()).unwrap_or_else(|| Value::Object(Map::new())))
        .collect();
    let format = args.output.resolve_format(Some(&args.input));
    let rendered = session.registry().get(&format)?.encode_stream(&reduced)?;
    emit(&rendered, args.output.path.as_deref())
}

/// Intersect or subtract two single-document configurations.
///
/// # Errors
///
/// Returns [`StrataCliError::DocumentCount`] when an input does not hold
/// exactly one document, plus loading, diff and writing failures.
pub fn diff(args: &DiffArgs) -> Result<(), StrataCliError> {
    let session = Session::new();
    let a = load_single(&args.a)?;
    let b = load_single(&args.b)?;
    let result = match args.operation {
        DiffOperation::Intersect => intersect(a, b)?,
        DiffOperation::Subtract => subtract(a, b)?,
    };
    let format = args.output.resolve_format(Some(&args.a));
    let rendered = session.registry().get(&format)?.encode_stream(&[result])?;
    emit(&rendered, args.output.path.as_deref())
}

fn load_single(path: &Utf8Path) -> Result<Value, StrataCliError> {
    let mut session = Session::new();
    session.merge_file_layers(path)?;
    if session.len() != 1 {
        return Err(StrataCliError::DocumentCount {
            path: path.to_path_buf(),
            count: session.len(),
        });
    }
    Ok(session.document(0)?)
}
