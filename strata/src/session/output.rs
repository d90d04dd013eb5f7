//! Producing processed, encoded output from a session.

use std::io::Write;

use camino::Utf8Path;
use serde_json::Value;
use tracing::debug;

use crate::document::Document;
use crate::error::{StrataError, StrataResult, StrataResultExt};
use crate::file::write_atomic;
use crate::format::{DEFAULT_OUTPUT_FORMAT, extension};
use crate::output::{select_outputs, validate};
use crate::process::Processor;

use super::Session;

impl Session {
    /// Process the document at `index` and return the objects it emits.
    ///
    /// A document omitted by `$output: false` emits nothing.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::InvalidIndex`] for an out-of-range index and
    /// any processing or validation failure, wrapped with `[doc<n>]`.
    pub fn output_documents_index(&self, index: usize) -> StrataResult<Vec<Value>> {
        let root = self.document_ref(index)?.data();
        let documents = self.documents.iter().map(Document::data);
        let processor = Processor::new(root, documents, self.registry());
        let context = || format!("[doc{index}]");
        let Some(processed) = processor.process(root.clone()).with_context(context)? else {
            return Ok(Vec::new());
        };
        let outputs = select_outputs(processed);
        for output in &outputs {
            validate(output).with_context(context)?;
        }
        Ok(outputs)
    }

    /// The objects emitted by every document, in order.
    ///
    /// # Errors
    ///
    /// Propagates the first failure of
    /// [`Session::output_documents_index`].
    pub fn output_documents(&self) -> StrataResult<Vec<Value>> {
        let mut outputs = Vec::new();
        for index in 0..self.len() {
            outputs.extend(self.output_documents_index(index)?);
        }
        Ok(outputs)
    }

    /// Encode the objects emitted by the document at `index` one by one.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::UnknownFormat`] for unregistered formats and
    /// encoder failures wrapped with `[doc<n>:out<m>]`.
    pub fn output_index(&self, index: usize, format: &str) -> StrataResult<Vec<String>> {
        let encoder = self.registry().get(format)?;
        self.output_documents_index(index)?
            .iter()
            .enumerate()
            .map(|(out, value)| {
                encoder
                    .encode(value)
                    .with_context(|| format!("[doc{index}:out{out}]"))
            })
            .collect()
    }

    /// Encode every emitted object one by one.
    ///
    /// # Errors
    ///
    /// See [`Session::output_index`].
    pub fn outputs(&self, format: &str) -> StrataResult<Vec<String>> {
        let mut encoded = Vec::new();
        for index in 0..self.len() {
            encoded.extend(self.output_index(index, format)?);
        }
        Ok(encoded)
    }

    /// Encode every emitted object into a single stream.
    ///
    /// # Errors
    ///
    /// Returns processing failures, [`StrataError::UnknownFormat`] and
    /// encoder failures.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use strata::Session;
    ///
    /// let mut session = Session::new();
    /// session.apply_patch(0, json!({"a": {"$output": true, "x": 1}, "b": {"$output": true, "x": 2}}))?;
    /// assert_eq!(session.output("json")?, "{\"x\":1}\n{\"x\":2}\n");
    /// # Ok::<_, strata::StrataError>(())
    /// ```
    pub fn output(&self, format: &str) -> StrataResult<String> {
        let outputs = self.output_documents()?;
        self.registry().get(format)?.encode_stream(&outputs)
    }

    /// Write the output stream to `writer`.
    ///
    /// An empty `format` selects `json-pretty`. Nothing is written unless
    /// the whole stream renders.
    ///
    /// # Errors
    ///
    /// Returns the failures of [`Session::output`] and
    /// [`StrataError::Write`] when writing fails.
    pub fn output_to_writer<W: Write>(&self, writer: &mut W, format: &str) -> StrataResult<()> {
        let format = if format.is_empty() {
            DEFAULT_OUTPUT_FORMAT
        } else {
            format
        };
        let rendered = self.output(format)?;
        writer
            .write_all(rendered.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|source| StrataError::Write { source })
    }

    /// Write the output stream to the file at `path`.
    ///
    /// An empty `format` is inferred from the extension of `path`, falling
    /// back to `json-pretty`. The stream is rendered in memory and written to
    /// a temporary file beside `path`, which then replaces `path` (see
    /// [`write_atomic`]); a failure leaves any existing file untouched.
    ///
    /// # Errors
    ///
    /// Returns rendering failures wrapped with the path and
    /// [`StrataError::OutputFile`] when the file cannot be written.
    pub fn output_to_file(&self, path: &Utf8Path, format: &str) -> StrataResult<()> {
        let format = if format.is_empty() {
            extension(path).unwrap_or_else(|| DEFAULT_OUTPUT_FORMAT.to_owned())
        } else {
            format.to_owned()
        };
        let rendered = self.output(&format).context(path)?;
        debug!(%path, %format, "writing output file");

        write_atomic(path, rendered.as_bytes()).map_err(|source| StrataError::OutputFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}
