use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Serialize;

use crate::core::item::{ItemWriter, ItemWriterResult};
use crate::core::stream::{Checkpoint, ExecutionContext, ItemStream, ItemStreamResult};
use crate::error::BatchError;
use crate::item::json::encoder::{JsonItemEncoder, SerdeJsonEncoder};
use crate::item::json::framing::JsonFraming;
use crate::item::json::output_state::OutputState;
use crate::item::json::separator::SeparatorPolicy;

/// Default component name, used as the prefix of the checkpoint keys.
pub const DEFAULT_NAME: &str = "JsonFileItemWriter";

/// Context key suffix under which the writer publishes its byte offset.
pub const RESTART_OFFSET_KEY: &str = "restart.offset";

/// Context key suffix under which the writer publishes its item counter.
pub const ITEMS_WRITTEN_KEY: &str = "items.written";

/// A restartable item writer that streams chunks of records into a single
/// JSON array document.
///
/// The document is either a bare array (`[...]`) or an array wrapped in one
/// named root field (`{"persons":[...]}`). Records arrive in arbitrarily
/// sized chunks over the lifetime of a job; the writer places separators so
/// that the concatenation of all chunks parses as one valid JSON document no
/// matter how the records were split up, including empty chunks.
///
/// After every committed chunk the writer can publish a byte offset and an
/// item counter into an [`ExecutionContext`] through [`ItemStream::update`].
/// When a later attempt hands the same context back to [`ItemStream::open`],
/// writing resumes at that offset and any uncommitted bytes left behind by a
/// crash are truncated away first.
///
/// # Examples
///
/// ```
/// use batch_json_writer::{ExecutionContext, ItemStream, ItemWriter};
/// use batch_json_writer::item::json::JsonFileItemWriterBuilder;
/// use serde::Serialize;
/// use tempfile::tempdir;
///
/// # fn main() -> Result<(), batch_json_writer::BatchError> {
/// #[derive(Serialize)]
/// struct Person {
///     name: String,
///     age: u8,
/// }
///
/// let dir = tempdir().unwrap();
/// let path = dir.path().join("persons.json");
///
/// let writer = JsonFileItemWriterBuilder::new()
///     .resource(&path)
///     .header_line_separator(false)
///     .build();
///
/// writer.open(&ExecutionContext::new())?;
/// writer.write(&[
///     Person { name: "Alice".to_string(), age: 30 },
///     Person { name: "Bob".to_string(), age: 25 },
/// ])?;
/// writer.close()?;
///
/// let content = std::fs::read_to_string(&path).unwrap();
/// assert_eq!(content, r#"[{"name":"Alice","age":30},{"name":"Bob","age":25}]"#);
/// # Ok(())
/// # }
/// ```
///
/// Wrapping the array in a named root field:
///
/// ```
/// use batch_json_writer::{ExecutionContext, ItemStream, ItemWriter};
/// use batch_json_writer::item::json::JsonFileItemWriterBuilder;
/// use serde_json::json;
/// use tempfile::tempdir;
///
/// # fn main() -> Result<(), batch_json_writer::BatchError> {
/// let dir = tempdir().unwrap();
/// let path = dir.path().join("persons.json");
///
/// let writer = JsonFileItemWriterBuilder::new()
///     .root_node("persons")
///     .header_line_separator(false)
///     .resource(&path)
///     .build();
///
/// writer.open(&ExecutionContext::new())?;
/// writer.write(&[json!({"name": "Alice"})])?;
/// writer.close()?;
///
/// let content = std::fs::read_to_string(&path).unwrap();
/// assert_eq!(content, r#"{"persons":[{"name":"Alice"}]}"#);
/// # Ok(())
/// # }
/// ```
pub struct JsonFileItemWriter<T> {
    name: String,
    resource: Option<PathBuf>,
    encoding: String,
    framing: JsonFraming,
    separator_policy: SeparatorPolicy,
    encoder: Box<dyn JsonItemEncoder<T>>,
    line_separator: String,
    header_line_separator: bool,
    append: bool,
    delete_if_exists: bool,
    delete_if_empty: bool,
    force_sync: bool,
    save_state: bool,
    state: RefCell<Option<OutputState>>,
}

impl<T> JsonFileItemWriter<T> {
    /// Name of this writer, the prefix of its checkpoint keys.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current restart position of the open writer: the byte offset of the
    /// end of written data plus the number of items committed so far.
    ///
    /// Fails with [`BatchError::WriterNotOpen`] if the writer has not been
    /// opened, or was already closed.
    pub fn current_checkpoint(&self) -> Result<Checkpoint, BatchError> {
        let mut guard = self.state.borrow_mut();
        let state = guard
            .as_mut()
            .ok_or_else(|| BatchError::WriterNotOpen(self.name.clone()))?;
        let offset = state.position().map_err(|error| {
            BatchError::Io(std::io::Error::new(
                error.kind(),
                format!("Failed to read position of {}: {}", state.path().display(), error),
            ))
        })?;
        Ok(Checkpoint::new(offset, state.items_written()))
    }

    fn context_key(&self, suffix: &str) -> String {
        format!("{}.{}", self.name, suffix)
    }
}

impl<T> ItemWriter<T> for JsonFileItemWriter<T> {
    /// Encodes a chunk of items and appends it to the output file as one
    /// flushed blob. An empty chunk is a no-op. Items that fail to encode
    /// degrade to an empty fragment with its surrounding separators kept in
    /// place, so the committed item counter stays aligned with the driver's
    /// view of the chunk.
    fn write(&self, items: &[T]) -> ItemWriterResult {
        let mut guard = self.state.borrow_mut();
        let state = guard
            .as_mut()
            .ok_or_else(|| BatchError::WriterNotOpen(self.name.clone()))?;

        if items.is_empty() {
            return Ok(());
        }

        debug!("Writing to output file with {} items", items.len());

        let mut lines = String::new();
        for (index, item) in items.iter().enumerate() {
            if self
                .separator_policy
                .needs_separator_before(index, state.items_written())
            {
                lines.push_str(self.separator_policy.separator());
            }
            match self.encoder.encode(item) {
                Ok(fragment) => lines.push_str(&fragment),
                Err(error) => {
                    warn!("Could not encode item {} of chunk: {}", index, error);
                }
            }
        }

        state.write(&lines).map_err(|source| BatchError::WriteFailed {
            path: state.path().to_path_buf(),
            items_written: state.items_written(),
            source,
        })?;
        state.commit_items(items.len() as u64);
        Ok(())
    }

    fn flush(&self) -> ItemWriterResult {
        let mut guard = self.state.borrow_mut();
        if let Some(state) = guard.as_mut() {
            state.flush().map_err(|error| {
                BatchError::Io(std::io::Error::new(
                    error.kind(),
                    format!("Failed to flush {}: {}", state.path().display(), error),
                ))
            })?;
        }
        Ok(())
    }
}

impl<T> ItemStream for JsonFileItemWriter<T> {
    /// Opens the output file, restoring the restart position when the
    /// context carries this writer's checkpoint keys. A second call on an
    /// already open writer is a no-op.
    ///
    /// The document prefix is written, together with the configured line
    /// separator, as one flushed unit. It is skipped when resuming past
    /// offset 0 and when appending into pre-existing content.
    fn open(&self, ctx: &ExecutionContext) -> ItemStreamResult {
        if self.state.borrow().is_some() {
            warn!("Writer `{}` is already open", self.name);
            return Ok(());
        }

        let path = self.resource.as_ref().ok_or_else(|| {
            BatchError::NotConfigured("no output resource was set before `open`".to_string())
        })?;
        if !is_utf8(&self.encoding) {
            return Err(BatchError::NotConfigured(format!(
                "bad encoding `{}` for output file, only UTF-8 is supported",
                self.encoding
            )));
        }

        debug!("Opening writer `{}` for {}", self.name, path.display());

        let mut state = OutputState::new(
            path.clone(),
            self.append,
            self.delete_if_exists,
            self.delete_if_empty,
            self.force_sync,
        );
        if let Some(offset) = ctx.get(&self.context_key(RESTART_OFFSET_KEY)) {
            let items_written = ctx.get(&self.context_key(ITEMS_WRITTEN_KEY)).unwrap_or(0);
            debug!(
                "Restoring writer `{}` from offset {} ({} items committed)",
                self.name, offset, items_written
            );
            state.restore_from(Checkpoint::new(offset, items_written));
        }
        state.initialize()?;

        if state.last_marked_offset() == 0 && !state.is_appending() {
            let mut header = self.framing.header();
            if self.header_line_separator {
                header.push_str(&self.line_separator);
            }
            state.write(&header).map_err(|source| BatchError::WriteFailed {
                path: path.clone(),
                items_written: 0,
                source,
            })?;
        }

        *self.state.borrow_mut() = Some(state);
        Ok(())
    }

    /// Publishes the current restart position into the context under the
    /// `<name>.restart.offset` and `<name>.items.written` keys. Does nothing
    /// when state saving was disabled at build time.
    fn update(&self, ctx: &mut ExecutionContext) -> ItemStreamResult {
        let mut guard = self.state.borrow_mut();
        let state = guard
            .as_mut()
            .ok_or_else(|| BatchError::WriterNotOpen(self.name.clone()))?;

        if !self.save_state {
            return Ok(());
        }

        let offset = state.position().map_err(|error| {
            BatchError::Io(std::io::Error::new(
                error.kind(),
                format!("Failed to read position of {}: {}", state.path().display(), error),
            ))
        })?;
        ctx.put(self.context_key(RESTART_OFFSET_KEY), offset);
        ctx.put(self.context_key(ITEMS_WRITTEN_KEY), state.items_written());
        Ok(())
    }

    /// Writes the document suffix, flushes and releases the output file.
    /// Idempotent: closing a writer that is not open is a no-op.
    ///
    /// Resources are released on every exit path. When zero items were
    /// committed over the whole run and `delete_if_empty` was configured,
    /// the output file is removed afterwards. The first failure wins; later
    /// steps still run.
    fn close(&self) -> ItemStreamResult {
        let mut guard = self.state.borrow_mut();
        let Some(state) = guard.as_mut() else {
            return Ok(());
        };

        let path = state.path().to_path_buf();
        let items_written = state.items_written();
        debug!("Closing writer `{}` for {}", self.name, path.display());

        let mut first_error: Option<BatchError> = None;

        if let Err(source) = state.write(self.framing.footer()) {
            first_error = Some(BatchError::CloseFailed {
                path: path.clone(),
                source,
            });
        }
        if let Err(source) = state.close() {
            first_error.get_or_insert(BatchError::CloseFailed {
                path: path.clone(),
                source,
            });
        }
        *guard = None;

        if items_written == 0 && self.delete_if_empty {
            debug!("Deleting empty output file {}", path.display());
            if let Err(source) = fs::remove_file(&path) {
                first_error.get_or_insert(BatchError::CleanupFailed { path, source });
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn is_utf8(encoding: &str) -> bool {
    matches!(
        encoding.to_ascii_uppercase().as_str(),
        "UTF-8" | "UTF8" | "UTF_8"
    )
}

/// Builder for [`JsonFileItemWriter`] instances.
///
/// Configurable options:
/// - The output resource (mandatory) and the component name
/// - A root node to wrap the array in, or a bare array when absent
/// - Restart behavior: state saving, append mode, delete-if-exists,
///   delete-if-empty
/// - Output formatting: pretty printing, the line separator flushed after
///   the document prefix, forced storage syncs
///
/// # Examples
///
/// ```
/// use batch_json_writer::{ExecutionContext, ItemStream, ItemWriter};
/// use batch_json_writer::item::json::JsonFileItemWriterBuilder;
/// use serde::Serialize;
/// use tempfile::tempdir;
///
/// #[derive(Serialize)]
/// struct Car {
///     model: String,
///     year: u16,
/// }
///
/// let dir = tempdir().unwrap();
/// let path = dir.path().join("cars.json");
///
/// let writer = JsonFileItemWriterBuilder::new()
///     .name("car_writer")
///     .resource(&path)
///     .root_node("cars")
///     .build();
///
/// writer.open(&ExecutionContext::new()).unwrap();
/// writer.write(&[Car { model: "Aura".to_string(), year: 2021 }]).unwrap();
/// writer.close().unwrap();
/// ```
pub struct JsonFileItemWriterBuilder {
    name: String,
    resource: Option<PathBuf>,
    root_node: Option<String>,
    encoding: String,
    append: bool,
    delete_if_exists: bool,
    delete_if_empty: bool,
    force_sync: bool,
    pretty_formatter: bool,
    line_separator: String,
    header_line_separator: bool,
    save_state: bool,
}

impl Default for JsonFileItemWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonFileItemWriterBuilder {
    /// Creates a builder with default values: bare array framing, UTF-8
    /// encoding, delete-if-exists on, state saving on and a `\n` line
    /// separator flushed after the document prefix.
    pub fn new() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            resource: None,
            root_node: None,
            encoding: "UTF-8".to_string(),
            append: false,
            delete_if_exists: true,
            delete_if_empty: false,
            force_sync: false,
            pretty_formatter: false,
            line_separator: "\n".to_string(),
            header_line_separator: true,
            save_state: true,
        }
    }

    /// Sets the component name. The name prefixes the checkpoint keys, so
    /// two writers with distinct names can share one execution context.
    ///
    /// # Examples
    ///
    /// ```
    /// use batch_json_writer::item::json::JsonFileItemWriterBuilder;
    ///
    /// let builder = JsonFileItemWriterBuilder::new()
    ///     .name("person_writer");
    /// ```
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Sets the path of the output file.
    ///
    /// # Examples
    ///
    /// ```
    /// use batch_json_writer::item::json::JsonFileItemWriterBuilder;
    ///
    /// let builder = JsonFileItemWriterBuilder::new()
    ///     .resource("/tmp/persons.json");
    /// ```
    pub fn resource<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.resource = Some(path.as_ref().to_path_buf());
        self
    }

    /// Wraps the array in one object field with the given name. Without a
    /// root node the document is a bare array.
    ///
    /// # Examples
    ///
    /// ```
    /// use batch_json_writer::item::json::JsonFileItemWriterBuilder;
    ///
    /// let builder = JsonFileItemWriterBuilder::new()
    ///     .root_node("persons");
    /// ```
    pub fn root_node(mut self, root_node: &str) -> Self {
        self.root_node = Some(root_node.to_string());
        self
    }

    /// Sets the output encoding. Only UTF-8 spellings are accepted; `open`
    /// fails on anything else.
    pub fn encoding(mut self, encoding: &str) -> Self {
        self.encoding = encoding.to_string();
        self
    }

    /// Attaches to existing file content instead of recreating the file.
    /// Append mode turns `delete_if_exists` off.
    ///
    /// # Examples
    ///
    /// ```
    /// use batch_json_writer::item::json::JsonFileItemWriterBuilder;
    ///
    /// let builder = JsonFileItemWriterBuilder::new()
    ///     .append(true);
    /// ```
    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    /// Removes a pre-existing output file before a fresh run. On by
    /// default. When off, a fresh run over an existing file fails at
    /// `open`.
    pub fn delete_if_exists(mut self, delete_if_exists: bool) -> Self {
        self.delete_if_exists = delete_if_exists;
        self
    }

    /// Deletes the output file at `close` when zero items were committed
    /// over the whole run.
    ///
    /// # Examples
    ///
    /// ```
    /// use batch_json_writer::item::json::JsonFileItemWriterBuilder;
    ///
    /// let builder = JsonFileItemWriterBuilder::new()
    ///     .delete_if_empty(true);
    /// ```
    pub fn delete_if_empty(mut self, delete_if_empty: bool) -> Self {
        self.delete_if_empty = delete_if_empty;
        self
    }

    /// Forces the storage device to persist the data on every flush.
    pub fn force_sync(mut self, force_sync: bool) -> Self {
        self.force_sync = force_sync;
        self
    }

    /// Pretty-prints each encoded item instead of using the compact form.
    ///
    /// # Examples
    ///
    /// ```
    /// use batch_json_writer::item::json::JsonFileItemWriterBuilder;
    ///
    /// let builder = JsonFileItemWriterBuilder::new()
    ///     .pretty_formatter(true);
    /// ```
    pub fn pretty_formatter(mut self, yes: bool) -> Self {
        self.pretty_formatter = yes;
        self
    }

    /// Sets the line separator flushed together with the document prefix.
    pub fn line_separator(mut self, line_separator: &str) -> Self {
        self.line_separator = line_separator.to_string();
        self
    }

    /// Controls whether a line separator is flushed after the document
    /// prefix at all. On by default; turn it off for single-line output.
    pub fn header_line_separator(mut self, yes: bool) -> Self {
        self.header_line_separator = yes;
        self
    }

    /// Controls whether `update` publishes restart state into the
    /// execution context. On by default; turn it off for one-shot jobs
    /// that must not be restartable.
    pub fn save_state(mut self, save_state: bool) -> Self {
        self.save_state = save_state;
        self
    }

    /// Builds a writer that encodes items with [`SerdeJsonEncoder`],
    /// honoring the `pretty_formatter` option.
    pub fn build<T>(self) -> JsonFileItemWriter<T>
    where
        T: Serialize,
    {
        let encoder = SerdeJsonEncoder::new(self.pretty_formatter);
        self.build_with_encoder(encoder)
    }

    /// Builds a writer around a custom item encoder.
    pub fn build_with_encoder<T, E>(self, encoder: E) -> JsonFileItemWriter<T>
    where
        E: JsonItemEncoder<T> + 'static,
    {
        JsonFileItemWriter {
            name: self.name,
            resource: self.resource,
            encoding: self.encoding,
            framing: JsonFraming::from_root_node(self.root_node.as_deref()),
            separator_policy: SeparatorPolicy::default(),
            encoder: Box::new(encoder),
            line_separator: self.line_separator,
            header_line_separator: self.header_line_separator,
            append: self.append,
            // Appending into existing content and pre-cleaning the target
            // are mutually exclusive; append wins.
            delete_if_exists: if self.append { false } else { self.delete_if_exists },
            delete_if_empty: self.delete_if_empty,
            force_sync: self.force_sync,
            save_state: self.save_state,
            state: RefCell::new(None),
        }
    }
}
