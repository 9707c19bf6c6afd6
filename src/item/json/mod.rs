/// Restartable JSON document output for batch jobs.
///
/// This module provides a writer that serializes items into a single JSON
/// document while receiving them in separate, arbitrarily sized chunks over
/// the lifetime of a long-running job. The implementation uses `serde_json`
/// for item serialization.
///
/// # Module Architecture
///
/// The module consists of three components:
///
/// 1. **JsonFileItemWriter**: The writer itself. It opens the output file,
///    frames the document, places separators between items regardless of how
///    the chunks were cut, and publishes a byte offset plus an item counter
///    into an execution context after every committed chunk. When a later
///    job attempt hands the same context back, writing resumes at that
///    offset; bytes left behind by a crash are truncated away first.
///
/// 2. **JsonItemEncoder / SerdeJsonEncoder**: Pluggable conversion of one
///    item into a JSON text fragment. The default encoder wraps
///    `serde_json` in compact or pretty form; an item that fails to encode
///    degrades to an empty fragment instead of aborting the chunk.
///
/// 3. **JsonFraming**: The document shape, either a bare array or an array
///    wrapped in one named root field.
///
/// # Features
///
/// - One syntactically valid JSON document no matter how items were chunked
/// - Crash recovery from the last committed checkpoint, with tail truncation
/// - Append mode, pre-cleaning of stale files, deletion of empty output
/// - Compact or pretty-printed items, optional named root node
///
/// # Examples
///
/// Writing a document across several chunks, checkpointing after each one
/// and resuming after a simulated crash:
///
/// ```
/// use batch_json_writer::{ExecutionContext, ItemStream, ItemWriter};
/// use batch_json_writer::item::json::JsonFileItemWriterBuilder;
/// use serde_json::json;
/// use tempfile::tempdir;
///
/// # fn main() -> Result<(), batch_json_writer::BatchError> {
/// let dir = tempdir().unwrap();
/// let path = dir.path().join("events.json");
/// let mut ctx = ExecutionContext::new();
///
/// // First attempt: two chunks are committed, then the job dies without
/// // closing the writer.
/// let writer = JsonFileItemWriterBuilder::new()
///     .name("event_writer")
///     .resource(&path)
///     .build();
/// writer.open(&ctx)?;
/// writer.write(&[json!({"id": 1}), json!({"id": 2})])?;
/// writer.update(&mut ctx)?;
/// writer.write(&[json!({"id": 3})])?;
/// writer.update(&mut ctx)?;
/// drop(writer);
///
/// // Second attempt: the persisted context resumes writing after id 3.
/// let writer = JsonFileItemWriterBuilder::new()
///     .name("event_writer")
///     .resource(&path)
///     .build();
/// writer.open(&ctx)?;
/// writer.write(&[json!({"id": 4})])?;
/// writer.close()?;
///
/// let content = std::fs::read_to_string(&path).unwrap();
/// assert_eq!(content, "[\n{\"id\":1},{\"id\":2},{\"id\":3},{\"id\":4}]");
/// # Ok(())
/// # }
/// ```
pub mod json_writer;
/// Pluggable encoding of single items into JSON text fragments.
pub mod encoder;
/// Document framing: a bare array, or an array wrapped in one named root field.
pub mod framing;
mod output_state;
mod separator;

// Re-export the main types for easier access
pub use encoder::{JsonItemEncoder, SerdeJsonEncoder};
pub use framing::JsonFraming;
pub use json_writer::{
    DEFAULT_NAME, ITEMS_WRITTEN_KEY, JsonFileItemWriter, JsonFileItemWriterBuilder,
    RESTART_OFFSET_KEY,
};
