use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::BatchError;

/// Result type returned by all [`ItemStream`] operations.
pub type ItemStreamResult = Result<(), BatchError>;

/// Durable restart marker of a stream: the output offset reached after the
/// last completed chunk, plus the number of items committed up to there.
///
/// The offset always equals the file size right after a completed `write`
/// call; it never points into the middle of an item fragment. Checkpoints
/// are produced by the stream, persisted by the driver between job attempts
/// and handed back unmodified at the next `open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Byte offset of the end of written data.
    pub offset: u64,
    /// Number of items committed so far.
    pub items_written: u64,
}

impl Checkpoint {
    /// Creates a checkpoint from an offset and an item count.
    pub fn new(offset: u64, items_written: u64) -> Self {
        Self {
            offset,
            items_written,
        }
    }
}

/// A string-keyed map of counters shared between a driver and its streams.
///
/// Streams publish their restart state into the context through
/// [`ItemStream::update`]; the driver persists the whole context together
/// with its own transaction bookkeeping and supplies it back at the next
/// [`ItemStream::open`]. The context serializes with `serde`, so it can be
/// stored wherever the driver keeps job metadata.
///
/// # Examples
///
/// ```
/// use batch_json_writer::core::stream::ExecutionContext;
///
/// let mut ctx = ExecutionContext::new();
/// ctx.put("my_writer.restart.offset", 128);
///
/// assert!(ctx.contains_key("my_writer.restart.offset"));
/// assert_eq!(ctx.get("my_writer.restart.offset"), Some(128));
/// assert_eq!(ctx.get("unknown"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    values: HashMap<String, u64>,
}

impl ExecutionContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a counter under the given key, replacing any previous value.
    pub fn put(&mut self, key: impl Into<String>, value: u64) {
        self.values.insert(key.into(), value);
    }

    /// Returns the counter stored under the given key, if any.
    pub fn get(&self, key: &str) -> Option<u64> {
        self.values.get(key).copied()
    }

    /// Returns `true` if a counter is stored under the given key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns `true` if no counters are stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of stored counters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterates over all stored key/counter pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.values.iter()
    }
}

/// Lifecycle contract between a driver and a restartable stream.
///
/// The driver serializes the calls on one instance: `open` once per job
/// attempt, `update` after every committed chunk, `close` once at the end.
/// `open` receives the context persisted by the previous attempt (or an
/// empty one on a first run) and restores the stream's position from it;
/// `update` writes the stream's current position back into the context.
pub trait ItemStream {
    /// Opens the stream, restoring any restart state found in the context.
    fn open(&self, ctx: &ExecutionContext) -> ItemStreamResult;

    /// Publishes the stream's current restart state into the context.
    fn update(&self, ctx: &mut ExecutionContext) -> ItemStreamResult;

    /// Closes the stream and releases its resources.
    fn close(&self) -> ItemStreamResult;
}
