use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Batch error
#[derive(Error, Debug)]
pub enum BatchError {
    /// The writer is missing mandatory configuration, for example no output
    /// path was set before `open`, or the configured encoding is unsupported.
    #[error("Writer is not configured: {0}")]
    NotConfigured(String),

    /// An operation that requires an open writer was invoked before `open`
    /// succeeded, or after `close`.
    #[error("Writer is not open: {0}")]
    WriterNotOpen(String),

    /// An item batch could not be appended to the output file. The committed
    /// item counter is not advanced, so re-delivering the same batch is safe.
    #[error("Could not write data to `{path}` ({items_written} items committed)")]
    WriteFailed {
        path: PathBuf,
        items_written: u64,
        #[source]
        source: io::Error,
    },

    /// At restart the on-disk file is smaller than the restored checkpoint
    /// offset. The file was damaged or truncated externally and the job must
    /// restart from empty output.
    #[error("Output file `{path}` is {size} bytes, smaller than the restored checkpoint offset {offset}")]
    CorruptedOutput { path: PathBuf, size: u64, offset: u64 },

    /// A single item could not be encoded to a JSON fragment.
    #[error("Could not encode item to JSON: {0}")]
    Encoding(String),

    /// Writing the document suffix or the final flush failed while closing.
    /// Resources are released regardless.
    #[error("Failed to close output file `{path}`")]
    CloseFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Deleting the output file of an empty run failed. Resources are
    /// released regardless.
    #[error("Failed to delete empty output file `{path}`")]
    CleanupFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any other I/O failure, with the failing path in the message.
    #[error("IO error: {0}")]
    Io(io::Error),
}
