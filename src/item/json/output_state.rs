use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::core::stream::Checkpoint;
use crate::error::BatchError;

/// Runtime state of one output file attempt: the only unit that touches
/// storage.
///
/// Created lazily at `open`, torn down at `close`. Holds its own copy of the
/// file-related configuration so it can be exercised without the writer that
/// owns it. Writes are append-only and flushed one blob at a time, so the
/// file size always equals the end of written data.
#[derive(Debug)]
pub(crate) struct OutputState {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    append: bool,
    delete_if_exists: bool,
    delete_if_empty: bool,
    force_sync: bool,
    restarted: bool,
    appending: bool,
    initialized: bool,
    last_marked_offset: u64,
    items_written: u64,
}

impl OutputState {
    pub(crate) fn new(
        path: PathBuf,
        append: bool,
        delete_if_exists: bool,
        delete_if_empty: bool,
        force_sync: bool,
    ) -> Self {
        Self {
            path,
            writer: None,
            append,
            delete_if_exists,
            delete_if_empty,
            force_sync,
            restarted: false,
            appending: false,
            initialized: false,
            last_marked_offset: 0,
            items_written: 0,
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn is_appending(&self) -> bool {
        self.appending
    }

    pub(crate) fn last_marked_offset(&self) -> u64 {
        self.last_marked_offset
    }

    pub(crate) fn items_written(&self) -> u64 {
        self.items_written
    }

    /// Advances the committed item counter after a fully written chunk.
    pub(crate) fn commit_items(&mut self, count: u64) {
        self.items_written += count;
    }

    /// Applies a restored checkpoint before initialization.
    ///
    /// When `delete_if_empty` is configured and the checkpoint reports zero
    /// items, the previous attempt deleted its empty output at close; the
    /// remembered offset points into a file that no longer exists, so the
    /// run starts from scratch instead of resuming.
    pub(crate) fn restore_from(&mut self, checkpoint: Checkpoint) {
        if self.delete_if_empty && checkpoint.items_written == 0 {
            self.restarted = false;
            self.last_marked_offset = 0;
            self.items_written = 0;
            return;
        }
        self.restarted = true;
        self.last_marked_offset = checkpoint.offset;
        self.items_written = checkpoint.items_written;
    }

    /// Brings the state from `Uninitialized` to `Ready`: validates the
    /// target, opens it for appending and, when restarting, truncates the
    /// uncommitted tail down to the restored offset.
    pub(crate) fn initialize(&mut self) -> Result<(), BatchError> {
        if self.initialized {
            return Ok(());
        }

        if self.restarted {
            // The size check runs against the path before the file is
            // opened: a failed restart must not mutate the target, not even
            // by re-creating a deleted file.
            let size = match fs::metadata(&self.path) {
                Ok(metadata) => metadata.len(),
                Err(error) if error.kind() == io::ErrorKind::NotFound => 0,
                Err(error) => {
                    return Err(BatchError::Io(io::Error::new(
                        error.kind(),
                        format!("Failed to inspect output file {}: {}", self.path.display(), error),
                    )));
                }
            };
            if size < self.last_marked_offset {
                return Err(BatchError::CorruptedOutput {
                    path: self.path.clone(),
                    size,
                    offset: self.last_marked_offset,
                });
            }
        } else if !self.append && self.path.exists() {
            if !self.delete_if_exists {
                return Err(BatchError::Io(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("Output file already exists: {}", self.path.display()),
                )));
            }
            fs::remove_file(&self.path).map_err(|error| {
                BatchError::Io(io::Error::new(
                    error.kind(),
                    format!("Failed to delete output file {}: {}", self.path.display(), error),
                ))
            })?;
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|error| {
                    BatchError::Io(io::Error::new(
                        error.kind(),
                        format!("Failed to create directory {}: {}", parent.display(), error),
                    ))
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|error| {
                BatchError::Io(io::Error::new(
                    error.kind(),
                    format!("Failed to open output file {}: {}", self.path.display(), error),
                ))
            })?;

        let size = file
            .metadata()
            .map_err(|error| {
                BatchError::Io(io::Error::new(
                    error.kind(),
                    format!("Failed to inspect output file {}: {}", self.path.display(), error),
                ))
            })?
            .len();
        if self.append && size > 0 {
            self.appending = true;
        }

        if self.restarted {
            debug!(
                "Truncating {} from {} to restored offset {}",
                self.path.display(),
                size,
                self.last_marked_offset
            );
            file.set_len(self.last_marked_offset).map_err(|error| {
                BatchError::Io(io::Error::new(
                    error.kind(),
                    format!("Failed to truncate output file {}: {}", self.path.display(), error),
                ))
            })?;
        }

        self.writer = Some(BufWriter::new(file));
        self.initialized = true;
        Ok(())
    }

    /// Appends raw text at the cursor and flushes it as one durable unit.
    pub(crate) fn write(&mut self, text: &str) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.write_all(text.as_bytes())?,
            None => return Err(io::Error::other("output file is not initialized")),
        }
        self.flush()
    }

    pub(crate) fn flush(&mut self) -> io::Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
            if self.force_sync {
                writer.get_ref().sync_data()?;
            }
        }
        Ok(())
    }

    /// True end-of-written-data offset. Writes are append-only and the tail
    /// was truncated at initialization, so the file size is the position.
    pub(crate) fn position(&mut self) -> io::Result<u64> {
        self.flush()?;
        match self.writer.as_ref() {
            Some(writer) => Ok(writer.get_ref().metadata()?.len()),
            None => Ok(0),
        }
    }

    /// Flushes and releases the file handle. The state cannot be written to
    /// afterwards.
    pub(crate) fn close(&mut self) -> io::Result<()> {
        self.initialized = false;
        self.restarted = false;
        let result = self.flush();
        self.writer = None;
        result
    }
}
