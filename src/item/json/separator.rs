/// Separator emitted between two JSON fragments.
pub(crate) const ITEM_SEPARATOR: &str = ",";

/// Decides where item separators go when a chunk is assembled into one
/// contiguous text blob.
///
/// A separator belongs before a record exactly when the record is not the
/// first of the whole document: either another record precedes it inside the
/// same chunk, or earlier chunks already committed records. Nothing is ever
/// emitted after a record; whatever follows is decided by the next chunk or
/// by the document suffix. Chunk boundaries therefore leave no trace in the
/// output.
pub(crate) struct SeparatorPolicy {
    separator: String,
}

impl SeparatorPolicy {
    pub(crate) fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    pub(crate) fn separator(&self) -> &str {
        &self.separator
    }

    /// `true` when a separator belongs right before the record at
    /// `index_in_chunk`, given `items_written` records committed by earlier
    /// chunks.
    pub(crate) fn needs_separator_before(&self, index_in_chunk: usize, items_written: u64) -> bool {
        index_in_chunk > 0 || items_written > 0
    }
}

impl Default for SeparatorPolicy {
    fn default() -> Self {
        Self::new(ITEM_SEPARATOR)
    }
}
