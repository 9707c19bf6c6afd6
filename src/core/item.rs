use crate::error::BatchError;

/// Result type returned by all [`ItemWriter`] operations.
pub type ItemWriterResult = Result<(), BatchError>;

/// An abstraction for writing one chunk of items at a time.
///
/// Implementations receive the items of a chunk as a slice and decide how to
/// persist them. Writers that buffer internally can override [`flush`] to
/// push staged data to the underlying target.
///
/// [`flush`]: ItemWriter::flush
///
/// # Examples
///
/// ```
/// use batch_json_writer::core::item::{ItemWriter, ItemWriterResult};
/// use std::cell::RefCell;
///
/// struct VecWriter {
///     items: RefCell<Vec<String>>,
/// }
///
/// impl ItemWriter<String> for VecWriter {
///     fn write(&self, items: &[String]) -> ItemWriterResult {
///         self.items.borrow_mut().extend_from_slice(items);
///         Ok(())
///     }
/// }
///
/// let writer = VecWriter { items: RefCell::new(Vec::new()) };
/// writer.write(&["a".to_string(), "b".to_string()]).unwrap();
/// assert_eq!(writer.items.borrow().len(), 2);
/// ```
pub trait ItemWriter<O> {
    /// Writes one chunk of items to the target.
    fn write(&self, items: &[O]) -> ItemWriterResult;

    /// Pushes any internally staged data to the underlying target.
    fn flush(&self) -> ItemWriterResult {
        Ok(())
    }
}
