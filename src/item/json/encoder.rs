use serde::Serialize;

use crate::error::BatchError;

/// Converts one record into a JSON text fragment.
///
/// The writer treats fragments as opaque text: whatever the encoder returns
/// is placed between the separators and framing of the document, with no
/// whitespace requirements imposed. A failing record never aborts its chunk;
/// the writer logs the error and emits an empty fragment in the record's
/// place.
pub trait JsonItemEncoder<T> {
    /// Encodes one record to a JSON fragment.
    fn encode(&self, item: &T) -> Result<String, BatchError>;
}

/// Default encoder backed by `serde_json`, producing compact or
/// pretty-printed fragments.
///
/// # Examples
///
/// ```
/// use batch_json_writer::item::json::encoder::{JsonItemEncoder, SerdeJsonEncoder};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Person {
///     name: String,
///     age: u8,
/// }
///
/// let person = Person { name: "Alice".to_string(), age: 30 };
///
/// let compact = SerdeJsonEncoder::default();
/// assert_eq!(compact.encode(&person).unwrap(), r#"{"name":"Alice","age":30}"#);
///
/// let pretty = SerdeJsonEncoder::new(true);
/// assert_eq!(
///     pretty.encode(&person).unwrap(),
///     "{\n  \"name\": \"Alice\",\n  \"age\": 30\n}"
/// );
/// ```
#[derive(Debug, Default)]
pub struct SerdeJsonEncoder {
    pretty: bool,
}

impl SerdeJsonEncoder {
    /// Creates an encoder; `pretty` switches on multi-line indented output.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl<T: Serialize> JsonItemEncoder<T> for SerdeJsonEncoder {
    fn encode(&self, item: &T) -> Result<String, BatchError> {
        let result = if self.pretty {
            serde_json::to_string_pretty(item)
        } else {
            serde_json::to_string(item)
        };
        result.map_err(|error| BatchError::Encoding(error.to_string()))
    }
}
