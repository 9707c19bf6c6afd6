use serde_json::Value;

/// Structural framing of a JSON document surrounding the record sequence.
///
/// The header is the opening structural prefix, written exactly once before
/// the first record of the document; the footer is the closing suffix,
/// written exactly once at a clean close. New document shapes are added as
/// new variants.
///
/// # Examples
///
/// ```
/// use batch_json_writer::item::json::framing::JsonFraming;
///
/// let bare = JsonFraming::from_root_node(None);
/// assert_eq!(bare.header(), "[");
/// assert_eq!(bare.footer(), "]");
///
/// let wrapped = JsonFraming::from_root_node(Some("Persons"));
/// assert_eq!(wrapped.header(), r#"{"Persons":["#);
/// assert_eq!(wrapped.footer(), "]}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonFraming {
    /// A bare top-level array: `[ ... ]`.
    BareArray,
    /// An object wrapping the array in one named field: `{"<name>":[ ... ]}`.
    RootObject(String),
}

impl JsonFraming {
    /// Builds the framing for an optional root field name. An absent or
    /// empty name produces a bare array.
    pub fn from_root_node(root_node: Option<&str>) -> Self {
        match root_node {
            Some(name) if !name.is_empty() => Self::RootObject(name.to_string()),
            _ => Self::BareArray,
        }
    }

    /// Opening structural prefix of the document.
    ///
    /// Root field names are JSON-escaped, so any string is a valid name.
    pub fn header(&self) -> String {
        match self {
            Self::BareArray => "[".to_string(),
            Self::RootObject(name) => {
                let mut header = String::with_capacity(name.len() + 6);
                header.push('{');
                header.push_str(&Value::String(name.clone()).to_string());
                header.push_str(":[");
                header
            }
        }
    }

    /// Closing structural suffix of the document.
    pub fn footer(&self) -> &'static str {
        match self {
            Self::BareArray => "]",
            Self::RootObject(_) => "]}",
        }
    }
}
