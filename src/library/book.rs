//! Book records and their persisted JSON shape.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Label shown for a book that is on the shelf
pub const AVAILABLE_LABEL: &str = "in stock";

/// Label shown for a book that has been lent out
pub const CHECKED_OUT_LABEL: &str = "checked out";

/// Keys of the persisted record object, in serialization order
pub const RECORD_FIELDS: [&str; 5] = ["id", "title", "author", "year", "status"];

/// Errors raised while decoding a single persisted record
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Record is missing field '{0}'")]
    MissingField(&'static str),

    #[error("Field '{field}' must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Record is not a JSON object")]
    NotAnObject,
}

/// Unique book identifier (UUID v4 string for generated ids)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the raw string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for BookId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for BookId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// Lets the catalog map be queried with a plain `&str`.
impl Borrow<str> for BookId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Availability of a book, parsed from its human-facing label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// On the shelf
    Available,

    /// Lent out
    CheckedOut,
}

impl Availability {
    /// Parse a status label (case-insensitive). Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            AVAILABLE_LABEL => Some(Self::Available),
            CHECKED_OUT_LABEL => Some(Self::CheckedOut),
            _ => None,
        }
    }

    /// Human-facing label
    pub fn label(self) -> &'static str {
        match self {
            Self::Available => AVAILABLE_LABEL,
            Self::CheckedOut => CHECKED_OUT_LABEL,
        }
    }

    pub fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

impl From<bool> for Availability {
    fn from(available: bool) -> Self {
        if available {
            Self::Available
        } else {
            Self::CheckedOut
        }
    }
}

/// A single book in the catalog.
///
/// Serializes to the persisted record shape: `id, title, author, year, status`,
/// where `status` carries the availability flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    /// Catalog identity; only rewritten by the catalog on collision
    pub id: BookId,

    pub title: String,

    pub author: String,

    /// Publication year, kept verbatim as text
    pub year: String,

    /// `true` when the book is in stock
    #[serde(rename = "status")]
    pub available: bool,
}

impl Book {
    /// Create a new available book with a freshly generated id
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        year: impl ToString,
    ) -> Self {
        Self {
            id: BookId::generate(),
            title: title.into(),
            author: author.into(),
            year: year.to_string(),
            available: true,
        }
    }

    /// Use a specific id. An empty id keeps the generated one.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if !id.is_empty() {
            self.id = BookId::from(id);
        }
        self
    }

    /// Set the availability flag
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Replace the id with a fresh random one
    pub fn regenerate_id(&mut self) {
        self.id = BookId::generate();
    }

    pub fn availability(&self) -> Availability {
        Availability::from(self.available)
    }

    /// Human-facing availability label
    pub fn display_status(&self) -> &'static str {
        self.availability().label()
    }

    /// Convert to the persisted record object
    pub fn to_record_dict(&self) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert("id".into(), Value::String(self.id.to_string()));
        record.insert("title".into(), Value::String(self.title.clone()));
        record.insert("author".into(), Value::String(self.author.clone()));
        record.insert("year".into(), Value::String(self.year.clone()));
        record.insert("status".into(), Value::Bool(self.available));
        record
    }

    /// Build a book from a persisted record object.
    ///
    /// All five record keys must be present. `year` and `id` accept any scalar
    /// and are stringified; `status` is false only for a false-equivalent value
    /// (`false`, `null`, `0`, `""`, `[]`, `{}`), anything else means available.
    /// An `id` that is itself false-equivalent gets a freshly generated one.
    pub fn from_record_dict(data: &Value) -> Result<Self, RecordError> {
        let record = data.as_object().ok_or(RecordError::NotAnObject)?;

        if let Some(missing) = RECORD_FIELDS
            .iter()
            .copied()
            .find(|key| !record.contains_key(*key))
        {
            return Err(RecordError::MissingField(missing));
        }

        let title = text_field(record, "title")?;
        let author = text_field(record, "author")?;
        let year = stringify(&record["year"]);
        let available = is_truthy(&record["status"]);

        let book = Self::new(title, author, year).with_available(available);

        let id = &record["id"];
        Ok(if is_truthy(id) {
            book.with_id(stringify(id))
        } else {
            book
        })
    }
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ID: {}; Title: {}, Author: {}, Year: {} -> {}",
            self.id,
            self.title,
            self.author,
            self.year,
            self.display_status()
        )
    }
}

fn text_field(record: &Map<String, Value>, field: &'static str) -> Result<String, RecordError> {
    match &record[field] {
        Value::String(s) => Ok(s.clone()),
        _ => Err(RecordError::InvalidField {
            field,
            expected: "a string",
        }),
    }
}

/// Text form of a JSON value; strings are taken without quotes
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}
