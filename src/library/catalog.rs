//! Catalog of all books in the library.
//!
//! An id-keyed, insertion-ordered collection persisted as a JSON array of
//! book records.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::book::{Availability, Book, BookId};

/// Errors that abort a whole catalog load or save
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid catalog format in {0}: expected a JSON array of books")]
    Format(PathBuf),

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CatalogError {
    fn io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

/// Catalog of books keyed by id
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    books: IndexMap<BookId, Book>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON file.
    ///
    /// Records that fail to decode are logged and skipped; the rest of the
    /// file still loads. Missing files, malformed JSON and a top-level value
    /// that is not an array fail the whole load.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CatalogError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CatalogError::NotFound(path.to_path_buf()),
            _ => CatalogError::io(path, e),
        })?;

        let document: Value =
            serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let Value::Array(records) = document else {
            return Err(CatalogError::Format(path.to_path_buf()));
        };

        let mut catalog = Self::new();
        let mut skipped = 0usize;

        for (index, record) in records.iter().enumerate() {
            match Book::from_record_dict(record) {
                Ok(book) => {
                    catalog.insert(book);
                }
                Err(e) => {
                    skipped += 1;
                    warn!(index, path = %path.display(), error = %e, "Skipping malformed book record");
                }
            }
        }

        info!(
            path = %path.display(),
            books = catalog.len(),
            skipped,
            "Loaded catalog"
        );

        Ok(catalog)
    }

    /// Save the catalog to a JSON file, creating parent directories.
    ///
    /// An existing file is truncated and rewritten in place, so it keeps its
    /// permissions and a read-only file is reported as `PermissionDenied`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CatalogError> {
        let path = path.as_ref();
        let content = self.to_json()?;

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|e| CatalogError::io(parent, e))?;

        fs::write(path, content).map_err(|e| CatalogError::io(path, e))?;

        info!(path = %path.display(), books = self.len(), "Saved catalog");

        Ok(())
    }

    /// Serialize all books, in catalog order, as a four-space indented JSON array
    pub fn to_json(&self) -> Result<Vec<u8>, CatalogError> {
        let records: Vec<&Book> = self.books.values().collect();

        let mut buffer = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
        records.serialize(&mut serializer)?;

        Ok(buffer)
    }

    /// Add a book to the catalog.
    ///
    /// A book whose id is already taken gets a fresh id instead of replacing
    /// the existing entry. Returns the id the book was stored under.
    pub fn insert(&mut self, mut book: Book) -> BookId {
        while self.books.contains_key(&book.id) {
            let taken = book.id.clone();
            book.regenerate_id();
            debug!(%taken, id = %book.id, "Book id already in catalog, regenerated");
        }

        let id = book.id.clone();
        debug!(%id, title = %book.title, "Inserted book");
        self.books.insert(id.clone(), book);
        id
    }

    /// Remove a book by id. Unknown ids are ignored.
    pub fn remove(&mut self, id: &str) -> Option<Book> {
        let removed = self.books.shift_remove(id);
        if removed.is_some() {
            debug!(id, "Removed book");
        }
        removed
    }

    /// Get a book by id
    pub fn get(&self, id: &str) -> Option<&Book> {
        self.books.get(id)
    }

    /// Search books by query (case-insensitive substring of title, author or year).
    ///
    /// An empty query matches nothing.
    pub fn search(&self, query: &str) -> Vec<&Book> {
        if query.is_empty() {
            return Vec::new();
        }

        let query_lower = query.to_lowercase();

        self.books
            .values()
            .filter(|book| {
                book.title.to_lowercase().contains(&query_lower)
                    || book.author.to_lowercase().contains(&query_lower)
                    || book.year.to_lowercase().contains(&query_lower)
            })
            .collect()
    }

    /// Change a book's status from its label.
    ///
    /// Returns `false` without touching the catalog when the id is unknown or
    /// the label is not a recognized status.
    pub fn change_status(&mut self, id: &str, label: &str) -> bool {
        match Availability::from_label(label) {
            Some(availability) => self.set_availability(id, availability),
            None => false,
        }
    }

    /// Set a book's availability in place. Returns `false` for unknown ids.
    pub fn set_availability(&mut self, id: &str, availability: Availability) -> bool {
        match self.books.get_mut(id) {
            Some(book) => {
                book.available = availability.is_available();
                debug!(id, status = availability.label(), "Changed book status");
                true
            }
            None => false,
        }
    }

    /// Iterate over all books in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &Book> {
        self.books.values()
    }

    /// Get the number of books
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

impl std::fmt::Display for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "The library is empty");
        }

        for (i, book) in self.books.values().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", book)?;
        }

        Ok(())
    }
}
