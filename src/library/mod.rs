//! Book catalog and its JSON persistence.
//!
//! # Storage Layout
//!
//! ```text
//! ~/.bookshelf/
//! └── catalog.json    # JSON array of book records
//! ```
//!
//! Each record has the shape
//! `{"id": "...", "title": "...", "author": "...", "year": "...", "status": true}`,
//! where `status` is the availability flag.

pub mod book;
pub mod catalog;

pub use book::{Availability, Book, BookId, RecordError, AVAILABLE_LABEL, CHECKED_OUT_LABEL};
pub use catalog::{Catalog, CatalogError};
