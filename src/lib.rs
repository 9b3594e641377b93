//! bookshelf - Personal library catalog
//!
//! Keeps book records in memory and persists them as a JSON array.
//!
//! # Modules
//!
//! - `library`: Book records and the id-keyed catalog (load/save/search)
//! - `config`: Path resolution (env vars, config file, defaults)
//! - `cli`: Command-line interface and interactive menu
//!
//! # Usage
//!
//! ```bash
//! # Add a book
//! bookshelf add "Dune" "Frank Herbert" 1965
//!
//! # Find it again
//! bookshelf search herbert
//!
//! # Lend it out
//! bookshelf status <book-id> "checked out"
//!
//! # Interactive menu
//! bookshelf shell
//! ```

pub mod cli;
pub mod config;
pub mod library;

// Re-export main types at crate root for convenience
pub use library::{Availability, Book, BookId, Catalog, CatalogError, RecordError};
