//! Command-line interface for bookshelf.
//!
//! One-shot commands load the catalog file, apply a single change and save
//! it back. `shell` starts the interactive menu instead.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config;
use crate::library::{Availability, Book, Catalog, CatalogError, AVAILABLE_LABEL, CHECKED_OUT_LABEL};

pub mod shell;

pub use shell::Shell;

/// bookshelf - Personal library catalog
#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Catalog file (defaults to the configured catalog)
    #[arg(short, long, global = true, env = "BOOKSHELF_CATALOG")]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all books
    List,

    /// Add a book
    Add {
        title: String,

        author: String,

        /// Publication year (any text is accepted)
        year: String,

        /// Record the book as already checked out
        #[arg(long)]
        checked_out: bool,
    },

    /// Remove a book
    Remove {
        /// Book ID
        id: String,
    },

    /// Change a book's status
    Status {
        /// Book ID
        id: String,

        /// New status ("in stock" or "checked out")
        status: String,
    },

    /// Search books by title, author or year
    Search {
        /// Search query
        query: String,
    },

    /// Show a single book
    Show {
        /// Book ID
        id: String,
    },

    /// Start the interactive menu
    Shell,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let catalog_path = match self.catalog {
            Some(path) => path,
            None => config::catalog_path()?,
        };

        match self.command {
            Commands::List => list_books(&catalog_path),
            Commands::Add {
                title,
                author,
                year,
                checked_out,
            } => add_book(&catalog_path, title, author, year, checked_out),
            Commands::Remove { id } => remove_book(&catalog_path, &id),
            Commands::Status { id, status } => change_status(&catalog_path, &id, &status),
            Commands::Search { query } => search_books(&catalog_path, &query),
            Commands::Show { id } => show_book(&catalog_path, &id),
            Commands::Shell => run_shell(&catalog_path),
            Commands::Config => show_config(&catalog_path),
        }
    }
}

/// Load the catalog file, treating a missing file as an empty catalog
pub fn open_catalog(path: &Path) -> Result<Catalog> {
    match Catalog::load(path) {
        Ok(catalog) => Ok(catalog),
        Err(CatalogError::NotFound(_)) => Ok(Catalog::new()),
        Err(e) => Err(e).with_context(|| format!("Failed to open catalog: {}", path.display())),
    }
}

fn save_catalog(catalog: &Catalog, path: &Path) -> Result<()> {
    catalog
        .save(path)
        .with_context(|| format!("Failed to save catalog: {}", path.display()))
}

fn list_books(path: &Path) -> Result<()> {
    let catalog = open_catalog(path)?;
    println!("{}", catalog);
    Ok(())
}

fn add_book(path: &Path, title: String, author: String, year: String, checked_out: bool) -> Result<()> {
    let mut catalog = open_catalog(path)?;

    let book = Book::new(title.as_str(), author, year).with_available(!checked_out);
    let id = catalog.insert(book);
    save_catalog(&catalog, path)?;

    println!("Book {} added to the library with id {}", title, id);
    Ok(())
}

fn remove_book(path: &Path, id: &str) -> Result<()> {
    let mut catalog = open_catalog(path)?;

    let Some(book) = catalog.remove(id) else {
        anyhow::bail!("No book with id {} in the library", id);
    };
    save_catalog(&catalog, path)?;

    println!("Removed book {}", book);
    Ok(())
}

fn change_status(path: &Path, id: &str, label: &str) -> Result<()> {
    let Some(availability) = Availability::from_label(label) else {
        anyhow::bail!(
            "Unknown status '{}', possible values: {}, {}",
            label,
            AVAILABLE_LABEL,
            CHECKED_OUT_LABEL
        );
    };

    let mut catalog = open_catalog(path)?;
    if !catalog.set_availability(id, availability) {
        anyhow::bail!("No book with id {} in the library", id);
    }
    save_catalog(&catalog, path)?;

    println!("Status of {} changed to {}", id, availability.label());
    Ok(())
}

fn search_books(path: &Path, query: &str) -> Result<()> {
    let catalog = open_catalog(path)?;
    let results = catalog.search(query);

    if results.is_empty() {
        println!("No books match your query");
        return Ok(());
    }

    for book in results {
        println!("{}", book);
    }

    Ok(())
}

fn show_book(path: &Path, id: &str) -> Result<()> {
    let catalog = open_catalog(path)?;
    let book = catalog
        .get(id)
        .with_context(|| format!("No book with id {} in the library", id))?;

    println!("{}", book);
    Ok(())
}

fn run_shell(path: &Path) -> Result<()> {
    let catalog = open_catalog(path)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(catalog, stdin.lock(), stdout.lock());
    shell.run()
}

fn show_config(catalog_path: &Path) -> Result<()> {
    let config = config::config()?;

    println!("Bookshelf Configuration");
    println!("=======================");
    println!();
    println!("Home:    {}", config.home.display());
    println!("Catalog: {}", catalog_path.display());
    match &config.config_file {
        Some(file) => println!("Config:  {}", file.display()),
        None => println!("Config:  (none, using defaults)"),
    }

    Ok(())
}
