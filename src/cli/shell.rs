//! Interactive numbered menu over a catalog.
//!
//! The shell reads commands line by line from any `BufRead` and writes
//! prompts and results to any `Write`, so it runs the same against a
//! terminal or a scripted buffer. End of input behaves like the exit command.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::Result;

use crate::library::{Availability, Book, Catalog, AVAILABLE_LABEL, CHECKED_OUT_LABEL};

pub const MENU: &str = "\
1 - list books
2 - load a library file
3 - save to a file
4 - add a book
5 - remove a book
6 - change a book's status
7 - search books
8 - exit
9 - show commands";

/// Interactive session holding the working catalog
pub struct Shell<R, W> {
    catalog: Catalog,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(catalog: Catalog, input: R, output: W) -> Self {
        Self {
            catalog,
            input,
            output,
        }
    }

    /// Consume the shell, returning the catalog as edited
    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }

    /// Run the menu loop until exit or end of input
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.output, "Welcome to the library manager! Available commands:")?;
        writeln!(self.output, "{}", MENU)?;

        while let Some(command) = self.prompt("Choose an action (9 - show commands): ")? {
            match command.as_str() {
                "1" => self.print_library()?,
                "2" => self.load_from_file()?,
                "3" => self.save_to_file()?,
                "4" => self.add_book()?,
                "5" => self.remove_book()?,
                "6" => self.change_status()?,
                "7" => self.search()?,
                "8" => break,
                "9" => writeln!(self.output, "{}", MENU)?,
                _ => writeln!(
                    self.output,
                    "Unknown command, please enter a number from 1 to 9"
                )?,
            }
        }

        Ok(())
    }

    /// Print a prompt and read one trimmed line; `None` at end of input
    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim().to_string()))
    }

    fn print_library(&mut self) -> Result<()> {
        writeln!(self.output, "{}", self.catalog)?;
        Ok(())
    }

    fn load_from_file(&mut self) -> Result<()> {
        let Some(path) = self.prompt("Path to an existing library .json file: ")? else {
            return Ok(());
        };

        if !Path::new(&path).exists() {
            writeln!(self.output, "Invalid file path")?;
            return Ok(());
        }

        match Catalog::load(&path) {
            Ok(catalog) => {
                self.catalog = catalog;
                writeln!(self.output, "Library file {} loaded", path)?;
            }
            Err(e) => writeln!(self.output, "Failed to load library: {}", e)?,
        }

        Ok(())
    }

    fn save_to_file(&mut self) -> Result<()> {
        let Some(path) = self.prompt("File name: ")? else {
            return Ok(());
        };

        if Path::new(&path).exists() {
            let Some(answer) =
                self.prompt("File already exists. Overwrite? (anything but yes means no) ")?
            else {
                return Ok(());
            };

            if answer.to_lowercase() != "yes" {
                writeln!(self.output, "Save cancelled")?;
                return Ok(());
            }
        }

        match self.catalog.save(&path) {
            Ok(()) => {
                let shown = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone().into());
                writeln!(self.output, "Library saved to {}", shown.display())?;
            }
            Err(e) => writeln!(self.output, "Failed to save library: {}", e)?,
        }

        Ok(())
    }

    fn add_book(&mut self) -> Result<()> {
        writeln!(self.output, "Adding a new book")?;

        let Some(title) = self.prompt("Title: ")? else {
            return Ok(());
        };
        let Some(author) = self.prompt("Author: ")? else {
            return Ok(());
        };
        let Some(year) = self.prompt("Year published: ")? else {
            return Ok(());
        };

        let id = self.catalog.insert(Book::new(title.as_str(), author, year));
        writeln!(self.output, "Book {} added to the library with id {}", title, id)?;

        Ok(())
    }

    fn remove_book(&mut self) -> Result<()> {
        let Some(id) = self.prompt("Id of the book to remove: ")? else {
            return Ok(());
        };

        match self.catalog.remove(&id) {
            Some(book) => writeln!(self.output, "Removed book {}", book)?,
            None => writeln!(self.output, "No book with id {} in the library", id)?,
        }

        Ok(())
    }

    fn change_status(&mut self) -> Result<()> {
        let Some(id) = self.prompt("Id of the book whose status to change: ")? else {
            return Ok(());
        };

        let Some(title) = self.catalog.get(&id).map(|book| book.title.clone()) else {
            writeln!(self.output, "No book with id {} in the library", id)?;
            return Ok(());
        };

        let message = format!("New status ({}/{}): ", AVAILABLE_LABEL, CHECKED_OUT_LABEL);
        let Some(label) = self.prompt(&message)? else {
            return Ok(());
        };

        let Some(availability) = Availability::from_label(&label) else {
            writeln!(
                self.output,
                "Unknown status, possible values: {}, {}",
                AVAILABLE_LABEL, CHECKED_OUT_LABEL
            )?;
            return Ok(());
        };

        self.catalog.set_availability(&id, availability);
        writeln!(
            self.output,
            "Status of {} changed to {}",
            title,
            availability.label()
        )?;

        Ok(())
    }

    fn search(&mut self) -> Result<()> {
        let Some(query) = self.prompt("Search query (title/author/year): ")? else {
            return Ok(());
        };

        let results = self.catalog.search(&query);
        if results.is_empty() {
            writeln!(self.output, "No books match your query")?;
        } else {
            for book in results {
                writeln!(self.output, "{}", book)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_script(catalog: Catalog, script: &str) -> (Catalog, String) {
        let mut output = Vec::new();
        let mut shell = Shell::new(catalog, Cursor::new(script.to_string()), &mut output);
        shell.run().unwrap();
        let catalog = shell.into_catalog();
        (catalog, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_exit_and_eof() {
        let (_, output) = run_script(Catalog::new(), "8\n1\n");
        assert!(output.contains("Welcome"));
        assert!(!output.contains("The library is empty"));

        let (_, output) = run_script(Catalog::new(), "1\n");
        assert!(output.contains("The library is empty"));
    }

    #[test]
    fn test_unknown_command() {
        let (_, output) = run_script(Catalog::new(), "42\n8\n");
        assert!(output.contains("Unknown command"));
    }

    #[test]
    fn test_add_then_search() {
        let (catalog, output) = run_script(
            Catalog::new(),
            "4\nDune\nFrank Herbert\n1965\n7\nherbert\n7\nasimov\n8\n",
        );

        assert_eq!(catalog.len(), 1);
        assert!(output.contains("Book Dune added to the library with id"));
        assert!(output.contains("Title: Dune, Author: Frank Herbert, Year: 1965 -> in stock"));
        assert!(output.contains("No books match your query"));
    }

    #[test]
    fn test_change_status_validates_id_and_label() {
        let mut catalog = Catalog::new();
        catalog.insert(Book::new("Dune", "Frank Herbert", "1965").with_id("dune"));

        let (catalog, output) =
            run_script(catalog, "6\nmissing\n6\ndune\nlost\n6\ndune\nChecked Out\n8\n");

        assert!(output.contains("No book with id missing in the library"));
        assert!(output.contains("Unknown status"));
        assert!(output.contains("Status of Dune changed to checked out"));
        assert!(!catalog.get("dune").unwrap().available);
    }

    #[test]
    fn test_remove_book() {
        let mut catalog = Catalog::new();
        catalog.insert(Book::new("Dune", "Frank Herbert", "1965").with_id("dune"));

        let (catalog, output) = run_script(catalog, "5\nnope\n5\ndune\n8\n");

        assert!(output.contains("No book with id nope in the library"));
        assert!(output.contains("Removed book ID: dune"));
        assert!(catalog.is_empty());
    }
}
