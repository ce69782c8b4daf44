//! Library data source
//!
//! Owns the SQLite connection holding the authors, books and genres the
//! query strategies are compared against. Example code receives a
//! [`Library`] explicitly; nothing here is global.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::Result;

pub mod models;
pub mod seed;

pub use models::{Author, Book, Genre};
pub use seed::{maybe_populate, SeedConfig, SeedOutcome};

/// SQLite's default limit on bound parameters is 999; stay below it.
pub const SQLITE_MAX_PARAMS: usize = 900;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS author (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        bio TEXT,
        birth_date TEXT
    );
    CREATE TABLE IF NOT EXISTS book (
        id INTEGER PRIMARY KEY,
        title TEXT NOT NULL,
        title_without_index TEXT NOT NULL,
        page_count INTEGER NOT NULL,
        publication_date TEXT,
        author_id INTEGER NOT NULL REFERENCES author(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS book_title_idx ON book(title);
    CREATE INDEX IF NOT EXISTS book_author_id_idx ON book(author_id);
    CREATE TABLE IF NOT EXISTS genre (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS book_genres (
        id INTEGER PRIMARY KEY,
        book_id INTEGER NOT NULL REFERENCES book(id) ON DELETE CASCADE,
        genre_id INTEGER NOT NULL REFERENCES genre(id) ON DELETE CASCADE,
        UNIQUE (book_id, genre_id)
    );
    CREATE INDEX IF NOT EXISTS book_genres_genre_id_idx ON book_genres(genre_id);
";

/// Row counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryCounts {
    pub authors: usize,
    pub books: usize,
    pub genres: usize,
}

impl LibraryCounts {
    /// Whether the library holds enough data to run the suites
    pub fn is_populated(&self) -> bool {
        self.books > 0 && self.genres > 0
    }
}

/// Handle to the library database
pub struct Library {
    connection: Connection,
    path: Option<PathBuf>,
}

impl Library {
    /// Open (or create) a library database file and initialize the schema
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let connection = Connection::open(path)?;
        let library = Self {
            connection,
            path: Some(path.to_path_buf()),
        };
        library.initialize_schema()?;
        log::debug!("Opened library database at {}", path.display());
        Ok(library)
    }

    /// Open a throwaway in-memory library
    pub fn open_in_memory() -> Result<Self> {
        let library = Self {
            connection: Connection::open_in_memory()?,
            path: None,
        };
        library.initialize_schema()?;
        Ok(library)
    }

    fn initialize_schema(&self) -> Result<()> {
        self.connection.pragma_update(None, "foreign_keys", true)?;
        self.connection.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Underlying SQLite connection
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Database file path, `None` for in-memory libraries
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Count rows in each table
    pub fn counts(&self) -> Result<LibraryCounts> {
        let count = |table: &str| -> Result<usize> {
            let sql = format!("SELECT COUNT(*) FROM {}", table);
            let n: i64 = self.connection.query_row(&sql, [], |row| row.get(0))?;
            Ok(n as usize)
        };

        Ok(LibraryCounts {
            authors: count("author")?,
            books: count("book")?,
            genres: count("genre")?,
        })
    }

    /// Delete every row, children first
    pub fn clear(&self) -> Result<()> {
        self.connection.execute_batch(
            "DELETE FROM book_genres;
             DELETE FROM genre;
             DELETE FROM book;
             DELETE FROM author;",
        )?;
        Ok(())
    }

    /// All book titles in id order
    pub fn book_titles(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .connection
            .prepare_cached("SELECT title FROM book ORDER BY id")?;
        let titles = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(titles)
    }

    /// Size of the database in bytes
    pub fn database_size(&self) -> Result<u64> {
        let page_count: i64 = self
            .connection
            .query_row("PRAGMA page_count", [], |row| row.get(0))?;
        let page_size: i64 = self
            .connection
            .query_row("PRAGMA page_size", [], |row| row.get(0))?;
        Ok((page_count * page_size) as u64)
    }
}

/// Build `?, ?, ?` for an `IN` clause of `n` parameters
pub fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
