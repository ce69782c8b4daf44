//! Library population
//!
//! Fills an empty library with a handful of well-known books, one author
//! with several dated books, and a large tail of single-book authors.

use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::{params, Transaction};

use super::{Library, LibraryCounts};
use crate::{QOrbError, Result};

pub const GENRES: [&str; 4] = ["Sci fi", "Fantasy", "Horror", "Lit Fic"];

/// (author, title, page count, genres)
const FAMOUS_BOOKS: [(&str, &str, i64, &[&str]); 3] = [
    ("JRR Tolkien", "Return of the King", 504, &["Fantasy"]),
    ("Chinua Achebe", "Things Fall Apart", 301, &["Lit Fic"]),
    ("Han Kang", "The Vegetarian", 200, &["Lit Fic", "Horror"]),
];

pub const PROLIFIC_AUTHOR: &str = "Author McAuthor";

/// (title, (year, month, day), page count)
const PROLIFIC_BOOKS: [(&str, (i32, u32, u32), i64); 3] = [
    ("Apple Book", (2016, 5, 1), 100),
    ("Banana Book", (2018, 10, 10), 200),
    ("Pear Book", (2020, 12, 1), 155),
];

/// Page count of every generated book
pub const BULK_PAGE_COUNT: i64 = 100;
const BULK_GENRE: &str = "Lit Fic";

/// Population settings
#[derive(Debug, Clone)]
pub struct SeedConfig {
    /// Number of generated `Author {i}` / `Book {i}` pairs
    pub bulk_authors: usize,
    /// Suppress progress output
    pub quiet: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            bulk_authors: 100_000,
            quiet: false,
        }
    }
}

impl SeedConfig {
    pub fn new(bulk_authors: usize) -> Self {
        Self {
            bulk_authors,
            ..Self::default()
        }
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

/// What [`maybe_populate`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The library already had books and genres; nothing was touched
    AlreadyPopulated(LibraryCounts),
    /// The library was cleared and filled
    Populated(LibraryCounts),
}

impl SeedOutcome {
    pub fn counts(&self) -> LibraryCounts {
        match self {
            SeedOutcome::AlreadyPopulated(counts) | SeedOutcome::Populated(counts) => *counts,
        }
    }
}

/// Populate the library unless it already holds books and genres
pub fn maybe_populate(library: &Library, config: &SeedConfig) -> Result<SeedOutcome> {
    let counts = library.counts()?;
    if counts.is_populated() {
        log::debug!(
            "Library already populated ({} books, {} genres)",
            counts.books,
            counts.genres
        );
        return Ok(SeedOutcome::AlreadyPopulated(counts));
    }

    if !config.quiet {
        println!("Clearing database");
    }
    library.clear()?;

    if !config.quiet {
        println!("Populating database!");
    }
    let tx = library.connection().unchecked_transaction()?;
    populate(&tx, config)?;
    tx.commit()?;

    let counts = library.counts()?;
    log::info!(
        "Populated library: {} authors, {} books, {} genres",
        counts.authors,
        counts.books,
        counts.genres
    );
    Ok(SeedOutcome::Populated(counts))
}

fn populate(tx: &Transaction<'_>, config: &SeedConfig) -> Result<()> {
    for name in GENRES {
        insert_genre(tx, name)?;
    }

    for (author_name, title, page_count, genre_names) in FAMOUS_BOOKS {
        let author_id = insert_author(tx, author_name)?;
        let book_id = insert_book(tx, title, page_count, None, author_id)?;
        link_genres(tx, book_id, genre_names)?;
    }

    let author_id = insert_author(tx, PROLIFIC_AUTHOR)?;
    for (title, (year, month, day), page_count) in PROLIFIC_BOOKS {
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            QOrbError::BenchmarkError(format!("Invalid publication date for {}", title))
        })?;
        insert_book(tx, title, page_count, Some(date), author_id)?;
    }

    let progress = progress_bar(config)?;
    for i in 0..config.bulk_authors {
        let author_id = insert_author(tx, &format!("Author {}", i))?;
        let book_id = insert_book(tx, &format!("Book {}", i), BULK_PAGE_COUNT, None, author_id)?;
        link_genres(tx, book_id, &[BULK_GENRE])?;
        progress.inc(1);
    }
    progress.finish_and_clear();

    Ok(())
}

fn progress_bar(config: &SeedConfig) -> Result<ProgressBar> {
    if config.quiet {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new(config.bulk_authors as u64);
    let style = ProgressStyle::with_template("{spinner} {pos}/{len} books ({eta}) {wide_bar}")
        .map_err(|e| QOrbError::BenchmarkError(format!("Invalid progress template: {}", e)))?;
    pb.set_style(style);
    Ok(pb)
}

fn insert_genre(tx: &Transaction<'_>, name: &str) -> Result<i64> {
    tx.prepare_cached("INSERT INTO genre (name) VALUES (?1)")?
        .execute(params![name])?;
    Ok(tx.last_insert_rowid())
}

fn insert_author(tx: &Transaction<'_>, name: &str) -> Result<i64> {
    tx.prepare_cached("INSERT INTO author (name) VALUES (?1)")?
        .execute(params![name])?;
    Ok(tx.last_insert_rowid())
}

fn insert_book(
    tx: &Transaction<'_>,
    title: &str,
    page_count: i64,
    publication_date: Option<NaiveDate>,
    author_id: i64,
) -> Result<i64> {
    tx.prepare_cached(
        "INSERT INTO book (title, title_without_index, page_count, publication_date, author_id)
         VALUES (?1, ?1, ?2, ?3, ?4)",
    )?
    .execute(params![title, page_count, publication_date, author_id])?;
    Ok(tx.last_insert_rowid())
}

fn link_genres(tx: &Transaction<'_>, book_id: i64, genre_names: &[&str]) -> Result<()> {
    let mut stmt = tx.prepare_cached(
        "INSERT INTO book_genres (book_id, genre_id)
         SELECT ?1, id FROM genre WHERE name = ?2",
    )?;
    for name in genre_names {
        stmt.execute(params![book_id, name])?;
    }
    Ok(())
}
