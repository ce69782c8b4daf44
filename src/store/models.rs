//! Row types for the library tables

use chrono::NaiveDate;
use rusqlite::Row;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub bio: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl Author {
    pub const COLUMNS: &'static str = "id, name, bio, birth_date";

    /// Map a row selected with [`Author::COLUMNS`]
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            bio: row.get(2)?,
            birth_date: row.get(3)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    /// Indexed copy of the title
    pub title: String,
    /// Same value, deliberately left without an index
    pub title_without_index: String,
    pub page_count: i64,
    pub publication_date: Option<NaiveDate>,
    pub author_id: i64,
}

impl Book {
    pub const COLUMNS: &'static str =
        "id, title, title_without_index, page_count, publication_date, author_id";

    /// Map a row selected with [`Book::COLUMNS`]
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            title_without_index: row.get(2)?,
            page_count: row.get(3)?,
            publication_date: row.get(4)?,
            author_id: row.get(5)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

impl Genre {
    pub const COLUMNS: &'static str = "id, name";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}
