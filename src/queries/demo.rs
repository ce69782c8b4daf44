//! Demo suite: N+1 lookups, indexes and aggregate pushdown

use rusqlite::{params, OptionalExtension};

use super::query_in_chunks;
use crate::store::{Author, Book, Library};
use crate::{QOrbError, Result};

/// One query per title, keeping the first match of each
pub fn books_by_title(library: &Library, titles: &[String]) -> Result<Vec<Book>> {
    let sql = format!(
        "SELECT {} FROM book WHERE title = ?1 ORDER BY id LIMIT 1",
        Book::COLUMNS
    );
    let mut stmt = library.connection().prepare_cached(&sql)?;

    let mut books = Vec::new();
    for title in titles {
        if let Some(book) = stmt.query_row(params![title], Book::from_row).optional()? {
            books.push(book);
        }
    }
    Ok(books)
}

/// A single `IN` query for all titles
pub fn books_by_title_bulk(library: &Library, titles: &[String]) -> Result<Vec<Book>> {
    let sql = format!(
        "SELECT {} FROM book WHERE title IN ({{in_list}}) ORDER BY id",
        Book::COLUMNS
    );
    query_in_chunks(library, &sql, titles, Book::from_row)
}

/// First book with `title`, looked up through the indexed column
pub fn book_by_title(library: &Library, title: &str) -> Result<Option<Book>> {
    first_book_where(library, "title", title)
}

/// First book with `title`, looked up through the unindexed copy
pub fn book_by_title_without_index(library: &Library, title: &str) -> Result<Option<Book>> {
    first_book_where(library, "title_without_index", title)
}

fn first_book_where(library: &Library, column: &str, value: &str) -> Result<Option<Book>> {
    let sql = format!(
        "SELECT {} FROM book WHERE {} = ?1 ORDER BY id LIMIT 1",
        Book::COLUMNS,
        column
    );
    let book = library
        .connection()
        .prepare_cached(&sql)?
        .query_row(params![value], Book::from_row)
        .optional()?;
    Ok(book)
}

/// Load the author and all of their books, then count in memory
pub fn count_books_by_author(library: &Library, author_id: i64) -> Result<usize> {
    let author = find_author(library, author_id)?;

    let sql = format!("SELECT {} FROM book WHERE author_id = ?1", Book::COLUMNS);
    let books = library
        .connection()
        .prepare_cached(&sql)?
        .query_map(params![author.id], Book::from_row)?
        .collect::<rusqlite::Result<Vec<Book>>>()?;
    Ok(books.len())
}

/// Let the database count
pub fn count_books_by_author_db(library: &Library, author_id: i64) -> Result<usize> {
    let count: i64 = library
        .connection()
        .prepare_cached("SELECT COUNT(*) FROM book WHERE author_id = ?1")?
        .query_row(params![author_id], |row| row.get(0))?;
    Ok(count as usize)
}

/// Fetch every book, then look up each book's author separately
pub fn books_with_author_names(library: &Library) -> Result<Vec<(String, String)>> {
    let sql = format!("SELECT {} FROM book ORDER BY id", Book::COLUMNS);
    let books = library
        .connection()
        .prepare_cached(&sql)?
        .query_map([], Book::from_row)?
        .collect::<rusqlite::Result<Vec<Book>>>()?;

    let mut result = Vec::with_capacity(books.len());
    for book in books {
        let author = find_author(library, book.author_id)?;
        result.push((book.title, author.name));
    }
    Ok(result)
}

/// Fetch books and author names in one join
pub fn books_with_author_names_joined(library: &Library) -> Result<Vec<(String, String)>> {
    let pairs = library
        .connection()
        .prepare_cached(
            "SELECT book.title, author.name FROM book
             JOIN author ON author.id = book.author_id
             ORDER BY book.id",
        )?
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<(String, String)>>>()?;
    Ok(pairs)
}

/// Fetch one author by primary key, `NotFound` when missing
pub(crate) fn find_author(library: &Library, author_id: i64) -> Result<Author> {
    let sql = format!("SELECT {} FROM author WHERE id = ?1", Author::COLUMNS);
    library
        .connection()
        .prepare_cached(&sql)?
        .query_row(params![author_id], Author::from_row)
        .optional()?
        .ok_or_else(|| QOrbError::NotFound(format!("Author {}", author_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::fixtures::seeded_library;

    fn titles(books: &[Book]) -> Vec<&str> {
        books.iter().map(|b| b.title.as_str()).collect()
    }

    #[test]
    fn test_books_by_title_strategies_agree() {
        let library = seeded_library(50);
        let wanted: Vec<String> = vec![
            "Things Fall Apart".into(),
            "The Vegetarian".into(),
            "Missing Book".into(),
        ];

        let looped = books_by_title(&library, &wanted).unwrap();
        let bulk = books_by_title_bulk(&library, &wanted).unwrap();

        assert_eq!(titles(&looped), vec!["Things Fall Apart", "The Vegetarian"]);
        assert_eq!(looped, bulk);
    }

    #[test]
    fn test_books_by_title_bulk_large_input() {
        let library = seeded_library(1200);
        let wanted: Vec<String> = (0..1200).map(|i| format!("Book {}", i)).collect();
        assert_eq!(books_by_title_bulk(&library, &wanted).unwrap().len(), 1200);
        assert_eq!(books_by_title(&library, &wanted).unwrap().len(), 1200);
    }

    #[test]
    fn test_book_by_title_index_and_no_index() {
        let library = seeded_library(20);
        let indexed = book_by_title(&library, "Book 15").unwrap();
        let unindexed = book_by_title_without_index(&library, "Book 15").unwrap();
        assert!(indexed.is_some());
        assert_eq!(indexed, unindexed);
        assert_eq!(book_by_title(&library, "Nope").unwrap(), None);
    }

    #[test]
    fn test_count_books_by_author() {
        let library = seeded_library(5);
        let author_id: i64 = library
            .connection()
            .query_row(
                "SELECT id FROM author WHERE name = 'Author McAuthor'",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(count_books_by_author(&library, author_id).unwrap(), 3);
        assert_eq!(count_books_by_author_db(&library, author_id).unwrap(), 3);
        assert_eq!(count_books_by_author_db(&library, 2).unwrap(), 1);
    }

    #[test]
    fn test_count_books_by_missing_author() {
        let library = seeded_library(1);
        let err = count_books_by_author(&library, 9999).unwrap_err();
        assert!(matches!(err, QOrbError::NotFound(_)));
        assert_eq!(count_books_by_author_db(&library, 9999).unwrap(), 0);
    }

    #[test]
    fn test_books_with_author_names_strategies_agree() {
        let library = seeded_library(30);
        let looped = books_with_author_names(&library).unwrap();
        let joined = books_with_author_names_joined(&library).unwrap();
        assert_eq!(looped.len(), 36);
        assert_eq!(looped, joined);
        assert_eq!(
            looped[0],
            ("Return of the King".to_string(), "JRR Tolkien".to_string())
        );
    }
}
