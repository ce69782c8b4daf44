//! Challenge suite: raw SQL vs. subqueries, joined vs. batched eager loading
//!
//! A book's "latest" status is decided per author by publication date,
//! newest first; books without a date count as the newest and equal dates
//! fall back to the higher id.

use std::collections::{BTreeSet, HashMap};

use super::{query_in_chunks, IN_LIST};
use crate::store::{Genre, Library};
use crate::Result;

/// Titles of books that are not their author's latest, via a window function
pub fn titles_excluding_latest_raw_sql(library: &Library) -> Result<Vec<String>> {
    let titles = library
        .connection()
        .prepare_cached(
            "WITH ranked AS (
                 SELECT title,
                        ROW_NUMBER() OVER (
                            PARTITION BY author_id
                            ORDER BY publication_date IS NULL DESC, publication_date DESC, id DESC
                        ) AS recency
                 FROM book
             )
             SELECT DISTINCT title FROM ranked
             WHERE recency > 1
             ORDER BY title",
        )?
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(titles)
}

/// Same titles, excluding each author's latest book with a correlated subquery
pub fn titles_excluding_latest_subquery(library: &Library) -> Result<Vec<String>> {
    let titles = library
        .connection()
        .prepare_cached(
            "SELECT DISTINCT book.title FROM book
             WHERE book.id <> (
                 SELECT latest.id FROM book AS latest
                 WHERE latest.author_id = book.author_id
                 ORDER BY latest.publication_date IS NULL DESC,
                          latest.publication_date DESC,
                          latest.id DESC
                 LIMIT 1
             )
             ORDER BY book.title",
        )?
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(titles)
}

/// Genres of the given books: fetch the books, then their genres in a
/// second batched query, and associate them in memory
pub fn book_genres_batched(library: &Library, titles: &[String]) -> Result<Vec<String>> {
    let book_ids = query_in_chunks(
        library,
        "SELECT id FROM book WHERE title IN ({in_list})",
        titles,
        |row| row.get::<_, i64>(0),
    )?;

    let links = query_in_chunks(
        library,
        "SELECT book_id, genre_id FROM book_genres WHERE book_id IN ({in_list})",
        &book_ids,
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
    )?;

    let mut genre_ids: Vec<i64> = links.iter().map(|(_, genre_id)| *genre_id).collect();
    genre_ids.sort_unstable();
    genre_ids.dedup();

    let sql = format!("SELECT {} FROM genre WHERE id IN ({})", Genre::COLUMNS, IN_LIST);
    let genres_by_id: HashMap<i64, Genre> =
        query_in_chunks(library, &sql, &genre_ids, Genre::from_row)?
            .into_iter()
            .map(|genre| (genre.id, genre))
            .collect();

    let mut genres_by_book: HashMap<i64, Vec<&Genre>> = HashMap::new();
    for (book_id, genre_id) in &links {
        if let Some(genre) = genres_by_id.get(genre_id) {
            genres_by_book.entry(*book_id).or_default().push(genre);
        }
    }

    let genres: BTreeSet<String> = book_ids
        .iter()
        .filter_map(|id| genres_by_book.get(id))
        .flatten()
        .map(|genre| genre.name.clone())
        .collect();
    Ok(genres.into_iter().collect())
}

/// Genres of the given books in one join
pub fn book_genres_joined(library: &Library, titles: &[String]) -> Result<Vec<String>> {
    let names = query_in_chunks(
        library,
        "SELECT DISTINCT genre.name FROM book
         JOIN book_genres ON book_genres.book_id = book.id
         JOIN genre ON genre.id = book_genres.genre_id
         WHERE book.title IN ({in_list})",
        titles,
        |row| row.get::<_, String>(0),
    )?;

    let genres: BTreeSet<String> = names.into_iter().collect();
    Ok(genres.into_iter().collect())
}

/// `"<title> is by <author>"` for every book, authors fetched by join
pub fn books_with_author_info_joined(library: &Library) -> Result<Vec<String>> {
    let lines = library
        .connection()
        .prepare_cached(
            "SELECT book.title, author.name FROM book
             JOIN author ON author.id = book.author_id
             ORDER BY book.title, author.name",
        )?
        .query_map([], |row| {
            let title: String = row.get(0)?;
            let author: String = row.get(1)?;
            Ok(format!("{} is by {}", title, author))
        })?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(lines)
}

/// Same lines, authors fetched with a second batched query
pub fn books_with_author_info_batched(library: &Library) -> Result<Vec<String>> {
    let books = library
        .connection()
        .prepare_cached("SELECT title, author_id FROM book")?
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<rusqlite::Result<Vec<(String, i64)>>>()?;

    let mut author_ids: Vec<i64> = books.iter().map(|(_, id)| *id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();

    let authors: HashMap<i64, String> = query_in_chunks(
        library,
        "SELECT id, name FROM author WHERE id IN ({in_list})",
        &author_ids,
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
    )?
    .into_iter()
    .collect();

    let mut pairs: Vec<(String, &str)> = books
        .into_iter()
        .filter_map(|(title, author_id)| {
            authors
                .get(&author_id)
                .map(|name| (title, name.as_str()))
        })
        .collect();
    pairs.sort();

    Ok(pairs
        .into_iter()
        .map(|(title, author)| format!("{} is by {}", title, author))
        .collect())
}
