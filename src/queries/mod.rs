//! Query strategy pairs
//!
//! Each submodule holds alternative implementations of the same logical
//! query, one naive and one batched, joined or pushed down to SQL.
//! Every function takes the [`Library`] explicitly.

use rusqlite::{params_from_iter, Row, ToSql};

use crate::store::{placeholders, Library, SQLITE_MAX_PARAMS};
use crate::Result;

pub mod challenge;
pub mod demo;
pub mod optimize;

/// Marker replaced by the `IN` placeholders in [`query_in_chunks`] SQL
pub const IN_LIST: &str = "{in_list}";

/// Run `sql` once per chunk of `keys`, substituting [`IN_LIST`] with
/// that chunk's placeholders, and collect every mapped row.
pub fn query_in_chunks<K, T, F>(library: &Library, sql: &str, keys: &[K], mut map: F) -> Result<Vec<T>>
where
    K: ToSql,
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut rows = Vec::new();
    for chunk in keys.chunks(SQLITE_MAX_PARAMS) {
        let statement = sql.replace(IN_LIST, &placeholders(chunk.len()));
        let mut stmt = library.connection().prepare_cached(&statement)?;
        let mut query = stmt.query(params_from_iter(chunk.iter()))?;
        while let Some(row) = query.next()? {
            rows.push(map(row)?);
        }
    }
    Ok(rows)
}
