use rusqlite::{Connection, OptionalExtension, Result as RusqliteResult};

pub mod content_db_operations;
pub mod site_db_operations;
pub mod users_db_operations;

/// Reads the locale of a row in any locale-tagged table. Used to validate
/// translation pairing before insert/update: the parent must exist and carry
/// the other locale.
pub fn read_row_locale(
    conn: &Connection,
    table: &'static str,
    id: i64,
) -> RusqliteResult<Option<String>> {
    conn.query_row(
        &format!("SELECT locale FROM {} WHERE id = ?1", table),
        [id],
        |row| row.get(0),
    )
    .optional()
}
