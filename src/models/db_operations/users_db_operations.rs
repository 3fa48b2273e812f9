use crate::models::AdminUser;
use bcrypt::{hash, verify, BcryptError};
use chrono::Utc;
use rusqlite::{params, Connection, Error as RusqliteError, OptionalExtension};

fn bcrypt_to_rusqlite_error(e: BcryptError) -> RusqliteError {
    RusqliteError::ToSqlConversionFailure(Box::new(e))
}

pub fn create_user(
    conn: &Connection,
    username: &str,
    password: &str,
) -> Result<(), RusqliteError> {
    let hashed_password = hash(password, bcrypt::DEFAULT_COST).map_err(bcrypt_to_rusqlite_error)?;
    conn.execute(
        "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
        params![username, hashed_password],
    )?;
    Ok(())
}

pub fn read_all_users(conn: &Connection) -> Result<Vec<AdminUser>, RusqliteError> {
    let mut stmt = conn.prepare(
        "SELECT id, username, is_active, last_login_time FROM users ORDER BY id",
    )?;
    let user_iter = stmt.query_map([], |row| {
        Ok(AdminUser {
            id: row.get(0)?,
            username: row.get(1)?,
            is_active: row.get(2)?,
            last_login_time: row.get(3)?,
        })
    })?;
    Ok(user_iter.filter_map(|u| u.ok()).collect())
}

/// Checks a username/password pair against the stored bcrypt hash. Returns
/// the username on success; suspended accounts never verify.
pub fn verify_credentials(conn: &Connection, username: &str, password: &str) -> Option<String> {
    let res: rusqlite::Result<(String, bool)> = conn.query_row(
        "SELECT password_hash, is_active FROM users WHERE username = ?1",
        [username],
        |row| Ok((row.get(0)?, row.get(1)?)),
    );

    if let Ok((stored_hash, is_active)) = res {
        if is_active && verify(password, &stored_hash).unwrap_or(false) {
            return Some(username.to_string());
        }
    }
    None
}

pub fn update_last_login_time(conn: &Connection, username: &str) -> Result<(), RusqliteError> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "UPDATE users SET last_login_time = ?1 WHERE username = ?2",
        params![now, username],
    )?;
    Ok(())
}

pub fn change_password(
    conn: &Connection,
    username: &str,
    new_password: &str,
) -> Result<usize, RusqliteError> {
    let hashed_password =
        hash(new_password, bcrypt::DEFAULT_COST).map_err(bcrypt_to_rusqlite_error)?;
    conn.execute(
        "UPDATE users SET password_hash = ?1 WHERE username = ?2",
        params![hashed_password, username],
    )
}

pub fn change_username(
    conn: &Connection,
    old_username: &str,
    new_username: &str,
) -> Result<usize, RusqliteError> {
    conn.execute(
        "UPDATE users SET username = ?1 WHERE username = ?2",
        params![new_username, old_username],
    )
}

pub fn read_setting(conn: &Connection, key: &str) -> Option<String> {
    conn.query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
        row.get(0)
    })
    .optional()
    .unwrap_or(None)
}

pub fn update_setting(conn: &Connection, key: &str, value: &str) -> Result<(), RusqliteError> {
    conn.execute(
        "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
        [key, value],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::db_setup;

    fn test_conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        db_setup::setup_content_db(&mut conn).unwrap();
        conn
    }

    #[test]
    fn credentials_verify_and_reject() {
        let conn = test_conn();
        create_user(&conn, "yonetici", "gizli-sifre").unwrap();
        assert_eq!(
            verify_credentials(&conn, "yonetici", "gizli-sifre"),
            Some("yonetici".to_string())
        );
        assert!(verify_credentials(&conn, "yonetici", "yanlis").is_none());
        assert!(verify_credentials(&conn, "bilinmeyen", "gizli-sifre").is_none());
    }

    #[test]
    fn duplicate_username_rejected() {
        let conn = test_conn();
        create_user(&conn, "yonetici", "a").unwrap();
        assert!(create_user(&conn, "yonetici", "b").is_err());
    }

    #[test]
    fn settings_round_trip_and_overwrite() {
        let conn = test_conn();
        // Seeded by setup.
        assert_eq!(
            read_setting(&conn, "max_file_upload_size_mb").as_deref(),
            Some("10")
        );
        update_setting(&conn, "max_file_upload_size_mb", "25").unwrap();
        assert_eq!(
            read_setting(&conn, "max_file_upload_size_mb").as_deref(),
            Some("25")
        );
        assert!(read_setting(&conn, "no_such_key").is_none());
    }
}
