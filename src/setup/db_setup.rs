use rusqlite::{Connection, Result as RusqliteResult, Transaction};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

/// The shared column block for the five slugged-content tables. `priority`
/// is nullable and only used by notices; keeping one shape keeps one CRUD
/// path.
fn create_content_table(tx: &Transaction, table: &str) -> RusqliteResult<()> {
    println!("- Creating '{}' table...", table);
    tx.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                locale TEXT NOT NULL CHECK(locale IN ('tr', 'en')),
                title TEXT NOT NULL,
                slug TEXT NOT NULL,
                summary TEXT NOT NULL DEFAULT '',
                body TEXT NOT NULL DEFAULT '',
                cover_image TEXT,
                priority TEXT CHECK(priority IS NULL OR priority IN ('normal', 'high', 'urgent')),
                published_at TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                parent_id INTEGER REFERENCES {table}(id) ON DELETE SET NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT,
                UNIQUE(locale, slug)
            )"
        ),
        [],
    )?;
    Ok(())
}

pub fn setup_content_db(conn: &mut Connection) -> Result<(), SetupError> {
    // Pragmas cannot run inside the transaction. Required for the
    // ON DELETE SET NULL pairing behaviour.
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    let tx = conn.transaction()?;

    for table in ["news", "articles", "projects", "services", "notices"] {
        create_content_table(&tx, table)?;
    }

    println!("- Creating 'popups' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS popups (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            locale TEXT NOT NULL CHECK(locale IN ('tr', 'en')),
            title TEXT NOT NULL,
            image_url TEXT,
            link_url TEXT,
            frequency TEXT NOT NULL CHECK(frequency IN ('always', 'once-per-session', 'once-per-day')),
            starts_at TEXT,
            ends_at TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            parent_id INTEGER REFERENCES popups(id) ON DELETE SET NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT
        )",
        [],
    )?;

    for table in ["board_members", "audit_board_members"] {
        println!("- Creating '{}' table...", table);
        tx.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    locale TEXT NOT NULL CHECK(locale IN ('tr', 'en')),
                    full_name TEXT NOT NULL,
                    role_title TEXT NOT NULL,
                    photo_url TEXT,
                    display_order INTEGER NOT NULL DEFAULT 0,
                    parent_id INTEGER REFERENCES {table}(id) ON DELETE SET NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT
                )"
            ),
            [],
        )?;
    }

    println!("- Creating 'sponsors' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS sponsors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            locale TEXT NOT NULL CHECK(locale IN ('tr', 'en')),
            name TEXT NOT NULL,
            logo_url TEXT,
            website_url TEXT,
            display_order INTEGER NOT NULL DEFAULT 0,
            parent_id INTEGER REFERENCES sponsors(id) ON DELETE SET NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT
        )",
        [],
    )?;

    for table in ["photo_gallery", "video_gallery"] {
        println!("- Creating '{}' table...", table);
        tx.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    locale TEXT NOT NULL CHECK(locale IN ('tr', 'en')),
                    title TEXT NOT NULL,
                    media_url TEXT NOT NULL,
                    display_order INTEGER NOT NULL DEFAULT 0,
                    parent_id INTEGER REFERENCES {table}(id) ON DELETE SET NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT
                )"
            ),
            [],
        )?;
    }

    println!("- Creating 'contact_info' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS contact_info (
            id INTEGER PRIMARY KEY CHECK(id = 1),
            address TEXT NOT NULL,
            phone TEXT NOT NULL,
            email TEXT NOT NULL,
            map_embed_url TEXT,
            updated_at TEXT
        )",
        [],
    )?;

    for table in ["presidents", "representatives"] {
        println!("- Creating '{}' table...", table);
        tx.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    locale TEXT PRIMARY KEY CHECK(locale IN ('tr', 'en')),
                    full_name TEXT NOT NULL,
                    title TEXT NOT NULL,
                    photo_url TEXT,
                    message TEXT NOT NULL DEFAULT '',
                    updated_at TEXT
                )"
            ),
            [],
        )?;
    }

    println!("- Creating 'users' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            last_login_time TEXT
        )",
        [],
    )?;

    println!("- Creating 'settings' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;

    seed_initial_settings(&tx)?;

    tx.commit()?;
    Ok(())
}

fn seed_initial_settings(tx: &Transaction) -> RusqliteResult<()> {
    println!("- Seeding initial settings...");

    let default_max_size = "10";
    tx.execute(
        "INSERT OR IGNORE INTO settings (key, value) VALUES ('max_file_upload_size_mb', ?1)",
        [&default_max_size],
    )?;
    println!("  > Default max file upload size set to: {} MB", default_max_size);

    let default_mime_types = "image/jpeg,image/png,image/webp,image/gif,application/pdf,video/mp4";
    tx.execute(
        "INSERT OR IGNORE INTO settings (key, value) VALUES ('allowed_mime_types', ?1)",
        [&default_mime_types],
    )?;
    println!("  > Default allowed MIME types set to: {}", default_mime_types);

    let default_rate_limit = "20";
    tx.execute(
        "INSERT OR IGNORE INTO settings (key, value) VALUES ('upload_rate_limit_per_minute', ?1)",
        [&default_rate_limit],
    )?;
    println!("  > Default upload rate limit set to: {} per minute per IP", default_rate_limit);

    Ok(())
}
