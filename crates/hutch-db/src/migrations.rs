use anyhow::{Result, bail};
use rusqlite::Connection;
use tracing::info;

/// The only schema this build understands. There is no upgrade path: a
/// database stamped with a newer version is refused.
pub const SCHEMA_VERSION: i64 = 1;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version = current_version(conn)?;

    if version > SCHEMA_VERSION {
        bail!(
            "database schema version {} is newer than supported version {}",
            version,
            SCHEMA_VERSION
        );
    }

    if version < 1 {
        info!("Database: running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE weights (
                id      INTEGER PRIMARY KEY,
                date    TEXT NOT NULL,
                body    TEXT NOT NULL
            );

            CREATE INDEX idx_weights_date ON weights(date);

            CREATE TABLE photos (
                id      INTEGER PRIMARY KEY,
                type    TEXT NOT NULL,
                date    TEXT NOT NULL,
                body    TEXT NOT NULL
            );

            CREATE INDEX idx_photos_type ON photos(type);
            CREATE INDEX idx_photos_date ON photos(date);

            CREATE TABLE settings (
                key     TEXT PRIMARY KEY,
                value   TEXT NOT NULL
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    Ok(())
}

pub fn current_version(conn: &Connection) -> Result<i64> {
    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;
    Ok(version)
}
