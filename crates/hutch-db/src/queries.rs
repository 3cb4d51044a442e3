use crate::Database;
use crate::models::{RecordRow, SettingRow};
use anyhow::Result;
use hutch_types::Collection;
use rusqlite::{Connection, Transaction};
use serde_json::Value;
use tracing::debug;

impl Database {
    // -- Collections --

    /// Every record of a collection, oldest first.
    pub fn get_all(&self, collection: Collection) -> Result<Vec<Value>> {
        self.with_conn(|conn| {
            query_records(conn, collection)?
                .into_iter()
                .map(RecordRow::into_value)
                .collect()
        })
    }

    /// Replace a collection wholesale. Clear and inserts share one
    /// transaction, so a failing insert leaves the old contents in place.
    pub fn replace_all(&self, collection: Collection, records: &[Value]) -> Result<()> {
        let rows = records
            .iter()
            .map(|record| RecordRow::from_value(collection, record))
            .collect::<Result<Vec<_>>>()?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(&format!("DELETE FROM {}", collection.name()), [])?;
            for row in &rows {
                insert_record(&tx, collection, row)?;
            }
            tx.commit()?;
            debug!("Replaced {} with {} records", collection, rows.len());
            Ok(())
        })
    }

    /// Insert a single record. An id already present is an error.
    pub fn insert_one(&self, collection: Collection, record: &Value) -> Result<()> {
        let row = RecordRow::from_value(collection, record)?;
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            insert_record(&tx, collection, &row)?;
            tx.commit()?;
            Ok(())
        })
    }

    /// Delete by id. Returns whether a row was removed; an absent id is not an error.
    pub fn delete_one(&self, collection: Collection, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                &format!("DELETE FROM {} WHERE id = ?1", collection.name()),
                [id],
            )?;
            Ok(removed > 0)
        })
    }

    pub fn count(&self, collection: Collection) -> Result<usize> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", collection.name()),
                [],
                |row| row.get(0),
            )?;
            Ok(n as usize)
        })
    }

    // -- Settings --

    pub fn settings_rows(&self) -> Result<Vec<SettingRow>> {
        self.with_conn(query_settings)
    }

    /// Replace every settings row with the given pairs.
    pub fn replace_settings(&self, pairs: &[(String, String)]) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM settings", [])?;
            for (key, value) in pairs {
                tx.execute(
                    "INSERT INTO settings (key, value) VALUES (?1, ?2)",
                    (key, value),
                )?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    // -- Everything --

    pub fn clear_all(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "
                DELETE FROM weights;
                DELETE FROM photos;
                DELETE FROM settings;
                ",
            )?;
            Ok(())
        })
    }
}

fn insert_record(tx: &Transaction<'_>, collection: Collection, row: &RecordRow) -> Result<()> {
    match collection {
        Collection::Weights => {
            tx.execute(
                "INSERT INTO weights (id, date, body) VALUES (?1, ?2, ?3)",
                rusqlite::params![row.id, row.date, row.body],
            )?;
        }
        Collection::Photos => {
            tx.execute(
                "INSERT INTO photos (id, type, date, body) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![row.id, row.kind.as_deref().unwrap_or_default(), row.date, row.body],
            )?;
        }
    }
    Ok(())
}

fn query_records(conn: &Connection, collection: Collection) -> Result<Vec<RecordRow>> {
    let sql = match collection {
        Collection::Weights => "SELECT id, NULL, date, body FROM weights ORDER BY date, id",
        Collection::Photos => "SELECT id, type, date, body FROM photos ORDER BY date, id",
    };

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(RecordRow {
                id: row.get(0)?,
                kind: row.get(1)?,
                date: row.get(2)?,
                body: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_settings(conn: &Connection) -> Result<Vec<SettingRow>> {
    let mut stmt = conn.prepare("SELECT key, value FROM settings")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(SettingRow {
                key: row.get(0)?,
                value: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}
