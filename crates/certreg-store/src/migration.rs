//! Database schema migrations for SQLite.
//!
//! Versioned migrations: each version is a SQL batch that moves the schema
//! from N-1 to N, recorded in `schema_migrations`.

use rusqlite::Connection;

use certreg_core::now_millis;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema. Idempotent.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
            tracing::debug!(version, "applied schema migration");
        }

        tx.commit()?;
    }

    Ok(())
}

fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- One row per issued certificate. Append-only.
        CREATE TABLE certificates (
            id INTEGER PRIMARY KEY,           -- sequential, from 0
            recipient BLOB NOT NULL UNIQUE,   -- 32 bytes, Ed25519 public key
            course_code TEXT NOT NULL,
            issued_on TEXT NOT NULL,
            attributes BLOB NOT NULL,         -- canonical CBOR map text -> text
            content_hash BLOB NOT NULL,       -- 32 bytes, checksum at mint
            metadata_ref TEXT NOT NULL,
            issued_at INTEGER NOT NULL        -- Unix ms
        );

        CREATE TRIGGER certificates_no_update BEFORE UPDATE ON certificates
        BEGIN
            SELECT RAISE(ABORT, 'certificates are append-only');
        END;

        CREATE TRIGGER certificates_no_delete BEFORE DELETE ON certificates
        BEGIN
            SELECT RAISE(ABORT, 'certificates are append-only');
        END;

        -- The registry this database belongs to. At most one row.
        CREATE TABLE registry_binding (
            slot INTEGER PRIMARY KEY CHECK (slot = 0),
            course_code TEXT NOT NULL,
            issuer BLOB NOT NULL,             -- 32 bytes
            library BLOB NOT NULL,            -- 32 bytes, library address
            bound_at INTEGER NOT NULL
        );
        "#,
    )?;

    Ok(())
}
