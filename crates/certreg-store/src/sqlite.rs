//! SQLite implementation of the CertificateStore trait.
//!
//! The persistent backend. Uses rusqlite with bundled SQLite; every call runs
//! on `tokio::task::spawn_blocking` so the async runtime is never blocked.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use certreg_core::canonical::{attributes_bytes, decode_attributes};
use certreg_core::{
    now_millis, Certificate, CertificateDraft, CertificateId, CertificatePayload, ContentHash,
    LibraryAddress, PublicKey,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{AppendResult, BindResult, CertificateStore, RegistryBinding};

const CERTIFICATE_COLUMNS: &str =
    "id, recipient, course_code, issued_on, attributes, content_hash, metadata_ref, issued_at";

/// SQLite-based store implementation.
///
/// One database file holds one registry. The connection sits behind a
/// mutex, which also serializes appends.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path, creating and migrating it
    /// as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn blob_32(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<[u8; 32]> {
    let bytes: Vec<u8> = row.get(idx)?;
    bytes.try_into().map_err(|b: Vec<u8>| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Blob,
            format!("expected 32 bytes, got {}", b.len()).into(),
        )
    })
}

/// A certificate row whose columns no longer decode.
#[derive(Debug, thiserror::Error)]
#[error("certificate {id}: {reason}")]
struct CorruptRow {
    id: CertificateId,
    reason: String,
}

fn row_to_certificate(row: &rusqlite::Row<'_>) -> rusqlite::Result<Certificate> {
    let id = CertificateId(row.get::<_, i64>(0)? as u64);
    decode_certificate(row, id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            Type::Blob,
            Box::new(CorruptRow {
                id,
                reason: e.to_string(),
            }),
        )
    })
}

fn decode_certificate(row: &rusqlite::Row<'_>, id: CertificateId) -> rusqlite::Result<Certificate> {
    let attributes_cbor: Vec<u8> = row.get(4)?;
    let attributes = decode_attributes(&attributes_cbor)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Blob, Box::new(e)))?;

    let payload = CertificatePayload::new(row.get::<_, String>(2)?, row.get::<_, String>(3)?)
        .with_attributes(attributes);

    let draft = CertificateDraft {
        recipient: PublicKey::from_bytes(blob_32(row, 1)?),
        payload,
        content_hash: ContentHash::from_bytes(blob_32(row, 5)?),
        metadata_ref: row.get(6)?,
        issued_at: row.get(7)?,
    };
    Ok(draft.into_certificate(id))
}

/// Surface undecodable certificate rows as [`StoreError::Corrupted`].
fn read_error(err: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::FromSqlConversionFailure(_, _, source) = &err {
        if let Some(row) = source.downcast_ref::<CorruptRow>() {
            tracing::warn!(id = %row.id, reason = %row.reason, "corrupted certificate row");
            return StoreError::Corrupted {
                id: row.id,
                reason: row.reason.clone(),
            };
        }
    }
    StoreError::Database(err)
}

fn row_to_binding(row: &rusqlite::Row<'_>) -> rusqlite::Result<RegistryBinding> {
    Ok(RegistryBinding {
        course_code: row.get(0)?,
        issuer: PublicKey::from_bytes(blob_32(row, 1)?),
        library: LibraryAddress::from_bytes(blob_32(row, 2)?),
    })
}

fn read_binding(conn: &Connection) -> Result<Option<RegistryBinding>> {
    conn.query_row(
        "SELECT course_code, issuer, library FROM registry_binding WHERE slot = 0",
        [],
        row_to_binding,
    )
    .optional()
    .map_err(StoreError::from)
}

fn read_certificate_id(conn: &Connection, recipient: &PublicKey) -> Result<Option<CertificateId>> {
    let id: Option<i64> = conn
        .query_row(
            "SELECT id FROM certificates WHERE recipient = ?1",
            params![recipient.as_bytes().as_slice()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id.map(|id| CertificateId(id as u64)))
}

#[async_trait]
impl CertificateStore for SqliteStore {
    async fn bind(&self, binding: &RegistryBinding) -> Result<BindResult> {
        let binding = binding.clone();

        self.blocking(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let result = match read_binding(&tx)? {
                Some(existing) if existing == binding => BindResult::AlreadyBound,
                Some(existing) => BindResult::Mismatch { existing },
                None => {
                    tx.execute(
                        "INSERT INTO registry_binding (slot, course_code, issuer, library, bound_at)
                         VALUES (0, ?1, ?2, ?3, ?4)",
                        params![
                            binding.course_code,
                            binding.issuer.as_bytes().as_slice(),
                            binding.library.as_bytes().as_slice(),
                            now_millis(),
                        ],
                    )?;
                    BindResult::Bound
                }
            };

            tx.commit()?;
            Ok(result)
        })
        .await
    }

    async fn binding(&self) -> Result<Option<RegistryBinding>> {
        self.blocking(|conn| read_binding(conn)).await
    }

    async fn append_certificate(&self, draft: &CertificateDraft) -> Result<AppendResult> {
        let draft = draft.clone();

        self.blocking(move |conn| {
            // IMMEDIATE takes the write lock up front so no other connection
            // can slip an insert between the check and ours.
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            if let Some(existing) = read_certificate_id(&tx, &draft.recipient)? {
                return Ok(AppendResult::DuplicateRecipient { existing });
            }

            let next: i64 = tx.query_row(
                "SELECT COALESCE(MAX(id) + 1, 0) FROM certificates",
                [],
                |row| row.get(0),
            )?;
            if next == i64::MAX {
                return Err(StoreError::IdsExhausted);
            }

            tx.execute(
                "INSERT INTO certificates (
                    id, recipient, course_code, issued_on, attributes,
                    content_hash, metadata_ref, issued_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    next,
                    draft.recipient.as_bytes().as_slice(),
                    draft.payload.course_code(),
                    draft.payload.issued_on(),
                    attributes_bytes(draft.payload.attributes()),
                    draft.content_hash.as_bytes().as_slice(),
                    draft.metadata_ref,
                    draft.issued_at,
                ],
            )?;
            tx.commit()?;

            let id = CertificateId(next as u64);
            tracing::debug!(id = %id, recipient = %draft.recipient, "appended certificate");
            Ok(AppendResult::Appended(id))
        })
        .await
    }

    async fn get_certificate(&self, id: CertificateId) -> Result<Option<Certificate>> {
        let Ok(id) = i64::try_from(id.value()) else {
            return Ok(None);
        };

        self.blocking(move |conn| {
            conn.query_row(
                &format!("SELECT {CERTIFICATE_COLUMNS} FROM certificates WHERE id = ?1"),
                params![id],
                row_to_certificate,
            )
            .optional()
            .map_err(read_error)
        })
        .await
    }

    async fn certificate_id_of(&self, recipient: &PublicKey) -> Result<Option<CertificateId>> {
        let recipient = *recipient;
        self.blocking(move |conn| read_certificate_id(conn, &recipient))
            .await
    }

    async fn has_recipient(&self, recipient: &PublicKey) -> Result<bool> {
        let recipient = *recipient;

        self.blocking(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM certificates WHERE recipient = ?1)",
                params![recipient.as_bytes().as_slice()],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
        .await
    }

    async fn count(&self) -> Result<u64> {
        self.blocking(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM certificates", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }

    async fn get_certificates_range(
        &self,
        start: CertificateId,
        limit: usize,
    ) -> Result<Vec<Certificate>> {
        let Ok(start) = i64::try_from(start.value()) else {
            return Ok(Vec::new());
        };
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        self.blocking(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CERTIFICATE_COLUMNS} FROM certificates
                 WHERE id >= ?1 ORDER BY id LIMIT ?2"
            ))?;

            let certificates = stmt
                .query_map(params![start, limit], row_to_certificate)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(read_error)?;

            Ok(certificates)
        })
        .await
    }
}
