/**
 * Upload Storage
 *
 * Persists uploaded files under collision-resistant generated names and
 * keeps the upload records that downloads are resolved against.
 *
 * Writes are staged: bytes stream into a `.part` file that is renamed into
 * place on commit. A flow that errors out or is cancelled mid-stream never
 * produces a record, so a torn file is never referenceable by download.
 */

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::GatewayError;

/// A committed upload
#[derive(Debug, Clone, serde::Serialize)]
pub struct UploadRecord {
    /// Generated name, also the download reference
    pub stored_name: String,
    /// Identity the upload is bound to
    pub owner_identity_id: Uuid,
    /// Field name the client sent the file under
    pub original_fieldname: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

struct StorageInner {
    root: PathBuf,
    max_bytes: u64,
    records: RwLock<HashMap<String, UploadRecord>>,
}

/// File storage shared across requests
#[derive(Clone)]
pub struct FileStorage {
    inner: Arc<StorageInner>,
}

/// Keep the client-controlled field name from reaching the filesystem as-is
fn sanitize_field_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .take(64)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

impl FileStorage {
    /// Open (and create) the storage directory
    pub async fn new(root: PathBuf, max_bytes: u64) -> Result<Self, GatewayError> {
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| GatewayError::storage(format!("creating {}", root.display()), e))?;

        Ok(Self {
            inner: Arc::new(StorageInner {
                root,
                max_bytes,
                records: RwLock::new(HashMap::new()),
            }),
        })
    }

    /// Start receiving a file for an owner
    ///
    /// Claims a fresh stored name by exclusively creating its `.part` file;
    /// the loop retries on the (negligible) chance of a collision.
    pub async fn begin(
        &self,
        owner_identity_id: Uuid,
        field_name: &str,
    ) -> Result<PendingUpload, GatewayError> {
        let prefix = sanitize_field_name(field_name);

        loop {
            let stored_name = format!(
                "{}-{}-{}",
                prefix,
                Utc::now().timestamp_millis(),
                rand::thread_rng().gen_range(0..1_000_000_000u32)
            );
            let part_path = self.inner.root.join(format!("{stored_name}.part"));

            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&part_path)
                .await
            {
                Ok(file) => {
                    return Ok(PendingUpload {
                        storage: self.clone(),
                        stored_name,
                        part_path,
                        original_fieldname: field_name.to_string(),
                        owner_identity_id,
                        file: Some(file),
                        written: 0,
                        committed: false,
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(GatewayError::storage("claiming upload slot", e)),
            }
        }
    }

    /// Serve a committed upload back to its owner
    ///
    /// Unknown references and references owned by someone else are
    /// indistinguishable to the caller; the ownership mismatch is logged.
    pub async fn serve(
        &self,
        reference: &str,
        requester: Uuid,
    ) -> Result<(UploadRecord, Vec<u8>), GatewayError> {
        let record = self
            .inner
            .records
            .read()
            .await
            .get(reference)
            .cloned()
            .ok_or_else(|| GatewayError::not_found("no such file"))?;

        if record.owner_identity_id != requester {
            tracing::warn!(reference, owner = %record.owner_identity_id, requester = %requester,
                "download denied: reference owned by another identity");
            return Err(GatewayError::not_found("no such file"));
        }

        let path = self.inner.root.join(&record.stored_name);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| GatewayError::storage(format!("reading {}", path.display()), e))?;

        Ok((record, bytes))
    }
}

/// An upload in flight: created by [`FileStorage::begin`], finalized by
/// [`PendingUpload::commit`]
///
/// Dropping an uncommitted upload discards the staged bytes.
pub struct PendingUpload {
    storage: FileStorage,
    stored_name: String,
    part_path: PathBuf,
    original_fieldname: String,
    owner_identity_id: Uuid,
    file: Option<tokio::fs::File>,
    written: u64,
    committed: bool,
}

impl PendingUpload {
    /// Append a chunk, enforcing the size cap
    pub async fn write(&mut self, chunk: &[u8]) -> Result<(), GatewayError> {
        self.written += chunk.len() as u64;
        if self.written > self.storage.inner.max_bytes {
            return Err(GatewayError::TooLarge);
        }

        self.file
            .as_mut()
            .expect("file handle lives until commit")
            .write_all(chunk)
            .await
            .map_err(|e| GatewayError::storage(format!("writing {}", self.part_path.display()), e))
    }

    /// Commit the staged bytes and publish the upload record
    pub async fn commit(mut self) -> Result<UploadRecord, GatewayError> {
        let mut file = self.file.take().expect("commit consumes the handle");
        file.flush()
            .await
            .map_err(|e| GatewayError::storage("flushing upload", e))?;
        drop(file);

        let final_path = self.storage.inner.root.join(&self.stored_name);
        tokio::fs::rename(&self.part_path, &final_path)
            .await
            .map_err(|e| GatewayError::storage(format!("committing {}", self.stored_name), e))?;
        self.committed = true;

        let record = UploadRecord {
            stored_name: self.stored_name.clone(),
            owner_identity_id: self.owner_identity_id,
            original_fieldname: self.original_fieldname.clone(),
            size_bytes: self.written,
            created_at: Utc::now(),
        };

        self.storage
            .inner
            .records
            .write()
            .await
            .insert(record.stored_name.clone(), record.clone());

        tracing::info!(file = %record.stored_name, owner = %record.owner_identity_id,
            size = record.size_bytes, "upload committed");
        Ok(record)
    }
}

impl Drop for PendingUpload {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // interrupted flow: discard the staged bytes so nothing torn
        // survives next to committed files
        drop(self.file.take());
        let path = self.part_path.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = tokio::fs::remove_file(path).await;
            });
        }
    }
}
