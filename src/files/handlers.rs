/**
 * File Transfer Handlers
 *
 * Upload: multipart single-file, bound to the authenticated identity.
 * Download: by explicit reference, owner only.
 *
 * Exactly one file is accepted per request under the `file` field; a second
 * file part fails the whole request rather than being silently dropped.
 */

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::GatewayError;
use crate::files::storage::PendingUpload;
use crate::middleware::guard::AuthIdentity;
use crate::server::state::AppState;

/// Multipart field uploads must arrive under
pub const UPLOAD_FIELD: &str = "file";

/// Upload response body
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Download reference for the stored file
    pub file: String,
    pub size_bytes: u64,
}

/// `POST /files/upload/{user_id}`
///
/// The path binds the upload to an identity; the attached identity must be
/// that same identity, closing the gap where any authenticated caller could
/// write uploads for anyone.
pub async fn upload_file(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    Path(user_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, GatewayError> {
    if identity.id != user_id {
        tracing::warn!(requester = %identity.id, target = %user_id,
            "upload bound to another identity denied");
        return Err(GatewayError::Unauthorized);
    }

    let mut pending: Option<PendingUpload> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| GatewayError::invalid_request(format!("malformed multipart body: {e}")))?
    {
        // non-file form fields are not part of the transfer contract
        if field.file_name().is_none() {
            continue;
        }

        if pending.is_some() {
            // dropping the staged upload discards its bytes
            return Err(GatewayError::invalid_request(
                "exactly one file per upload request",
            ));
        }

        let field_name = field.name().unwrap_or_default().to_string();
        if field_name != UPLOAD_FIELD {
            return Err(GatewayError::invalid_request(format!(
                "unexpected file field: {field_name}"
            )));
        }

        let mut sink = state.storage.begin(identity.id, &field_name).await?;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| GatewayError::invalid_request(format!("upload stream failed: {e}")))?
        {
            sink.write(&chunk).await?;
        }
        pending = Some(sink);
    }

    let record = pending
        .ok_or_else(|| {
            GatewayError::invalid_request(format!("upload requires a file under \"{UPLOAD_FIELD}\""))
        })?
        .commit()
        .await?;

    Ok(Json(UploadResponse {
        file: record.stored_name,
        size_bytes: record.size_bytes,
    }))
}

/// `GET /download/{reference}`
///
/// Serves a stored file to its owner as an attachment.
pub async fn download_file(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let (record, bytes) = state.storage.serve(&reference, identity.id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", record.stored_name),
            ),
        ],
        bytes,
    ))
}
