use axum::extract::{Multipart, State};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::load_inspection;
use crate::api::PathId;
use crate::audit;
use crate::database::models::{Evidence, InspectionStatus, NewEvidence};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::rbac::ANY_ROLE;
use crate::state::AppState;
use crate::storage::object_path;
use crate::validation::evidence::EvidenceUpload;
use crate::workflow::WorkflowError;

/// GET /api/inspections/:id/evidence
pub async fn list(State(state): State<AppState>, user: CurrentUser, PathId(id): PathId) -> ApiResult<Vec<Evidence>> {
    user.require(ANY_ROLE)?;
    load_inspection(&state, &user, id).await?;
    Ok(ApiResponse::success(state.store.list_evidence(id).await?))
}

/// POST /api/inspections/:id/evidence (multipart)
///
/// Fields: `file` plus optional `latitude`, `longitude`, `accuracy`,
/// `capturedAt` and `annotations` (JSON array). Type and size limits are
/// checked before anything is written.
pub async fn upload(
    State(state): State<AppState>,
    user: CurrentUser,
    PathId(id): PathId,
    mut multipart: Multipart,
) -> ApiResult<Evidence> {
    user.require(ANY_ROLE)?;
    let inspection = load_inspection(&state, &user, id).await?;
    if inspection.status == InspectionStatus::Approved {
        return Err(WorkflowError::NotEditable(inspection.status).into());
    }

    let mut upload = EvidenceUpload::default();
    let mut bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                upload.file_name = field.file_name().map(str::to_string);
                upload.mime_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e)))?;
                upload.size_bytes = data.len() as u64;
                bytes = Some(data);
            }
            "latitude" | "longitude" | "accuracy" | "capturedAt" | "annotations" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read field {}: {}", name, e)))?;
                match name.as_str() {
                    "latitude" => upload.latitude = Some(text),
                    "longitude" => upload.longitude = Some(text),
                    "accuracy" => upload.accuracy = Some(text),
                    "capturedAt" => upload.captured_at = Some(text),
                    _ => upload.annotations = Some(text),
                }
            }
            other => tracing::debug!("Ignoring unknown multipart field '{}'", other),
        }
    }

    let Some(bytes) = bytes else {
        return Err(ApiError::field_error("file", "file is required"));
    };

    let existing = state.store.evidence_bytes_for_inspection(id).await?;
    let valid = upload.validate(&state.config.evidence, existing.max(0) as u64)?;

    let evidence_id = Uuid::new_v4();
    let path = object_path(id, evidence_id, &valid.file_name);
    let checksum = format!("{:x}", Sha256::digest(&bytes));
    let stored = state.storage.put(&path, &bytes, &valid.mime_type).await?;

    let new = NewEvidence {
        id: evidence_id,
        inspection_id: id,
        uploaded_by: user.id,
        file_name: valid.file_name,
        mime_type: valid.mime_type,
        size_bytes: valid.size_bytes as i64,
        checksum,
        storage_path: stored.path.clone(),
        url: stored.url,
        latitude: valid.latitude,
        longitude: valid.longitude,
        accuracy: valid.accuracy,
        captured_at: valid.captured_at,
        annotations: valid.annotations,
    };
    let evidence = match state.store.create_evidence(new).await {
        Ok(evidence) => evidence,
        Err(e) => {
            if let Err(cleanup) = state.storage.delete(&stored.path).await {
                tracing::warn!(path = %stored.path, "Failed to remove orphaned evidence file: {}", cleanup);
            }
            return Err(e.into());
        }
    };

    audit::record(
        &state.store,
        user.id,
        "evidence",
        evidence.id,
        "upload",
        json!({
            "inspectionId": id,
            "mimeType": evidence.mime_type,
            "sizeBytes": evidence.size_bytes,
        }),
    );
    Ok(ApiResponse::created(evidence))
}

/// GET /api/evidence/:id
pub async fn show(State(state): State<AppState>, user: CurrentUser, PathId(id): PathId) -> ApiResult<Evidence> {
    user.require(ANY_ROLE)?;
    let evidence = state.store.get_evidence(id).await?;
    load_inspection(&state, &user, evidence.inspection_id).await?;
    Ok(ApiResponse::success(evidence))
}

/// DELETE /api/evidence/:id - the uploader or a manager
pub async fn delete(State(state): State<AppState>, user: CurrentUser, PathId(id): PathId) -> ApiResult<Value> {
    user.require(ANY_ROLE)?;
    let evidence = state.store.get_evidence(id).await?;
    if !user.is_manager() && evidence.uploaded_by != user.id {
        return Err(ApiError::forbidden("Only the uploader or a manager can delete evidence"));
    }

    state.store.delete_evidence(id).await?;
    if let Err(e) = state.storage.delete(&evidence.storage_path).await {
        tracing::warn!(path = %evidence.storage_path, "Failed to remove evidence file: {}", e);
    }

    audit::record(
        &state.store,
        user.id,
        "evidence",
        id,
        "delete",
        json!({ "inspectionId": evidence.inspection_id }),
    );
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
