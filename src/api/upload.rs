use std::path::Path;

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{HttpResponse, web};
use chrono::Utc;
use futures::TryStreamExt;
use serde::Serialize;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
};

/// URL prefix the upload directory is served under.
pub const UPLOADS_MOUNT: &str = "/uploads";

const DEFAULT_FOLDER: &str = "misc";
const MAX_FOLDER_BYTES: usize = 128;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    #[schema(example = "/uploads/surat-masuk/1704067200000_undangan_rapat.pdf")]
    pub url: String,
}

/// Folder names are restricted to `[A-Za-z0-9_-]`; anything else is dropped.
pub fn sanitize_folder(raw: Option<&str>) -> String {
    let cleaned: String = raw
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();

    if cleaned.is_empty() {
        DEFAULT_FOLDER.to_string()
    } else {
        cleaned
    }
}

/// Keeps only the last path component and replaces spaces with underscores.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(raw);
    let name = base.trim().replace(' ', "_");

    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name)
    }
}

/// Writes `bytes` to `<root>/<folder>/<stamp>_<name>` and returns the public URL.
pub async fn store_upload(
    root: &Path,
    folder: Option<&str>,
    file_name: &str,
    bytes: &[u8],
    stamp_millis: i64,
) -> ApiResult<String> {
    let folder = sanitize_folder(folder);
    let name = sanitize_file_name(file_name)
        .ok_or_else(|| ApiError::Validation("Invalid file name".into()))?;
    let file_name = format!("{stamp_millis}_{name}");

    let dir = root.join(&folder);
    tokio::fs::create_dir_all(&dir).await.map_err(|e| {
        error!(error = %e, dir = %dir.display(), "Failed to create upload directory");
        ApiError::Internal(format!("Failed to create upload directory: {e}"))
    })?;

    let path = dir.join(&file_name);
    tokio::fs::write(&path, bytes).await.map_err(|e| {
        error!(error = %e, path = %path.display(), "Failed to write upload");
        ApiError::Internal(format!("Failed to write upload: {e}"))
    })?;

    Ok(format!("{UPLOADS_MOUNT}/{folder}/{file_name}"))
}

fn bad_multipart(err: MultipartError) -> ApiError {
    ApiError::Validation(format!("Malformed multipart body: {err}"))
}

async fn read_field(field: &mut Field, limit: usize) -> ApiResult<Vec<u8>> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
        if buf.len() + chunk.len() > limit {
            return Err(ApiError::Validation(format!(
                "Upload exceeds the {limit} byte limit"
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

/// Upload file
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = String, description = "Multipart form with `file` and optional `folder`", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "No file received, invalid name or too large", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Upload"
)]
pub async fn upload_file(
    config: web::Data<Config>,
    mut payload: Multipart,
) -> ApiResult<HttpResponse> {
    let mut folder: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(mut field) = payload.try_next().await.map_err(bad_multipart)? {
        let disposition = field.content_disposition().clone();
        match disposition.get_name() {
            Some("file") => {
                let name = disposition.get_filename().unwrap_or_default().to_string();
                let bytes = read_field(&mut field, config.max_upload_bytes).await?;
                // Browsers send an empty, nameless part when no file was picked.
                if !(name.is_empty() && bytes.is_empty()) {
                    file = Some((name, bytes));
                }
            }
            Some("folder") => {
                let bytes = read_field(&mut field, MAX_FOLDER_BYTES).await?;
                folder = Some(String::from_utf8_lossy(&bytes).into_owned());
            }
            _ => {
                read_field(&mut field, config.max_upload_bytes).await?;
            }
        }
    }

    let Some((name, bytes)) = file else {
        return Err(ApiError::Validation("No file received".into()));
    };

    let url = store_upload(
        &config.upload_dir,
        folder.as_deref(),
        &name,
        &bytes,
        Utc::now().timestamp_millis(),
    )
    .await?;

    info!(%url, size = bytes.len(), "File uploaded");
    Ok(HttpResponse::Ok().json(UploadResponse { url }))
}
