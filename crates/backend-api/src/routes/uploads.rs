//! Multipart uploads stored under the public directory.

use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tokio::fs;
use tracing::info;
use utoipa::ToSchema;

use crate::{ApiError, AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub path: String,
    pub size: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub files: Vec<UploadedFile>,
}

/// Where a file lands: images by field (`profile`, `product`), everything
/// else under `documents`.
pub fn destination_for(public_dir: &Path, field: &str, content_type: Option<&str>) -> PathBuf {
    let is_image = content_type.is_some_and(|mime| mime.starts_with("image/"));

    if !is_image {
        return public_dir.join("documents");
    }

    match field {
        "profile" => public_dir.join("img").join("profiles"),
        "product" => public_dir.join("img").join("products"),
        _ => public_dir.to_path_buf(),
    }
}

/// Last path component of a client-supplied file name.
pub fn sanitize_file_name(raw: &str) -> Option<&str> {
    let name = raw.rsplit(['/', '\\']).next()?.trim();
    match name {
        "" | "." | ".." => None,
        name => Some(name),
    }
}

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "Uploads",
    request_body(content = String, content_type = "multipart/form-data", description = "Files in `profile`, `product` or any other field"),
    responses(
        (status = 200, description = "Files stored", body = UploadResponse),
        (status = 400, description = "Malformed upload", body = crate::error::ErrorResponse),
        (status = 500, description = "Files could not be written", body = crate::error::ErrorResponse)
    )
)]
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("invalid multipart"))?
    {
        // Plain form fields carry no file name.
        let Some(raw_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let file_name = sanitize_file_name(&raw_name)
            .ok_or_else(|| ApiError::bad_request("invalid file name"))?
            .to_owned();
        let field_name = field.name().unwrap_or_default().to_owned();
        let content_type = field.content_type().map(str::to_owned);

        let data = field
            .bytes()
            .await
            .map_err(|_| ApiError::bad_request("invalid file contents"))?;

        let directory = destination_for(state.public_dir(), &field_name, content_type.as_deref());
        fs::create_dir_all(&directory)
            .await
            .with_context(|| format!("failed to create upload directory {}", directory.display()))?;

        let path = directory.join(&file_name);
        fs::write(&path, &data)
            .await
            .with_context(|| format!("failed to write upload {}", path.display()))?;

        info!(field = %field_name, path = %path.display(), size = data.len(), "stored upload");

        files.push(UploadedFile {
            field: field_name,
            file_name,
            content_type,
            path: path.display().to_string(),
            size: data.len(),
        });
    }

    if files.is_empty() {
        return Err(ApiError::bad_request("no files uploaded"));
    }

    Ok(Json(UploadResponse { files }))
}
