use actix_multipart::Multipart;
use actix_web::{delete, get, post, web, HttpResponse};
use futures::TryStreamExt;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::response::{MessageResponse, UploadResponse},
};

const FILE_FIELD: &str = "file";

/// Accepts a multipart body with a `file` field; other fields are ignored.
#[post("/api/upload")]
async fn upload_file(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let uploads = &state.upload_service;
    let limit = uploads.max_upload_bytes();

    while let Some(mut field) = payload.try_next().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();
        let mime_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if (bytes.len() + chunk.len()) as u64 > limit {
                return Err(uploads.too_large());
            }
            bytes.extend_from_slice(&chunk);
        }

        let file = uploads.store(&original_name, &mime_type, &bytes).await?;
        return Ok(HttpResponse::Ok().json(UploadResponse::from(file)));
    }

    Err(AppError::ValidationError("No file uploaded".to_string()))
}

#[get("/api/upload")]
async fn list_uploads(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let files = state.upload_service.list_files().await?;
    Ok(HttpResponse::Ok().json(files))
}

#[delete("/api/upload/{filename}")]
async fn delete_upload(
    state: web::Data<AppState>,
    filename: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.upload_service.delete_file(&filename).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("File deleted")))
}
