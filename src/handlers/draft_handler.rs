use actix_web::{delete, get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    authoring::EditCommand,
    errors::AppError,
    models::dto::{
        request::{AutosaveRequest, SaveDraftRequest},
        response::{MessageResponse, ValidationResponse},
    },
};

#[get("/api/autosave/{lesson_id}")]
async fn get_autosave(
    state: web::Data<AppState>,
    lesson_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let autosave = state.draft_service.get_autosave(&lesson_id).await?;
    Ok(HttpResponse::Ok().json(autosave))
}

#[post("/api/autosave/{lesson_id}")]
async fn save_autosave(
    state: web::Data<AppState>,
    lesson_id: web::Path<String>,
    request: web::Json<AutosaveRequest>,
) -> Result<HttpResponse, AppError> {
    let autosave = state
        .draft_service
        .autosave(&lesson_id, request.into_inner().content)
        .await?;
    Ok(HttpResponse::Ok().json(autosave))
}

#[delete("/api/autosave/{lesson_id}")]
async fn clear_autosave(
    state: web::Data<AppState>,
    lesson_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let removed = state.draft_service.clear_autosave(&lesson_id).await?;
    let message = if removed {
        "Autosave cleared"
    } else {
        "Nothing to clear"
    };
    Ok(HttpResponse::Ok().json(MessageResponse::new(message)))
}

#[get("/api/drafts/{lesson_id}")]
async fn get_draft(
    state: web::Data<AppState>,
    lesson_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let draft = state.draft_service.get_draft(&lesson_id).await?;
    Ok(HttpResponse::Ok().json(draft))
}

#[delete("/api/drafts/{lesson_id}")]
async fn discard_draft(
    state: web::Data<AppState>,
    lesson_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let removed = state.draft_service.discard_draft(&lesson_id).await?;
    let message = if removed {
        "Draft discarded"
    } else {
        "Nothing to discard"
    };
    Ok(HttpResponse::Ok().json(MessageResponse::new(message)))
}

#[post("/api/drafts/{lesson_id}/commands")]
async fn apply_command(
    state: web::Data<AppState>,
    lesson_id: web::Path<String>,
    command: web::Json<EditCommand>,
) -> Result<HttpResponse, AppError> {
    let draft = state
        .draft_service
        .apply_command(&lesson_id, command.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(draft))
}

#[post("/api/drafts/{lesson_id}/validate")]
async fn validate_draft(
    state: web::Data<AppState>,
    lesson_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let errors = state.draft_service.validate_draft(&lesson_id).await?;
    Ok(HttpResponse::Ok().json(ValidationResponse {
        valid: errors.is_empty(),
        errors,
    }))
}

#[post("/api/drafts/{lesson_id}/save")]
async fn save_draft(
    state: web::Data<AppState>,
    lesson_id: web::Path<String>,
    request: Option<web::Json<SaveDraftRequest>>,
) -> Result<HttpResponse, AppError> {
    let request = request.map(web::Json::into_inner).unwrap_or_default();
    let quiz = state.draft_service.save_draft(&lesson_id, request).await?;
    Ok(HttpResponse::Ok().json(quiz))
}
