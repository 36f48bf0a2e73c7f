use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{
        request::{CreateLessonRequest, UpdateLessonRequest},
        response::MessageResponse,
    },
};

#[get("/api/lessons")]
async fn list_lessons(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let lessons = state.lesson_service.list_lessons().await?;
    Ok(HttpResponse::Ok().json(lessons))
}

#[post("/api/lessons")]
async fn create_lesson(
    state: web::Data<AppState>,
    request: web::Json<CreateLessonRequest>,
) -> Result<HttpResponse, AppError> {
    let lesson = state
        .lesson_service
        .create_lesson(request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(lesson))
}

#[get("/api/lessons/{id}")]
async fn get_lesson(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let lesson = state.lesson_service.get_lesson(&id).await?;
    Ok(HttpResponse::Ok().json(lesson))
}

#[put("/api/lessons/{id}")]
async fn update_lesson(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateLessonRequest>,
) -> Result<HttpResponse, AppError> {
    let lesson = state
        .lesson_service
        .update_lesson(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(lesson))
}

#[delete("/api/lessons/{id}")]
async fn delete_lesson(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.lesson_service.delete_lesson(&id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Lesson deleted")))
}
