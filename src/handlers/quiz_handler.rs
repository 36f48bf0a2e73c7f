use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    middleware::get_request_id,
    models::dto::{
        request::{CreateQuizRequest, SubmitQuizRequest, UpdateQuizRequest},
        response::MessageResponse,
    },
};

#[get("/api/quizzes")]
async fn list_quizzes(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let quizzes = state.quiz_service.list_quizzes().await?;
    Ok(HttpResponse::Ok().json(quizzes))
}

#[post("/api/quizzes")]
async fn create_quiz(
    state: web::Data<AppState>,
    request: web::Json<CreateQuizRequest>,
) -> Result<HttpResponse, AppError> {
    let quiz = state.quiz_service.create_quiz(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(quiz))
}

// Registered before `/api/quizzes/{id}` routes.
#[get("/api/quizzes/lesson/{lesson_id}")]
async fn get_quiz_by_lesson(
    state: web::Data<AppState>,
    lesson_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let quiz = state.quiz_service.get_quiz_by_lesson(&lesson_id).await?;
    Ok(HttpResponse::Ok().json(quiz))
}

#[get("/api/quizzes/{id}")]
async fn get_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let quiz = state.quiz_service.get_quiz(&id).await?;
    Ok(HttpResponse::Ok().json(quiz))
}

#[put("/api/quizzes/{id}")]
async fn update_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateQuizRequest>,
) -> Result<HttpResponse, AppError> {
    let quiz = state
        .quiz_service
        .update_quiz(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(quiz))
}

#[delete("/api/quizzes/{id}")]
async fn delete_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.quiz_service.delete_quiz(&id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Quiz deleted")))
}

#[post("/api/quizzes/{id}/submit")]
async fn submit_quiz(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<SubmitQuizRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state
        .quiz_service
        .submit_quiz(&id, request.into_inner())
        .await?;
    log::debug!(
        "request {} graded quiz {}: {}%",
        get_request_id(&req).unwrap_or_default(),
        id,
        response.percentage
    );
    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/quizzes/{id}/results")]
async fn list_results(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let results = state.quiz_service.list_results(&id).await?;
    Ok(HttpResponse::Ok().json(results))
}
