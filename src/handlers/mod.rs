pub mod draft_handler;
pub mod health_handler;
pub mod lesson_handler;
pub mod quiz_handler;
pub mod upload_handler;

use actix_files::Files;
use actix_web::web;

use crate::{config::Config, errors::AppError};

pub use health_handler::client_shell;

/// Registers every `/api` route plus the extractor error handlers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("Invalid JSON body: {}", err)).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("Invalid path: {}", err)).into()
    }))
    .service(health_handler::health_check)
    .service(health_handler::stats)
    .service(lesson_handler::list_lessons)
    .service(lesson_handler::create_lesson)
    .service(lesson_handler::get_lesson)
    .service(lesson_handler::update_lesson)
    .service(lesson_handler::delete_lesson)
    .service(quiz_handler::list_quizzes)
    .service(quiz_handler::create_quiz)
    .service(quiz_handler::get_quiz_by_lesson)
    .service(quiz_handler::get_quiz)
    .service(quiz_handler::update_quiz)
    .service(quiz_handler::delete_quiz)
    .service(quiz_handler::submit_quiz)
    .service(quiz_handler::list_results)
    .service(upload_handler::upload_file)
    .service(upload_handler::list_uploads)
    .service(upload_handler::delete_upload)
    .service(draft_handler::get_autosave)
    .service(draft_handler::save_autosave)
    .service(draft_handler::clear_autosave)
    .service(draft_handler::get_draft)
    .service(draft_handler::discard_draft)
    .service(draft_handler::apply_command)
    .service(draft_handler::validate_draft)
    .service(draft_handler::save_draft);
}

/// Serves stored uploads under `/uploads` and falls back to the client shell.
pub fn configure_static(config: &Config) -> impl FnOnce(&mut web::ServiceConfig) {
    let upload_dir = config.upload_dir.clone();
    move |cfg: &mut web::ServiceConfig| {
        cfg.service(Files::new("/uploads", upload_dir))
            .default_service(web::route().to(client_shell));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use super::*;
    use crate::{
        app_state::AppState,
        repositories::{InMemoryDraftRepository, Storage},
        test_utils::test_helpers::{assert_error_status, assert_success_status},
    };

    fn test_state() -> AppState {
        AppState::from_parts(
            Config::test_config(),
            Storage::memory(),
            Arc::new(InMemoryDraftRepository::new()),
        )
    }

    #[actix_web::test]
    async fn test_health_check_reports_backend() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["backend"], "memory");
    }

    #[actix_web::test]
    async fn test_malformed_json_is_a_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/lessons")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 400);
    }

    #[actix_web::test]
    async fn test_unknown_lesson_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/lessons/missing")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_error_status(resp.status());
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_lesson_route_wins_over_quiz_id_route() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/lessons")
            .set_json(json!({ "title": "Routing" }))
            .to_request();
        let lesson: Value = test::call_and_read_body_json(&app, req).await;
        let lesson_id = lesson["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/api/quizzes")
            .set_json(json!({
                "lessonId": lesson_id,
                "title": "Routing quiz",
                "questions": []
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_success_status(resp.status());
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::get()
            .uri(&format!("/api/quizzes/lesson/{}", lesson_id))
            .to_request();
        let quiz: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(quiz["lessonId"], lesson_id);
        assert_eq!(quiz["lessonTitle"], "Routing");
    }

    #[actix_web::test]
    async fn test_non_get_fallback_is_not_found() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure)
                .configure(configure_static(&state.config)),
        )
        .await;

        let req = test::TestRequest::post().uri("/nowhere").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
