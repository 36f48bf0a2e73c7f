use actix_files::NamedFile;
use actix_web::{get, http::Method, web, HttpRequest, HttpResponse};

use crate::{app_state::AppState, errors::AppError};

#[get("/api/health")]
async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let health = state.stats_service.health().await?;
    Ok(HttpResponse::Ok().json(health))
}

#[get("/api/stats")]
async fn stats(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let stats = state.stats_service.stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Fallback route: any other GET outside `/api` gets the single-page client.
pub async fn client_shell(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if req.method() != Method::GET || req.path().starts_with("/api/") {
        return Err(AppError::NotFound(format!(
            "No route for {} {}",
            req.method(),
            req.path()
        )));
    }

    let shell = NamedFile::open_async(&state.config.client_shell_path)
        .await
        .map_err(|err| {
            log::warn!(
                "Client shell {} unavailable: {}",
                state.config.client_shell_path.display(),
                err
            );
            AppError::NotFound("Client shell not found".to_string())
        })?;
    Ok(shell.into_response(&req))
}
