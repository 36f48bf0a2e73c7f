use crate::{
    errors::AppResult,
    models::dto::response::{HealthResponse, StatsResponse},
    repositories::Storage,
};

pub struct StatsService {
    storage: Storage,
}

impl StatsService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Counting rows doubles as a storage round-trip.
    pub async fn health(&self) -> AppResult<HealthResponse> {
        Ok(HealthResponse {
            status: "ok".to_string(),
            backend: self.storage.backend.as_str().to_string(),
            lessons: self.storage.lessons.count().await?,
            quizzes: self.storage.quizzes.count().await?,
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    pub async fn stats(&self) -> AppResult<StatsResponse> {
        Ok(StatsResponse {
            lessons: self.storage.lessons.count().await?,
            quizzes: self.storage.quizzes.count().await?,
            media_files: self.storage.media.count().await?,
            quiz_results: self.storage.results.count().await?,
            average_score: self.storage.results.average_percentage().await?,
        })
    }
}
