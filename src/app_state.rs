use std::sync::Arc;

use crate::{
    config::{Config, StorageBackend},
    db::{Database, SqliteDb},
    errors::AppResult,
    repositories::{DraftRepository, FileDraftRepository, Storage},
    services::{
        draft_service::DraftService, lesson_service::LessonService, quiz_service::QuizService,
        stats_service::StatsService, upload_service::UploadService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub lesson_service: Arc<LessonService>,
    pub quiz_service: Arc<QuizService>,
    pub upload_service: Arc<UploadService>,
    pub draft_service: Arc<DraftService>,
    pub stats_service: Arc<StatsService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let storage = match config.storage_backend {
            StorageBackend::Memory => Storage::memory(),
            StorageBackend::Sqlite => Storage::sqlite(SqliteDb::open(&config.sqlite_path)?),
            StorageBackend::Mongo => {
                let db = Database::connect(&config).await?;
                Storage::mongo(&db).await?
            }
        };
        log::info!("Using {} storage backend", storage.backend.as_str());

        let drafts = Arc::new(FileDraftRepository::new(config.drafts_dir.clone()));
        Ok(Self::from_parts(config, storage, drafts))
    }

    /// Wire services over already constructed storage.
    pub fn from_parts(config: Config, storage: Storage, drafts: Arc<dyn DraftRepository>) -> Self {
        let lesson_service = Arc::new(LessonService::new(
            storage.lessons.clone(),
            storage.quizzes.clone(),
            storage.results.clone(),
            drafts.clone(),
        ));
        let quiz_service = Arc::new(QuizService::new(
            storage.quizzes.clone(),
            storage.lessons.clone(),
            storage.results.clone(),
            config.default_passing_score,
        ));
        let upload_service = Arc::new(UploadService::new(
            storage.media.clone(),
            config.upload_dir.clone(),
            config.max_upload_bytes,
        ));
        let draft_service = Arc::new(DraftService::new(
            drafts,
            storage.lessons.clone(),
            storage.quizzes.clone(),
            quiz_service.clone(),
        ));
        let stats_service = Arc::new(StatsService::new(storage));

        Self {
            lesson_service,
            quiz_service,
            upload_service,
            draft_service,
            stats_service,
            config: Arc::new(config),
        }
    }
}
