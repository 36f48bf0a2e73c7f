pub mod draft_repository;
pub mod lesson_repository;
pub mod media_repository;
pub mod memory;
pub mod quiz_repository;
pub mod quiz_result_repository;
pub mod sqlite;

use std::sync::Arc;

use crate::{
    config::StorageBackend,
    db::{Database, SqliteDb},
    errors::AppResult,
};

pub use draft_repository::{DraftRepository, FileDraftRepository, InMemoryDraftRepository};
pub use lesson_repository::{LessonRepository, MongoLessonRepository};
pub use media_repository::{MediaRepository, MongoMediaRepository};
pub use memory::{
    InMemoryLessonRepository, InMemoryMediaRepository, InMemoryQuizRepository,
    InMemoryQuizResultRepository,
};
pub use quiz_repository::{MongoQuizRepository, QuizRepository};
pub use quiz_result_repository::{MongoQuizResultRepository, QuizResultRepository};
pub use sqlite::{
    SqliteLessonRepository, SqliteMediaRepository, SqliteQuizRepository,
    SqliteQuizResultRepository,
};

/// The four persistent repositories of one backend.
#[derive(Clone)]
pub struct Storage {
    pub backend: StorageBackend,
    pub lessons: Arc<dyn LessonRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub results: Arc<dyn QuizResultRepository>,
    pub media: Arc<dyn MediaRepository>,
}

impl Storage {
    pub fn memory() -> Self {
        Self {
            backend: StorageBackend::Memory,
            lessons: Arc::new(InMemoryLessonRepository::new()),
            quizzes: Arc::new(InMemoryQuizRepository::new()),
            results: Arc::new(InMemoryQuizResultRepository::new()),
            media: Arc::new(InMemoryMediaRepository::new()),
        }
    }

    pub fn sqlite(db: SqliteDb) -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            lessons: Arc::new(SqliteLessonRepository::new(db.clone())),
            quizzes: Arc::new(SqliteQuizRepository::new(db.clone())),
            results: Arc::new(SqliteQuizResultRepository::new(db.clone())),
            media: Arc::new(SqliteMediaRepository::new(db)),
        }
    }

    pub async fn mongo(db: &Database) -> AppResult<Self> {
        let lessons = MongoLessonRepository::new(db);
        lessons.ensure_indexes().await?;
        let quizzes = MongoQuizRepository::new(db);
        quizzes.ensure_indexes().await?;
        let results = MongoQuizResultRepository::new(db);
        results.ensure_indexes().await?;
        let media = MongoMediaRepository::new(db);
        media.ensure_indexes().await?;

        Ok(Self {
            backend: StorageBackend::Mongo,
            lessons: Arc::new(lessons),
            quizzes: Arc::new(quizzes),
            results: Arc::new(results),
            media: Arc::new(media),
        })
    }
}
