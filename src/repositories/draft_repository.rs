use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::RwLock;

use crate::{
    authoring::QuizDraft,
    errors::{AppError, AppResult},
    models::domain::LessonAutosave,
};

static DRAFT_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{1,128}$").expect("DRAFT_KEY_REGEX is a valid regex pattern")
});

/// Lesson ids double as file names, so only a safe alphabet is accepted.
pub fn check_draft_key(lesson_id: &str) -> AppResult<()> {
    if DRAFT_KEY_REGEX.is_match(lesson_id) {
        Ok(())
    } else {
        Err(AppError::ValidationError(format!(
            "'{}' is not a valid lesson id",
            lesson_id
        )))
    }
}

/// Durable key-value store for unsaved work, keyed by lesson id.
/// Writes overwrite; the last one wins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DraftRepository: Send + Sync {
    async fn load_quiz_draft(&self, lesson_id: &str) -> AppResult<Option<QuizDraft>>;
    async fn save_quiz_draft(&self, draft: QuizDraft) -> AppResult<QuizDraft>;
    async fn delete_quiz_draft(&self, lesson_id: &str) -> AppResult<bool>;

    async fn load_autosave(&self, lesson_id: &str) -> AppResult<Option<LessonAutosave>>;
    async fn save_autosave(&self, autosave: LessonAutosave) -> AppResult<LessonAutosave>;
    async fn delete_autosave(&self, lesson_id: &str) -> AppResult<bool>;
}

/// One JSON file per draft under `<root>/quizzes` and `<root>/lessons`.
pub struct FileDraftRepository {
    root: PathBuf,
}

impl FileDraftRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, kind: &str, lesson_id: &str) -> AppResult<PathBuf> {
        check_draft_key(lesson_id)?;
        Ok(self.root.join(kind).join(format!("{}.json", lesson_id)))
    }

    async fn read<T: serde::de::DeserializeOwned>(path: &Path) -> AppResult<Option<T>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn write<T: serde::Serialize>(path: &Path, value: &T) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    async fn remove(path: &Path) -> AppResult<bool> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl DraftRepository for FileDraftRepository {
    async fn load_quiz_draft(&self, lesson_id: &str) -> AppResult<Option<QuizDraft>> {
        Self::read(&self.path_for("quizzes", lesson_id)?).await
    }

    async fn save_quiz_draft(&self, draft: QuizDraft) -> AppResult<QuizDraft> {
        Self::write(&self.path_for("quizzes", &draft.lesson_id)?, &draft).await?;
        Ok(draft)
    }

    async fn delete_quiz_draft(&self, lesson_id: &str) -> AppResult<bool> {
        Self::remove(&self.path_for("quizzes", lesson_id)?).await
    }

    async fn load_autosave(&self, lesson_id: &str) -> AppResult<Option<LessonAutosave>> {
        Self::read(&self.path_for("lessons", lesson_id)?).await
    }

    async fn save_autosave(&self, autosave: LessonAutosave) -> AppResult<LessonAutosave> {
        Self::write(&self.path_for("lessons", &autosave.lesson_id)?, &autosave).await?;
        Ok(autosave)
    }

    async fn delete_autosave(&self, lesson_id: &str) -> AppResult<bool> {
        Self::remove(&self.path_for("lessons", lesson_id)?).await
    }
}

#[derive(Default)]
pub struct InMemoryDraftRepository {
    quiz_drafts: RwLock<HashMap<String, QuizDraft>>,
    autosaves: RwLock<HashMap<String, LessonAutosave>>,
}

impl InMemoryDraftRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftRepository for InMemoryDraftRepository {
    async fn load_quiz_draft(&self, lesson_id: &str) -> AppResult<Option<QuizDraft>> {
        Ok(self.quiz_drafts.read().await.get(lesson_id).cloned())
    }

    async fn save_quiz_draft(&self, draft: QuizDraft) -> AppResult<QuizDraft> {
        check_draft_key(&draft.lesson_id)?;
        self.quiz_drafts
            .write()
            .await
            .insert(draft.lesson_id.clone(), draft.clone());
        Ok(draft)
    }

    async fn delete_quiz_draft(&self, lesson_id: &str) -> AppResult<bool> {
        Ok(self.quiz_drafts.write().await.remove(lesson_id).is_some())
    }

    async fn load_autosave(&self, lesson_id: &str) -> AppResult<Option<LessonAutosave>> {
        Ok(self.autosaves.read().await.get(lesson_id).cloned())
    }

    async fn save_autosave(&self, autosave: LessonAutosave) -> AppResult<LessonAutosave> {
        check_draft_key(&autosave.lesson_id)?;
        self.autosaves
            .write()
            .await
            .insert(autosave.lesson_id.clone(), autosave.clone());
        Ok(autosave)
    }

    async fn delete_autosave(&self, lesson_id: &str) -> AppResult<bool> {
        Ok(self.autosaves.write().await.remove(lesson_id).is_some())
    }
}
