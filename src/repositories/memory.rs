use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Lesson, MediaFile, Quiz, QuizResult},
    repositories::{
        quiz_repository::duplicate_quiz_error, LessonRepository, MediaRepository,
        QuizRepository, QuizResultRepository,
    },
};

/// Process-local storage; everything is lost on restart.
#[derive(Clone, Default)]
pub struct InMemoryLessonRepository {
    lessons: Arc<RwLock<HashMap<String, Lesson>>>,
}

impl InMemoryLessonRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LessonRepository for InMemoryLessonRepository {
    async fn create(&self, lesson: Lesson) -> AppResult<Lesson> {
        let mut lessons = self.lessons.write().await;
        lessons.insert(lesson.id.clone(), lesson.clone());
        Ok(lesson)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Lesson>> {
        Ok(self.lessons.read().await.get(id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<Lesson>> {
        Ok(self.lessons.read().await.values().cloned().collect())
    }

    async fn update(&self, lesson: Lesson) -> AppResult<Lesson> {
        let mut lessons = self.lessons.write().await;
        match lessons.get_mut(&lesson.id) {
            Some(existing) => {
                *existing = lesson.clone();
                Ok(lesson)
            }
            None => Err(AppError::NotFound(format!(
                "Lesson with id '{}' not found",
                lesson.id
            ))),
        }
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        Ok(self.lessons.write().await.remove(id).is_some())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.lessons.read().await.len() as u64)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryQuizRepository {
    quizzes: Arc<RwLock<HashMap<String, Quiz>>>,
}

impl InMemoryQuizRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn create(&self, quiz: Quiz) -> AppResult<Quiz> {
        let mut quizzes = self.quizzes.write().await;
        if quizzes.values().any(|q| q.lesson_id == quiz.lesson_id) {
            return Err(duplicate_quiz_error(&quiz.lesson_id));
        }
        quizzes.insert(quiz.id.clone(), quiz.clone());
        Ok(quiz)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        Ok(self.quizzes.read().await.get(id).cloned())
    }

    async fn find_by_lesson(&self, lesson_id: &str) -> AppResult<Option<Quiz>> {
        let quizzes = self.quizzes.read().await;
        Ok(quizzes.values().find(|q| q.lesson_id == lesson_id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<Quiz>> {
        let mut items: Vec<Quiz> = self.quizzes.read().await.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn update(&self, quiz: Quiz) -> AppResult<Quiz> {
        let mut quizzes = self.quizzes.write().await;
        if !quizzes.contains_key(&quiz.id) {
            return Err(AppError::NotFound(format!(
                "Quiz with id '{}' not found",
                quiz.id
            )));
        }
        quizzes.insert(quiz.id.clone(), quiz.clone());
        Ok(quiz)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        Ok(self.quizzes.write().await.remove(id).is_some())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.quizzes.read().await.len() as u64)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryQuizResultRepository {
    results: Arc<RwLock<Vec<QuizResult>>>,
}

impl InMemoryQuizResultRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizResultRepository for InMemoryQuizResultRepository {
    async fn create(&self, result: QuizResult) -> AppResult<QuizResult> {
        self.results.write().await.push(result.clone());
        Ok(result)
    }

    async fn find_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizResult>> {
        let results = self.results.read().await;
        let mut items: Vec<QuizResult> = results
            .iter()
            .filter(|r| r.quiz_id == quiz_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(items)
    }

    async fn delete_by_quiz(&self, quiz_id: &str) -> AppResult<u64> {
        let mut results = self.results.write().await;
        let before = results.len();
        results.retain(|r| r.quiz_id != quiz_id);
        Ok((before - results.len()) as u64)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.results.read().await.len() as u64)
    }

    async fn average_percentage(&self) -> AppResult<Option<f64>> {
        let results = self.results.read().await;
        if results.is_empty() {
            return Ok(None);
        }
        let total: f64 = results.iter().map(|r| f64::from(r.percentage)).sum();
        Ok(Some(total / results.len() as f64))
    }
}

#[derive(Clone, Default)]
pub struct InMemoryMediaRepository {
    files: Arc<RwLock<HashMap<String, MediaFile>>>,
}

impl InMemoryMediaRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MediaRepository for InMemoryMediaRepository {
    async fn create(&self, file: MediaFile) -> AppResult<MediaFile> {
        let mut files = self.files.write().await;
        if files.contains_key(&file.filename) {
            return Err(AppError::ValidationError(format!(
                "File '{}' already exists",
                file.filename
            )));
        }
        files.insert(file.filename.clone(), file.clone());
        Ok(file)
    }

    async fn find_by_filename(&self, filename: &str) -> AppResult<Option<MediaFile>> {
        Ok(self.files.read().await.get(filename).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<MediaFile>> {
        let mut items: Vec<MediaFile> = self.files.read().await.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn delete_by_filename(&self, filename: &str) -> AppResult<bool> {
        Ok(self.files.write().await.remove(filename).is_some())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.files.read().await.len() as u64)
    }
}
