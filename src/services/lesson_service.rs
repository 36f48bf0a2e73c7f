use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{lesson::DEFAULT_LESSON_TITLE, Lesson, LessonContent},
        dto::{
            request::{CreateLessonRequest, UpdateLessonRequest},
            response::LessonDto,
        },
    },
    repositories::{DraftRepository, LessonRepository, QuizRepository, QuizResultRepository},
};

pub struct LessonService {
    lessons: Arc<dyn LessonRepository>,
    quizzes: Arc<dyn QuizRepository>,
    results: Arc<dyn QuizResultRepository>,
    drafts: Arc<dyn DraftRepository>,
}

impl LessonService {
    pub fn new(
        lessons: Arc<dyn LessonRepository>,
        quizzes: Arc<dyn QuizRepository>,
        results: Arc<dyn QuizResultRepository>,
        drafts: Arc<dyn DraftRepository>,
    ) -> Self {
        Self {
            lessons,
            quizzes,
            results,
            drafts,
        }
    }

    pub async fn create_lesson(&self, request: CreateLessonRequest) -> AppResult<LessonDto> {
        request.validate()?;

        let title = request
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LESSON_TITLE.to_string());

        let mut content = LessonContent::default();
        if let Some(input) = request.content {
            input.apply_to(&mut content);
        }

        let mut lesson = Lesson::new(&title, content);
        lesson.order = request.order.unwrap_or_default();
        lesson.is_published = request.is_published.unwrap_or_default();

        let lesson = self.lessons.create(lesson).await?;
        log::info!("Created lesson {}", lesson.id);
        Ok(LessonDto::new(lesson, None))
    }

    pub async fn get_lesson(&self, id: &str) -> AppResult<LessonDto> {
        let lesson = self.find_lesson(id).await?;
        let quiz_id = self.quizzes.find_by_lesson(id).await?.map(|q| q.id);
        Ok(LessonDto::new(lesson, quiz_id))
    }

    /// Ordered by `order` ascending, newest first within the same order.
    pub async fn list_lessons(&self) -> AppResult<Vec<LessonDto>> {
        let mut lessons = self.lessons.find_all().await?;
        lessons.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let quiz_ids: HashMap<String, String> = self
            .quizzes
            .find_all()
            .await?
            .into_iter()
            .map(|quiz| (quiz.lesson_id, quiz.id))
            .collect();

        Ok(lessons
            .into_iter()
            .map(|lesson| {
                let quiz_id = quiz_ids.get(&lesson.id).cloned();
                LessonDto::new(lesson, quiz_id)
            })
            .collect())
    }

    /// Patches only the supplied fields; `updatedAt` always moves forward.
    pub async fn update_lesson(
        &self,
        id: &str,
        request: UpdateLessonRequest,
    ) -> AppResult<LessonDto> {
        request.validate()?;
        if request.is_empty() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let mut lesson = self.find_lesson(id).await?;
        if let Some(title) = request.title {
            lesson.title = title;
        }
        if let Some(input) = request.content {
            input.apply_to(&mut lesson.content);
        }
        if let Some(order) = request.order {
            lesson.order = order;
        }
        if let Some(is_published) = request.is_published {
            lesson.is_published = is_published;
        }
        lesson.updated_at = Utc::now();

        let lesson = self.lessons.update(lesson).await?;
        let quiz_id = self.quizzes.find_by_lesson(id).await?.map(|q| q.id);
        Ok(LessonDto::new(lesson, quiz_id))
    }

    /// Removes the lesson together with its quiz, that quiz's results, the
    /// quiz draft and the content autosave. The steps are not atomic.
    pub async fn delete_lesson(&self, id: &str) -> AppResult<()> {
        self.find_lesson(id).await?;

        if let Some(quiz) = self.quizzes.find_by_lesson(id).await? {
            let removed = self.results.delete_by_quiz(&quiz.id).await?;
            self.quizzes.delete(&quiz.id).await?;
            log::info!(
                "Deleted quiz {} and {} result(s) with lesson {}",
                quiz.id,
                removed,
                id
            );
        }

        if !self.lessons.delete(id).await? {
            return Err(lesson_not_found(id));
        }
        log::info!("Deleted lesson {}", id);

        if let Err(err) = self.drafts.delete_quiz_draft(id).await {
            log::warn!("Deleted lesson {} but not its quiz draft: {}", id, err);
        }
        if let Err(err) = self.drafts.delete_autosave(id).await {
            log::warn!("Deleted lesson {} but not its autosave: {}", id, err);
        }
        Ok(())
    }

    async fn find_lesson(&self, id: &str) -> AppResult<Lesson> {
        self.lessons
            .find_by_id(id)
            .await?
            .ok_or_else(|| lesson_not_found(id))
    }
}

fn lesson_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Lesson with id '{}' not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::Quiz,
        repositories::{
            draft_repository::MockDraftRepository, lesson_repository::MockLessonRepository,
            quiz_repository::MockQuizRepository, quiz_result_repository::MockQuizResultRepository,
            InMemoryDraftRepository,
        },
    };
    use chrono::Duration;

    fn service(
        lessons: MockLessonRepository,
        quizzes: MockQuizRepository,
        results: MockQuizResultRepository,
    ) -> LessonService {
        service_with_drafts(lessons, quizzes, results, InMemoryDraftRepository::new())
    }

    fn service_with_drafts(
        lessons: MockLessonRepository,
        quizzes: MockQuizRepository,
        results: MockQuizResultRepository,
        drafts: impl DraftRepository + 'static,
    ) -> LessonService {
        LessonService::new(
            Arc::new(lessons),
            Arc::new(quizzes),
            Arc::new(results),
            Arc::new(drafts),
        )
    }

    #[tokio::test]
    async fn create_applies_placeholder_defaults() {
        let mut lessons = MockLessonRepository::new();
        lessons.expect_create().returning(|lesson| Ok(lesson));

        let dto = service(lessons, MockQuizRepository::new(), MockQuizResultRepository::new())
            .create_lesson(CreateLessonRequest::default())
            .await
            .unwrap();

        assert_eq!(dto.title, "New lesson");
        assert_eq!(dto.content.html, "<p>New lesson</p>");
        assert_eq!(dto.content.text, "New lesson");
        assert!(!dto.has_quiz);
    }

    #[tokio::test]
    async fn delete_cascades_to_quiz_and_results() {
        let lesson = Lesson::new("L1", LessonContent::default());
        let lesson_id = lesson.id.clone();
        let quiz = Quiz::new(&lesson_id, "Q", vec![]);
        let quiz_id = quiz.id.clone();

        let mut lessons = MockLessonRepository::new();
        lessons
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lesson.clone())));
        lessons.expect_delete().times(1).returning(|_| Ok(true));

        let mut quizzes = MockQuizRepository::new();
        let expected_lesson = lesson_id.clone();
        quizzes
            .expect_find_by_lesson()
            .withf(move |id| id == expected_lesson)
            .returning(move |_| Ok(Some(quiz.clone())));
        let expected_quiz = quiz_id.clone();
        quizzes
            .expect_delete()
            .withf(move |id| id == expected_quiz)
            .times(1)
            .returning(|_| Ok(true));

        let mut results = MockQuizResultRepository::new();
        let expected_quiz = quiz_id.clone();
        results
            .expect_delete_by_quiz()
            .withf(move |id| id == expected_quiz)
            .times(1)
            .returning(|_| Ok(3));

        let mut drafts = MockDraftRepository::new();
        let expected_lesson = lesson_id.clone();
        drafts
            .expect_delete_quiz_draft()
            .withf(move |id| id == expected_lesson)
            .times(1)
            .returning(|_| Ok(true));
        let expected_lesson = lesson_id.clone();
        drafts
            .expect_delete_autosave()
            .withf(move |id| id == expected_lesson)
            .times(1)
            .returning(|_| Ok(false));

        service_with_drafts(lessons, quizzes, results, drafts)
            .delete_lesson(&lesson_id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_survives_draft_cleanup_failure() {
        let lesson = Lesson::new("L1", LessonContent::default());
        let lesson_id = lesson.id.clone();

        let mut lessons = MockLessonRepository::new();
        lessons
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lesson.clone())));
        lessons.expect_delete().times(1).returning(|_| Ok(true));

        let mut quizzes = MockQuizRepository::new();
        quizzes.expect_find_by_lesson().returning(|_| Ok(None));

        let mut drafts = MockDraftRepository::new();
        drafts
            .expect_delete_quiz_draft()
            .returning(|_| Err(AppError::StorageError("disk full".to_string())));
        drafts.expect_delete_autosave().times(1).returning(|_| Ok(true));

        let result = service_with_drafts(lessons, quizzes, MockQuizResultRepository::new(), drafts)
            .delete_lesson(&lesson_id)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn delete_missing_lesson_is_not_found() {
        let mut lessons = MockLessonRepository::new();
        lessons.expect_find_by_id().returning(|_| Ok(None));
        lessons.expect_delete().never();

        let result = service(lessons, MockQuizRepository::new(), MockQuizResultRepository::new())
            .delete_lesson("missing")
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_orders_by_order_then_newest() {
        let mut first = Lesson::new("first", LessonContent::default());
        first.order = 0;
        first.created_at = Utc::now() - Duration::hours(2);
        let mut newer = Lesson::new("newer", LessonContent::default());
        newer.order = 0;
        newer.created_at = Utc::now();
        let mut later = Lesson::new("later", LessonContent::default());
        later.order = 1;
        let quiz = Quiz::new(&later.id, "Q", vec![]);

        let all = vec![later.clone(), first.clone(), newer.clone()];
        let mut lessons = MockLessonRepository::new();
        lessons.expect_find_all().returning(move || Ok(all.clone()));
        let mut quizzes = MockQuizRepository::new();
        quizzes
            .expect_find_all()
            .returning(move || Ok(vec![quiz.clone()]));

        let listed = service(lessons, quizzes, MockQuizResultRepository::new())
            .list_lessons()
            .await
            .unwrap();

        let titles: Vec<&str> = listed.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["newer", "first", "later"]);
        assert!(listed[2].has_quiz);
        assert!(!listed[0].has_quiz);
    }

    #[tokio::test]
    async fn update_with_no_fields_is_rejected() {
        let result = service(
            MockLessonRepository::new(),
            MockQuizRepository::new(),
            MockQuizResultRepository::new(),
        )
        .update_lesson("any", UpdateLessonRequest::default())
        .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn update_patches_fields_and_refreshes_timestamp() {
        let mut lesson = Lesson::new("Old", LessonContent::default());
        lesson.updated_at = Utc::now() - Duration::days(1);
        let before = lesson.updated_at;
        let id = lesson.id.clone();

        let mut lessons = MockLessonRepository::new();
        lessons
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lesson.clone())));
        lessons.expect_update().returning(|lesson| Ok(lesson));
        let mut quizzes = MockQuizRepository::new();
        quizzes.expect_find_by_lesson().returning(|_| Ok(None));

        let dto = service(lessons, quizzes, MockQuizResultRepository::new())
            .update_lesson(
                &id,
                UpdateLessonRequest {
                    title: Some("New".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(dto.title, "New");
        assert_eq!(dto.content.text, "New lesson");
        assert!(dto.updated_at > before);
    }
}
