use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Quiz, QuizResult},
        dto::{
            request::{CreateQuizRequest, SubmitQuizRequest, UpdateQuizRequest},
            response::{QuizDto, SubmitQuizResponse},
        },
    },
    repositories::{LessonRepository, QuizRepository, QuizResultRepository},
    services::grading_service::GradingService,
};

pub struct QuizService {
    quizzes: Arc<dyn QuizRepository>,
    lessons: Arc<dyn LessonRepository>,
    results: Arc<dyn QuizResultRepository>,
    default_passing_score: u32,
}

impl QuizService {
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        lessons: Arc<dyn LessonRepository>,
        results: Arc<dyn QuizResultRepository>,
        default_passing_score: u32,
    ) -> Self {
        Self {
            quizzes,
            lessons,
            results,
            default_passing_score,
        }
    }

    pub async fn create_quiz(&self, request: CreateQuizRequest) -> AppResult<QuizDto> {
        request.validate()?;

        let lesson = self
            .lessons
            .find_by_id(&request.lesson_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Lesson with id '{}' not found", request.lesson_id))
            })?;

        if self.quizzes.find_by_lesson(&lesson.id).await?.is_some() {
            return Err(AppError::ValidationError(format!(
                "Lesson '{}' already has a quiz",
                lesson.id
            )));
        }

        let mut quiz = Quiz::new(&lesson.id, &request.title, request.questions);
        quiz.description = request.description;
        quiz.time_limit = request.time_limit;
        quiz.passing_score = request.passing_score.unwrap_or(self.default_passing_score);
        quiz.attempts = request.attempts.unwrap_or(quiz.attempts);
        quiz.is_published = request.is_published.unwrap_or_default();
        check_questions(&quiz)?;

        let quiz = self.quizzes.create(quiz).await?;
        log::info!("Created quiz {} for lesson {}", quiz.id, lesson.id);
        Ok(QuizDto::new(quiz, Some(lesson.title)))
    }

    pub async fn get_quiz(&self, id: &str) -> AppResult<QuizDto> {
        let quiz = self.find_quiz(id).await?;
        self.with_lesson_title(quiz).await
    }

    pub async fn get_quiz_by_lesson(&self, lesson_id: &str) -> AppResult<QuizDto> {
        let quiz = self
            .quizzes
            .find_by_lesson(lesson_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No quiz found for lesson '{}'", lesson_id))
            })?;
        self.with_lesson_title(quiz).await
    }

    /// Newest first.
    pub async fn list_quizzes(&self) -> AppResult<Vec<QuizDto>> {
        let mut quizzes = self.quizzes.find_all().await?;
        quizzes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let titles: HashMap<String, String> = self
            .lessons
            .find_all()
            .await?
            .into_iter()
            .map(|lesson| (lesson.id, lesson.title))
            .collect();

        Ok(quizzes
            .into_iter()
            .map(|quiz| {
                let title = titles.get(&quiz.lesson_id).cloned();
                QuizDto::new(quiz, title)
            })
            .collect())
    }

    pub async fn update_quiz(&self, id: &str, request: UpdateQuizRequest) -> AppResult<QuizDto> {
        request.validate()?;
        if request.is_empty() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let mut quiz = self.find_quiz(id).await?;
        if let Some(title) = request.title {
            quiz.title = title;
        }
        if let Some(description) = request.description {
            quiz.description = Some(description);
        }
        if let Some(questions) = request.questions {
            quiz.questions = questions;
            quiz.normalize_questions();
            check_questions(&quiz)?;
        }
        if let Some(time_limit) = request.time_limit {
            quiz.time_limit = Some(time_limit);
        }
        if let Some(passing_score) = request.passing_score {
            quiz.passing_score = passing_score;
        }
        if let Some(attempts) = request.attempts {
            quiz.attempts = attempts;
        }
        if let Some(is_published) = request.is_published {
            quiz.is_published = is_published;
        }
        quiz.updated_at = Utc::now();

        let quiz = self.quizzes.update(quiz).await?;
        self.with_lesson_title(quiz).await
    }

    /// Removes the quiz and its archived results. The steps are not atomic.
    pub async fn delete_quiz(&self, id: &str) -> AppResult<()> {
        self.find_quiz(id).await?;

        let removed = self.results.delete_by_quiz(id).await?;
        if !self.quizzes.delete(id).await? {
            return Err(quiz_not_found(id));
        }
        log::info!("Deleted quiz {} and {} result(s)", id, removed);
        Ok(())
    }

    /// Grades a submission and archives it. A failed archive is logged and
    /// the graded response is still returned.
    pub async fn submit_quiz(
        &self,
        id: &str,
        request: SubmitQuizRequest,
    ) -> AppResult<SubmitQuizResponse> {
        request.validate()?;
        let quiz = self.find_quiz(id).await?;
        let student_name = request.student_name().to_string();

        let report = GradingService::grade_quiz(&quiz, &request.answers);
        let result = QuizResult::from_report(&quiz.id, &student_name, request.answers, &report);

        let archived = match self.results.create(result).await {
            Ok(saved) => Some(saved),
            Err(err) => {
                log::error!("Failed to archive result for quiz {}: {}", quiz.id, err);
                None
            }
        };

        log::info!(
            "Quiz {} submitted by {}: {}/{} ({}%)",
            quiz.id,
            student_name,
            report.score,
            report.max_score,
            report.percentage
        );
        Ok(SubmitQuizResponse::new(
            &quiz,
            &student_name,
            report,
            archived.as_ref(),
        ))
    }

    pub async fn list_results(&self, id: &str) -> AppResult<Vec<QuizResult>> {
        self.find_quiz(id).await?;
        self.results.find_by_quiz(id).await
    }

    async fn find_quiz(&self, id: &str) -> AppResult<Quiz> {
        self.quizzes
            .find_by_id(id)
            .await?
            .ok_or_else(|| quiz_not_found(id))
    }

    async fn with_lesson_title(&self, quiz: Quiz) -> AppResult<QuizDto> {
        let title = self
            .lessons
            .find_by_id(&quiz.lesson_id)
            .await?
            .map(|lesson| lesson.title);
        Ok(QuizDto::new(quiz, title))
    }
}

fn quiz_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Quiz with id '{}' not found", id))
}

fn check_questions(quiz: &Quiz) -> AppResult<()> {
    let problems = quiz.invariant_violations();
    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::InvalidQuiz(problems))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::{Answer, Lesson, LessonContent, Question, QuestionType, SubmittedAnswer},
        repositories::{
            lesson_repository::MockLessonRepository, quiz_repository::MockQuizRepository,
            quiz_result_repository::MockQuizResultRepository,
        },
    };

    fn question() -> Question {
        let mut question = Question::new(QuestionType::Single, 1);
        question.text = "Pick A".to_string();
        question.answers = vec![
            Answer {
                id: "a".to_string(),
                text: "A".to_string(),
                is_correct: true,
            },
            Answer {
                id: "b".to_string(),
                text: "B".to_string(),
                is_correct: false,
            },
        ];
        question
    }

    fn create_request(lesson_id: &str, questions: Vec<Question>) -> CreateQuizRequest {
        CreateQuizRequest {
            lesson_id: lesson_id.to_string(),
            title: "Quiz".to_string(),
            description: None,
            questions,
            time_limit: None,
            passing_score: None,
            attempts: None,
            is_published: None,
        }
    }

    fn service(
        quizzes: MockQuizRepository,
        lessons: MockLessonRepository,
        results: MockQuizResultRepository,
    ) -> QuizService {
        QuizService::new(Arc::new(quizzes), Arc::new(lessons), Arc::new(results), 70)
    }

    fn lessons_with(lesson: Lesson) -> MockLessonRepository {
        let mut lessons = MockLessonRepository::new();
        lessons
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lesson.clone())));
        lessons
    }

    #[tokio::test]
    async fn create_requires_existing_lesson() {
        let mut lessons = MockLessonRepository::new();
        lessons.expect_find_by_id().returning(|_| Ok(None));

        let result = service(MockQuizRepository::new(), lessons, MockQuizResultRepository::new())
            .create_quiz(create_request("missing", vec![question()]))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn create_rejects_second_quiz_for_lesson() {
        let lesson = Lesson::new("L1", LessonContent::default());
        let existing = Quiz::new(&lesson.id, "Existing", vec![]);

        let mut quizzes = MockQuizRepository::new();
        quizzes
            .expect_find_by_lesson()
            .returning(move |_| Ok(Some(existing.clone())));
        quizzes.expect_create().never();

        let result = service(quizzes, lessons_with(lesson.clone()), MockQuizResultRepository::new())
            .create_quiz(create_request(&lesson.id, vec![question()]))
            .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn create_rejects_broken_questions() {
        let lesson = Lesson::new("L1", LessonContent::default());
        let mut broken = question();
        broken.answers.iter_mut().for_each(|a| a.is_correct = true);

        let mut quizzes = MockQuizRepository::new();
        quizzes.expect_find_by_lesson().returning(|_| Ok(None));
        quizzes.expect_create().never();

        let result = service(quizzes, lessons_with(lesson.clone()), MockQuizResultRepository::new())
            .create_quiz(create_request(&lesson.id, vec![broken]))
            .await;

        assert!(matches!(result, Err(AppError::InvalidQuiz(problems)) if problems.len() == 1));
    }

    #[tokio::test]
    async fn create_rejects_points_above_the_cap() {
        let lesson = Lesson::new("L1", LessonContent::default());
        let heavy: Vec<Question> = (0..3)
            .map(|_| {
                let mut q = question();
                q.points = i32::MAX;
                q
            })
            .collect();

        let mut quizzes = MockQuizRepository::new();
        quizzes.expect_find_by_lesson().returning(|_| Ok(None));
        quizzes.expect_create().never();

        let result = service(quizzes, lessons_with(lesson.clone()), MockQuizResultRepository::new())
            .create_quiz(create_request(&lesson.id, heavy))
            .await;

        assert!(matches!(result, Err(AppError::InvalidQuiz(problems)) if problems.len() == 3));
    }

    #[tokio::test]
    async fn create_uses_default_passing_score_and_lesson_title() {
        let lesson = Lesson::new("L1", LessonContent::default());

        let mut quizzes = MockQuizRepository::new();
        quizzes.expect_find_by_lesson().returning(|_| Ok(None));
        quizzes.expect_create().returning(|quiz| Ok(quiz));

        let dto = service(quizzes, lessons_with(lesson.clone()), MockQuizResultRepository::new())
            .create_quiz(create_request(&lesson.id, vec![question()]))
            .await
            .unwrap();

        assert_eq!(dto.passing_score, 70);
        assert_eq!(dto.lesson_title.as_deref(), Some("L1"));
        assert_eq!(dto.questions[0].number, 1);
    }

    #[tokio::test]
    async fn delete_cascades_to_results() {
        let quiz = Quiz::new("lesson-1", "Q", vec![question()]);
        let id = quiz.id.clone();

        let mut quizzes = MockQuizRepository::new();
        quizzes
            .expect_find_by_id()
            .returning(move |_| Ok(Some(quiz.clone())));
        quizzes.expect_delete().times(1).returning(|_| Ok(true));
        let mut results = MockQuizResultRepository::new();
        let expected = id.clone();
        results
            .expect_delete_by_quiz()
            .withf(move |quiz_id| quiz_id == expected)
            .times(1)
            .returning(|_| Ok(2));

        service(quizzes, MockLessonRepository::new(), results)
            .delete_quiz(&id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn submit_survives_archive_failure() {
        let quiz = Quiz::new("lesson-1", "Q", vec![question()]);
        let id = quiz.id.clone();

        let mut quizzes = MockQuizRepository::new();
        quizzes
            .expect_find_by_id()
            .returning(move |_| Ok(Some(quiz.clone())));
        let mut results = MockQuizResultRepository::new();
        results
            .expect_create()
            .returning(|_| Err(AppError::StorageError("disk full".to_string())));

        let response = service(quizzes, MockLessonRepository::new(), results)
            .submit_quiz(
                &id,
                SubmitQuizRequest {
                    student_name: None,
                    answers: vec![SubmittedAnswer::single(0, "a")],
                },
            )
            .await
            .unwrap();

        assert_eq!(response.score, 1);
        assert_eq!(response.percentage, 100);
        assert!(response.passed);
        assert_eq!(response.student_name, "Anonymous");
        assert!(response.result_id.is_none());
    }

    #[tokio::test]
    async fn submit_unknown_quiz_is_not_found() {
        let mut quizzes = MockQuizRepository::new();
        quizzes.expect_find_by_id().returning(|_| Ok(None));

        let result = service(quizzes, MockLessonRepository::new(), MockQuizResultRepository::new())
            .submit_quiz("missing", SubmitQuizRequest::default())
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_replaces_questions_and_renumbers() {
        let quiz = Quiz::new("lesson-1", "Q", vec![question()]);
        let id = quiz.id.clone();

        let mut quizzes = MockQuizRepository::new();
        quizzes
            .expect_find_by_id()
            .returning(move |_| Ok(Some(quiz.clone())));
        quizzes.expect_update().returning(|quiz| Ok(quiz));
        let mut lessons = MockLessonRepository::new();
        lessons.expect_find_by_id().returning(|_| Ok(None));

        let mut second = question();
        second.id = String::new();
        let dto = service(quizzes, lessons, MockQuizResultRepository::new())
            .update_quiz(
                &id,
                UpdateQuizRequest {
                    questions: Some(vec![question(), second]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(dto.questions.len(), 2);
        assert_eq!(dto.questions[1].number, 2);
        assert!(!dto.questions[1].id.is_empty());
        assert!(dto.lesson_title.is_none());
    }
}
