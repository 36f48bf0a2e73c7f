use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    authoring::{validate_quiz, EditCommand, QuizDraft},
    errors::{AppError, AppResult},
    models::{
        domain::{Lesson, LessonAutosave},
        dto::{
            request::{CreateQuizRequest, LessonContentInput, SaveDraftRequest, UpdateQuizRequest},
            response::QuizDto,
        },
    },
    repositories::{DraftRepository, LessonRepository, QuizRepository},
    services::quiz_service::QuizService,
};

/// Server-side autosave for lesson content and quiz drafts.
pub struct DraftService {
    drafts: Arc<dyn DraftRepository>,
    lessons: Arc<dyn LessonRepository>,
    quizzes: Arc<dyn QuizRepository>,
    quiz_service: Arc<QuizService>,
}

impl DraftService {
    pub fn new(
        drafts: Arc<dyn DraftRepository>,
        lessons: Arc<dyn LessonRepository>,
        quizzes: Arc<dyn QuizRepository>,
        quiz_service: Arc<QuizService>,
    ) -> Self {
        Self {
            drafts,
            lessons,
            quizzes,
            quiz_service,
        }
    }

    pub async fn get_autosave(&self, lesson_id: &str) -> AppResult<LessonAutosave> {
        self.find_lesson(lesson_id).await?;
        self.drafts
            .load_autosave(lesson_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No autosave for lesson '{}'", lesson_id))
            })
    }

    /// Patches the last autosave (or the stored lesson content) and overwrites it.
    pub async fn autosave(
        &self,
        lesson_id: &str,
        input: LessonContentInput,
    ) -> AppResult<LessonAutosave> {
        let lesson = self.find_lesson(lesson_id).await?;

        let mut content = match self.drafts.load_autosave(lesson_id).await? {
            Some(previous) => previous.content,
            None => lesson.content,
        };
        input.apply_to(&mut content);

        self.drafts
            .save_autosave(LessonAutosave {
                lesson_id: lesson_id.to_string(),
                content,
                saved_at: Utc::now(),
            })
            .await
    }

    pub async fn clear_autosave(&self, lesson_id: &str) -> AppResult<bool> {
        self.drafts.delete_autosave(lesson_id).await
    }

    /// The stored draft, else one seeded from the saved quiz, else an empty one.
    /// Drafts of a lesson that no longer exists are not served.
    pub async fn get_draft(&self, lesson_id: &str) -> AppResult<QuizDraft> {
        let lesson = self.find_lesson(lesson_id).await?;

        if let Some(draft) = self.drafts.load_quiz_draft(lesson_id).await? {
            return Ok(draft);
        }

        Ok(match self.quizzes.find_by_lesson(&lesson.id).await? {
            Some(quiz) => QuizDraft::from_questions(&lesson.id, &quiz.title, quiz.questions),
            None => QuizDraft::new(&lesson.id),
        })
    }

    /// Applies one edit and mirrors the result to the draft store.
    pub async fn apply_command(
        &self,
        lesson_id: &str,
        command: EditCommand,
    ) -> AppResult<QuizDraft> {
        let mut draft = self.get_draft(lesson_id).await?;
        draft.apply(command)?;
        draft.saved_at = Utc::now();
        self.drafts.save_quiz_draft(draft).await
    }

    pub async fn validate_draft(&self, lesson_id: &str) -> AppResult<Vec<String>> {
        let draft = self.get_draft(lesson_id).await?;
        Ok(validate_quiz(&draft))
    }

    /// Saves the draft as the lesson's quiz, creating or replacing it, then
    /// clears the stored draft.
    pub async fn save_draft(
        &self,
        lesson_id: &str,
        request: SaveDraftRequest,
    ) -> AppResult<QuizDto> {
        request.validate()?;
        let draft = self.get_draft(lesson_id).await?;

        let problems = validate_quiz(&draft);
        if !problems.is_empty() {
            return Err(AppError::InvalidQuiz(problems));
        }

        let questions = draft.questions_for_save();
        let saved = match self.quizzes.find_by_lesson(lesson_id).await? {
            Some(existing) => {
                self.quiz_service
                    .update_quiz(
                        &existing.id,
                        UpdateQuizRequest {
                            title: Some(draft.title.clone()),
                            description: request.description,
                            questions: Some(questions),
                            time_limit: request.time_limit,
                            passing_score: request.passing_score,
                            ..Default::default()
                        },
                    )
                    .await?
            }
            None => {
                self.quiz_service
                    .create_quiz(CreateQuizRequest {
                        lesson_id: lesson_id.to_string(),
                        title: draft.title.clone(),
                        description: request.description,
                        questions,
                        time_limit: request.time_limit,
                        passing_score: request.passing_score,
                        attempts: None,
                        is_published: None,
                    })
                    .await?
            }
        };

        if let Err(err) = self.drafts.delete_quiz_draft(lesson_id).await {
            log::warn!("Saved quiz {} but could not clear its draft: {}", saved.id, err);
        }
        Ok(saved)
    }

    pub async fn discard_draft(&self, lesson_id: &str) -> AppResult<bool> {
        self.drafts.delete_quiz_draft(lesson_id).await
    }

    async fn find_lesson(&self, lesson_id: &str) -> AppResult<Lesson> {
        self.lessons
            .find_by_id(lesson_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lesson with id '{}' not found", lesson_id)))
    }
}
