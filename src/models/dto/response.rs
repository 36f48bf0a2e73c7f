use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::{
    GradeReport, Lesson, LessonContent, MediaFile, Question, QuestionResult, Quiz, QuizResult,
};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDto {
    pub id: String,
    pub title: String,
    pub content: LessonContent,
    pub order: i32,
    pub is_published: bool,
    pub has_quiz: bool,
    pub quiz_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LessonDto {
    pub fn new(lesson: Lesson, quiz_id: Option<String>) -> Self {
        LessonDto {
            id: lesson.id,
            title: lesson.title,
            content: lesson.content,
            order: lesson.order,
            is_published: lesson.is_published,
            has_quiz: quiz_id.is_some(),
            quiz_id,
            created_at: lesson.created_at,
            updated_at: lesson.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDto {
    pub id: String,
    pub lesson_id: String,
    pub lesson_title: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub questions: Vec<Question>,
    pub time_limit: Option<u32>,
    pub passing_score: u32,
    pub attempts: u32,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuizDto {
    pub fn new(quiz: Quiz, lesson_title: Option<String>) -> Self {
        QuizDto {
            id: quiz.id,
            lesson_id: quiz.lesson_id,
            lesson_title,
            title: quiz.title,
            description: quiz.description,
            questions: quiz.questions,
            time_limit: quiz.time_limit,
            passing_score: quiz.passing_score,
            attempts: quiz.attempts,
            is_published: quiz.is_published,
            created_at: quiz.created_at,
            updated_at: quiz.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizResponse {
    pub student_name: String,
    pub score: u32,
    pub max_score: u32,
    pub percentage: u32,
    pub passed: bool,
    pub results: Vec<QuestionResult>,
    pub quiz_title: String,
    pub passing_score: u32,
    pub submitted_at: DateTime<Utc>,
    pub result_id: Option<String>, // None when archiving failed
}

impl SubmitQuizResponse {
    pub fn new(
        quiz: &Quiz,
        student_name: &str,
        report: GradeReport,
        archived: Option<&QuizResult>,
    ) -> Self {
        SubmitQuizResponse {
            student_name: student_name.to_string(),
            score: report.score,
            max_score: report.max_score,
            percentage: report.percentage,
            passed: report.passed,
            results: report.results,
            quiz_title: quiz.title.clone(),
            passing_score: quiz.passing_score,
            submitted_at: archived.map(|r| r.submitted_at).unwrap_or_else(Utc::now),
            result_id: archived.map(|r| r.id.clone()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: String,
}

impl From<MediaFile> for UploadResponse {
    fn from(file: MediaFile) -> Self {
        UploadResponse {
            message: "File uploaded".to_string(),
            filename: file.filename,
            original_name: file.original_name,
            mime_type: file.mime_type,
            size: file.size,
            url: file.url,
            media_type: file.media_type,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
    pub lessons: u64,
    pub quizzes: u64,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub lessons: u64,
    pub quizzes: u64,
    pub media_files: u64,
    pub quiz_results: u64,
    pub average_score: Option<f64>, // mean percentage over archived results
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub errors: Vec<String>,
}
