use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{LessonContent, MediaRef, Question, SubmittedAnswer};

pub const DEFAULT_STUDENT_NAME: &str = "Anonymous";

/// Lesson content as sent by the editor; every field is optional so updates can patch.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LessonContentInput {
    pub html: Option<String>,
    pub text: Option<String>,
    pub media: Option<Vec<MediaRef>>,
}

impl LessonContentInput {
    /// Overlay the supplied fields onto `content`.
    pub fn apply_to(self, content: &mut LessonContent) {
        if let Some(html) = self.html {
            content.html = html;
        }
        if let Some(text) = self.text {
            content.text = text;
        }
        if let Some(media) = self.media {
            content.media = media;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLessonRequest {
    #[validate(length(max = 200))]
    pub title: Option<String>,
    pub content: Option<LessonContentInput>,
    pub order: Option<i32>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLessonRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub content: Option<LessonContentInput>,
    pub order: Option<i32>,
    pub is_published: Option<bool>,
}

impl UpdateLessonRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.order.is_none()
            && self.is_published.is_none()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    #[validate(length(min = 1))]
    pub lesson_id: String,

    #[validate(length(min = 1, max = 200))]
    pub title: String,

    pub description: Option<String>,

    #[serde(default)]
    pub questions: Vec<Question>,

    #[validate(range(min = 1))]
    pub time_limit: Option<u32>,

    #[validate(range(max = 100))]
    pub passing_score: Option<u32>,

    #[validate(range(min = 1))]
    pub attempts: Option<u32>,

    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub questions: Option<Vec<Question>>,

    #[validate(range(min = 1))]
    pub time_limit: Option<u32>,

    #[validate(range(max = 100))]
    pub passing_score: Option<u32>,

    #[validate(range(min = 1))]
    pub attempts: Option<u32>,

    pub is_published: Option<bool>,
}

impl UpdateQuizRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.questions.is_none()
            && self.time_limit.is_none()
            && self.passing_score.is_none()
            && self.attempts.is_none()
            && self.is_published.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    #[validate(length(max = 100))]
    pub student_name: Option<String>,
    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
}

impl SubmitQuizRequest {
    pub fn student_name(&self) -> &str {
        self.student_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_STUDENT_NAME)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AutosaveRequest {
    pub content: LessonContentInput,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveDraftRequest {
    pub description: Option<String>,

    #[validate(range(max = 100))]
    pub passing_score: Option<u32>,

    #[validate(range(min = 1))]
    pub time_limit: Option<u32>,
}
