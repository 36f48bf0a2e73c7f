use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_LESSON_TITLE: &str = "New lesson";

/// A media reference embedded in lesson content.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MediaRef {
    pub url: String,
    #[serde(rename = "type", default)]
    pub media_type: String,
    #[serde(default)]
    pub name: String,
}

/// Opaque payload produced by the rich-text editor.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LessonContent {
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub media: Vec<MediaRef>,
}

impl Default for LessonContent {
    fn default() -> Self {
        LessonContent {
            html: format!("<p>{}</p>", DEFAULT_LESSON_TITLE),
            text: DEFAULT_LESSON_TITLE.to_string(),
            media: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub content: LessonContent,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lesson {
    pub fn new(title: &str, content: LessonContent) -> Self {
        let now = Utc::now();
        Lesson {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            content,
            order: 0,
            is_published: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Unsaved editor content kept per lesson by the autosave endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonAutosave {
    pub lesson_id: String,
    pub content: LessonContent,
    pub saved_at: DateTime<Utc>,
}
