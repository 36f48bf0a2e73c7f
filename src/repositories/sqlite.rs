use async_trait::async_trait;
use rusqlite::{params, types::Type, ErrorCode, OptionalExtension, Row};
use serde::de::DeserializeOwned;

use crate::{
    db::SqliteDb,
    errors::{AppError, AppResult},
    models::domain::{Lesson, LessonContent, MediaFile, Quiz, QuizResult},
    repositories::{
        quiz_repository::duplicate_quiz_error, LessonRepository, MediaRepository,
        QuizRepository, QuizResultRepository,
    },
};

const LESSON_COLUMNS: &str = "id, title, content_html, content_text, content_media, sort_order, \
     is_published, created_at, updated_at";

const QUIZ_COLUMNS: &str = "id, lesson_id, title, description, questions, time_limit, \
     passing_score, attempts, is_published, created_at, updated_at";

const MEDIA_COLUMNS: &str =
    "id, filename, original_name, mime_type, size, url, media_type, created_at";

const RESULT_COLUMNS: &str = "id, quiz_id, student_name, score, max_score, percentage, passed, \
     answers, results, submitted_at";

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn lesson_from_row(row: &Row<'_>) -> rusqlite::Result<Lesson> {
    Ok(Lesson {
        id: row.get(0)?,
        title: row.get(1)?,
        content: LessonContent {
            html: row.get(2)?,
            text: row.get(3)?,
            media: json_column(row, 4)?,
        },
        order: row.get(5)?,
        is_published: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn quiz_from_row(row: &Row<'_>) -> rusqlite::Result<Quiz> {
    Ok(Quiz {
        id: row.get(0)?,
        lesson_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        questions: json_column(row, 4)?,
        time_limit: row.get(5)?,
        passing_score: row.get(6)?,
        attempts: row.get(7)?,
        is_published: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn media_from_row(row: &Row<'_>) -> rusqlite::Result<MediaFile> {
    let size: i64 = row.get(4)?;
    Ok(MediaFile {
        id: row.get(0)?,
        filename: row.get(1)?,
        original_name: row.get(2)?,
        mime_type: row.get(3)?,
        size: size.max(0) as u64,
        url: row.get(5)?,
        media_type: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn result_from_row(row: &Row<'_>) -> rusqlite::Result<QuizResult> {
    Ok(QuizResult {
        id: row.get(0)?,
        quiz_id: row.get(1)?,
        student_name: row.get(2)?,
        score: row.get(3)?,
        max_score: row.get(4)?,
        percentage: row.get(5)?,
        passed: row.get(6)?,
        answers: json_column(row, 7)?,
        results: json_column(row, 8)?,
        submitted_at: row.get(9)?,
    })
}

const COUNT_LESSONS: &str = "SELECT COUNT(*) FROM lessons";
const COUNT_QUIZZES: &str = "SELECT COUNT(*) FROM quizzes";
const COUNT_QUIZ_RESULTS: &str = "SELECT COUNT(*) FROM quiz_results";
const COUNT_MEDIA_FILES: &str = "SELECT COUNT(*) FROM media_files";

fn count_rows(conn: &rusqlite::Connection, statement: &'static str) -> AppResult<u64> {
    let count: i64 = conn.query_row(statement, [], |row| row.get(0))?;
    Ok(count.max(0) as u64)
}

pub struct SqliteLessonRepository {
    db: SqliteDb,
}

impl SqliteLessonRepository {
    pub fn new(db: SqliteDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LessonRepository for SqliteLessonRepository {
    async fn create(&self, lesson: Lesson) -> AppResult<Lesson> {
        self.db
            .with_conn(move |conn| {
                let media = serde_json::to_string(&lesson.content.media)?;
                conn.execute(
                    &format!(
                        "INSERT INTO lessons ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                        LESSON_COLUMNS
                    ),
                    params![
                        lesson.id,
                        lesson.title,
                        lesson.content.html,
                        lesson.content.text,
                        media,
                        lesson.order,
                        lesson.is_published,
                        lesson.created_at,
                        lesson.updated_at,
                    ],
                )?;
                Ok(lesson)
            })
            .await
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Lesson>> {
        let id = id.to_string();
        self.db
            .with_conn(move |conn| {
                let lesson = conn
                    .query_row(
                        &format!("SELECT {} FROM lessons WHERE id = ?1", LESSON_COLUMNS),
                        params![id],
                        lesson_from_row,
                    )
                    .optional()?;
                Ok(lesson)
            })
            .await
    }

    async fn find_all(&self) -> AppResult<Vec<Lesson>> {
        self.db
            .with_conn(|conn| {
                let mut stmt = conn.prepare(&format!("SELECT {} FROM lessons", LESSON_COLUMNS))?;
                let lessons = stmt
                    .query_map([], lesson_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(lessons)
            })
            .await
    }

    async fn update(&self, lesson: Lesson) -> AppResult<Lesson> {
        self.db
            .with_conn(move |conn| {
                let media = serde_json::to_string(&lesson.content.media)?;
                let changed = conn.execute(
                    "UPDATE lessons SET title = ?2, content_html = ?3, content_text = ?4, \
                     content_media = ?5, sort_order = ?6, is_published = ?7, updated_at = ?8 \
                     WHERE id = ?1",
                    params![
                        lesson.id,
                        lesson.title,
                        lesson.content.html,
                        lesson.content.text,
                        media,
                        lesson.order,
                        lesson.is_published,
                        lesson.updated_at,
                    ],
                )?;
                if changed == 0 {
                    return Err(AppError::NotFound(format!(
                        "Lesson with id '{}' not found",
                        lesson.id
                    )));
                }
                Ok(lesson)
            })
            .await
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let id = id.to_string();
        self.db
            .with_conn(move |conn| {
                let changed = conn.execute("DELETE FROM lessons WHERE id = ?1", params![id])?;
                Ok(changed > 0)
            })
            .await
    }

    async fn count(&self) -> AppResult<u64> {
        self.db.with_conn(|conn| count_rows(conn, COUNT_LESSONS)).await
    }
}

pub struct SqliteQuizRepository {
    db: SqliteDb,
}

impl SqliteQuizRepository {
    pub fn new(db: SqliteDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl QuizRepository for SqliteQuizRepository {
    async fn create(&self, quiz: Quiz) -> AppResult<Quiz> {
        self.db
            .with_conn(move |conn| {
                let questions = serde_json::to_string(&quiz.questions)?;
                let inserted = conn.execute(
                    &format!(
                        "INSERT INTO quizzes ({}) \
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                        QUIZ_COLUMNS
                    ),
                    params![
                        quiz.id,
                        quiz.lesson_id,
                        quiz.title,
                        quiz.description,
                        questions,
                        quiz.time_limit,
                        quiz.passing_score,
                        quiz.attempts,
                        quiz.is_published,
                        quiz.created_at,
                        quiz.updated_at,
                    ],
                );
                match inserted {
                    Ok(_) => Ok(quiz),
                    Err(rusqlite::Error::SqliteFailure(err, _))
                        if err.code == ErrorCode::ConstraintViolation =>
                    {
                        Err(duplicate_quiz_error(&quiz.lesson_id))
                    }
                    Err(err) => Err(err.into()),
                }
            })
            .await
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        let id = id.to_string();
        self.db
            .with_conn(move |conn| {
                let quiz = conn
                    .query_row(
                        &format!("SELECT {} FROM quizzes WHERE id = ?1", QUIZ_COLUMNS),
                        params![id],
                        quiz_from_row,
                    )
                    .optional()?;
                Ok(quiz)
            })
            .await
    }

    async fn find_by_lesson(&self, lesson_id: &str) -> AppResult<Option<Quiz>> {
        let lesson_id = lesson_id.to_string();
        self.db
            .with_conn(move |conn| {
                let quiz = conn
                    .query_row(
                        &format!("SELECT {} FROM quizzes WHERE lesson_id = ?1", QUIZ_COLUMNS),
                        params![lesson_id],
                        quiz_from_row,
                    )
                    .optional()?;
                Ok(quiz)
            })
            .await
    }

    async fn find_all(&self) -> AppResult<Vec<Quiz>> {
        self.db
            .with_conn(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM quizzes ORDER BY created_at DESC",
                    QUIZ_COLUMNS
                ))?;
                let quizzes = stmt
                    .query_map([], quiz_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(quizzes)
            })
            .await
    }

    async fn update(&self, quiz: Quiz) -> AppResult<Quiz> {
        self.db
            .with_conn(move |conn| {
                let questions = serde_json::to_string(&quiz.questions)?;
                let changed = conn.execute(
                    "UPDATE quizzes SET title = ?2, description = ?3, questions = ?4, \
                     time_limit = ?5, passing_score = ?6, attempts = ?7, is_published = ?8, \
                     updated_at = ?9 WHERE id = ?1",
                    params![
                        quiz.id,
                        quiz.title,
                        quiz.description,
                        questions,
                        quiz.time_limit,
                        quiz.passing_score,
                        quiz.attempts,
                        quiz.is_published,
                        quiz.updated_at,
                    ],
                )?;
                if changed == 0 {
                    return Err(AppError::NotFound(format!(
                        "Quiz with id '{}' not found",
                        quiz.id
                    )));
                }
                Ok(quiz)
            })
            .await
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let id = id.to_string();
        self.db
            .with_conn(move |conn| {
                let changed = conn.execute("DELETE FROM quizzes WHERE id = ?1", params![id])?;
                Ok(changed > 0)
            })
            .await
    }

    async fn count(&self) -> AppResult<u64> {
        self.db.with_conn(|conn| count_rows(conn, COUNT_QUIZZES)).await
    }
}

pub struct SqliteQuizResultRepository {
    db: SqliteDb,
}

impl SqliteQuizResultRepository {
    pub fn new(db: SqliteDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl QuizResultRepository for SqliteQuizResultRepository {
    async fn create(&self, result: QuizResult) -> AppResult<QuizResult> {
        self.db
            .with_conn(move |conn| {
                let answers = serde_json::to_string(&result.answers)?;
                let results = serde_json::to_string(&result.results)?;
                conn.execute(
                    &format!(
                        "INSERT INTO quiz_results ({}) \
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                        RESULT_COLUMNS
                    ),
                    params![
                        result.id,
                        result.quiz_id,
                        result.student_name,
                        result.score,
                        result.max_score,
                        result.percentage,
                        result.passed,
                        answers,
                        results,
                        result.submitted_at,
                    ],
                )?;
                Ok(result)
            })
            .await
    }

    async fn find_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizResult>> {
        let quiz_id = quiz_id.to_string();
        self.db
            .with_conn(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM quiz_results WHERE quiz_id = ?1 ORDER BY submitted_at DESC",
                    RESULT_COLUMNS
                ))?;
                let results = stmt
                    .query_map(params![quiz_id], result_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(results)
            })
            .await
    }

    async fn delete_by_quiz(&self, quiz_id: &str) -> AppResult<u64> {
        let quiz_id = quiz_id.to_string();
        self.db
            .with_conn(move |conn| {
                let removed =
                    conn.execute("DELETE FROM quiz_results WHERE quiz_id = ?1", params![quiz_id])?;
                Ok(removed as u64)
            })
            .await
    }

    async fn count(&self) -> AppResult<u64> {
        self.db
            .with_conn(|conn| count_rows(conn, COUNT_QUIZ_RESULTS))
            .await
    }

    async fn average_percentage(&self) -> AppResult<Option<f64>> {
        self.db
            .with_conn(|conn| {
                let average: Option<f64> =
                    conn.query_row("SELECT AVG(percentage) FROM quiz_results", [], |row| {
                        row.get(0)
                    })?;
                Ok(average)
            })
            .await
    }
}

pub struct SqliteMediaRepository {
    db: SqliteDb,
}

impl SqliteMediaRepository {
    pub fn new(db: SqliteDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MediaRepository for SqliteMediaRepository {
    async fn create(&self, file: MediaFile) -> AppResult<MediaFile> {
        self.db
            .with_conn(move |conn| {
                conn.execute(
                    &format!(
                        "INSERT INTO media_files ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                        MEDIA_COLUMNS
                    ),
                    params![
                        file.id,
                        file.filename,
                        file.original_name,
                        file.mime_type,
                        file.size as i64,
                        file.url,
                        file.media_type,
                        file.created_at,
                    ],
                )?;
                Ok(file)
            })
            .await
    }

    async fn find_by_filename(&self, filename: &str) -> AppResult<Option<MediaFile>> {
        let filename = filename.to_string();
        self.db
            .with_conn(move |conn| {
                let file = conn
                    .query_row(
                        &format!("SELECT {} FROM media_files WHERE filename = ?1", MEDIA_COLUMNS),
                        params![filename],
                        media_from_row,
                    )
                    .optional()?;
                Ok(file)
            })
            .await
    }

    async fn find_all(&self) -> AppResult<Vec<MediaFile>> {
        self.db
            .with_conn(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM media_files ORDER BY created_at DESC",
                    MEDIA_COLUMNS
                ))?;
                let files = stmt
                    .query_map([], media_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(files)
            })
            .await
    }

    async fn delete_by_filename(&self, filename: &str) -> AppResult<bool> {
        let filename = filename.to_string();
        self.db
            .with_conn(move |conn| {
                let changed =
                    conn.execute("DELETE FROM media_files WHERE filename = ?1", params![filename])?;
                Ok(changed > 0)
            })
            .await
    }

    async fn count(&self) -> AppResult<u64> {
        self.db
            .with_conn(|conn| count_rows(conn, COUNT_MEDIA_FILES))
            .await
    }
}
