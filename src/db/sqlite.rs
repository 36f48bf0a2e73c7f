use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use rusqlite::Connection;

use crate::errors::{AppError, AppResult};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS lessons (
    id            TEXT PRIMARY KEY,
    title         TEXT NOT NULL,
    content_html  TEXT NOT NULL DEFAULT '',
    content_text  TEXT NOT NULL DEFAULT '',
    content_media TEXT NOT NULL DEFAULT '[]',
    sort_order    INTEGER NOT NULL DEFAULT 0,
    is_published  INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS quizzes (
    id            TEXT PRIMARY KEY,
    lesson_id     TEXT NOT NULL UNIQUE,
    title         TEXT NOT NULL,
    description   TEXT,
    questions     TEXT NOT NULL DEFAULT '[]',
    time_limit    INTEGER,
    passing_score INTEGER NOT NULL DEFAULT 70,
    attempts      INTEGER NOT NULL DEFAULT 1,
    is_published  INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS media_files (
    id            TEXT PRIMARY KEY,
    filename      TEXT NOT NULL UNIQUE,
    original_name TEXT NOT NULL,
    mime_type     TEXT NOT NULL,
    size          INTEGER NOT NULL,
    url           TEXT NOT NULL,
    media_type    TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS quiz_results (
    id            TEXT PRIMARY KEY,
    quiz_id       TEXT NOT NULL,
    student_name  TEXT NOT NULL,
    score         INTEGER NOT NULL,
    max_score     INTEGER NOT NULL,
    percentage    INTEGER NOT NULL,
    passed        INTEGER NOT NULL,
    answers       TEXT NOT NULL DEFAULT '[]',
    results       TEXT NOT NULL DEFAULT '[]',
    submitted_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_quiz_results_quiz ON quiz_results (quiz_id, submitted_at);
";

/// One SQLite connection shared by every repository. Statements run on the
/// blocking pool, one at a time.
#[derive(Clone)]
pub struct SqliteDb {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDb {
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        log::info!("Opened SQLite database at {}", path.display());
        Self::init(conn)
    }

    pub fn open_in_memory() -> AppResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> AppResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking thread pool.
    pub async fn with_conn<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Connection) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| AppError::StorageError("SQLite connection lock poisoned".to_string()))?;
            f(&guard)
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_creates_all_tables() {
        let db = SqliteDb::open_in_memory().unwrap();

        let tables: Vec<String> = db
            .with_conn(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .unwrap();

        assert_eq!(tables, vec!["lessons", "media_files", "quiz_results", "quizzes"]);
    }

    #[test]
    fn opening_a_file_twice_keeps_the_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("quizflow.db");

        SqliteDb::open(&path).unwrap();
        assert!(SqliteDb::open(&path).is_ok());
    }
}
