use std::{env, path::PathBuf, str::FromStr};

use secrecy::SecretString;

use crate::errors::{AppError, AppResult};

/// Which persistence adapter backs the repositories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Sqlite,
    Mongo,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Sqlite => "sqlite",
            StorageBackend::Mongo => "mongo",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            "sqlite" => Ok(StorageBackend::Sqlite),
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            other => Err(AppError::ValidationError(format!(
                "Unknown storage backend '{}'",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub storage_backend: StorageBackend,
    pub sqlite_path: PathBuf,
    pub mongo_conn_string: SecretString,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: u64,
    pub drafts_dir: PathBuf,
    pub client_shell_path: PathBuf,
    pub default_passing_score: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            storage_backend: env::var("STORAGE_BACKEND")
                .ok()
                .and_then(|b| b.parse().ok())
                .unwrap_or(StorageBackend::Sqlite),
            sqlite_path: env::var("SQLITE_PATH")
                .unwrap_or_else(|_| "./quizflow.db".to_string())
                .into(),
            mongo_conn_string: SecretString::from(
                env::var("MONGO_CONN_STRING")
                    .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            ),
            mongo_db_name: env::var("MONGO_DB_NAME").unwrap_or_else(|_| "quizflow".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "uploads".to_string())
                .into(),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|b| b.parse().ok())
                .unwrap_or(50 * 1024 * 1024),
            drafts_dir: env::var("DRAFTS_DIR")
                .unwrap_or_else(|_| "drafts".to_string())
                .into(),
            client_shell_path: env::var("CLIENT_SHELL_PATH")
                .unwrap_or_else(|_| "index.html".to_string())
                .into(),
            default_passing_score: env::var("DEFAULT_PASSING_SCORE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(70),
        }
    }

    /// Rejects settings the server cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        if self.default_passing_score > 100 {
            return Err(AppError::ValidationError(format!(
                "DEFAULT_PASSING_SCORE must be between 0 and 100, got {}",
                self.default_passing_score
            )));
        }

        if self.max_upload_bytes == 0 {
            return Err(AppError::ValidationError(
                "MAX_UPLOAD_BYTES must be greater than zero".to_string(),
            ));
        }

        if self.mongo_db_name.trim().is_empty() && self.storage_backend == StorageBackend::Mongo {
            return Err(AppError::ValidationError(
                "MONGO_DB_NAME must be set when STORAGE_BACKEND=mongo".to_string(),
            ));
        }

        Ok(())
    }

    pub fn test_config() -> Self {
        Self {
            storage_backend: StorageBackend::Memory,
            sqlite_path: ":memory:".into(),
            mongo_conn_string: SecretString::from("mongodb://localhost:27017".to_string()),
            mongo_db_name: "quizflow-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 5000,
            upload_dir: env::temp_dir().join("quizflow-test-uploads"),
            max_upload_bytes: 50 * 1024 * 1024,
            drafts_dir: env::temp_dir().join("quizflow-test-drafts"),
            client_shell_path: "index.html".into(),
            default_passing_score: 70,
        }
    }
}
