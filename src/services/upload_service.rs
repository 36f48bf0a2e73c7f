use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    models::domain::MediaFile,
    repositories::MediaRepository,
};

// Unanchored; matched against both the extension and the MIME type.
static ALLOWED_TYPES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"jpeg|jpg|png|gif|mp4|webm|ogg|mp3|wav|pdf|doc|docx")
        .expect("ALLOWED_TYPES is a valid regex pattern")
});

static STORED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_-][A-Za-z0-9._-]*$").expect("STORED_NAME is a valid regex pattern")
});

pub struct UploadService {
    media: Arc<dyn MediaRepository>,
    upload_dir: PathBuf,
    max_upload_bytes: u64,
}

impl UploadService {
    pub fn new(media: Arc<dyn MediaRepository>, upload_dir: PathBuf, max_upload_bytes: u64) -> Self {
        Self {
            media,
            upload_dir,
            max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Both the file extension and the declared MIME type must be on the allow-list.
    pub fn check_allowed(original_name: &str, mime_type: &str) -> AppResult<()> {
        let extension = extension_of(original_name).to_ascii_lowercase();
        if ALLOWED_TYPES.is_match(&extension) && ALLOWED_TYPES.is_match(mime_type) {
            Ok(())
        } else {
            Err(AppError::ValidationError(format!(
                "File type not allowed: {} ({})",
                original_name, mime_type
            )))
        }
    }

    /// Writes the bytes under a fresh unique name and records the file.
    pub async fn store(
        &self,
        original_name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> AppResult<MediaFile> {
        if bytes.is_empty() {
            return Err(AppError::ValidationError("No file uploaded".to_string()));
        }
        if bytes.len() as u64 > self.max_upload_bytes {
            return Err(self.too_large());
        }
        Self::check_allowed(original_name, mime_type)?;

        let filename = unique_filename(original_name);
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        let path = self.upload_dir.join(&filename);
        tokio::fs::write(&path, bytes).await?;

        let file = MediaFile::new(&filename, original_name, mime_type, bytes.len() as u64);
        match self.media.create(file).await {
            Ok(file) => {
                log::info!("Stored upload {} ({} bytes)", file.filename, file.size);
                Ok(file)
            }
            Err(err) => {
                if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                    log::warn!("Could not remove orphaned upload {}: {}", filename, cleanup);
                }
                Err(err)
            }
        }
    }

    pub fn too_large(&self) -> AppError {
        AppError::ValidationError(format!(
            "File exceeds the {} byte upload limit",
            self.max_upload_bytes
        ))
    }

    pub async fn list_files(&self) -> AppResult<Vec<MediaFile>> {
        self.media.find_all().await
    }

    /// Removes the file from disk and from the media table. Missing from
    /// both means the upload never existed.
    pub async fn delete_file(&self, filename: &str) -> AppResult<()> {
        if !STORED_NAME.is_match(filename) {
            return Err(AppError::ValidationError(format!(
                "Invalid file name '{}'",
                filename
            )));
        }

        let on_disk = match tokio::fs::remove_file(self.upload_dir.join(filename)).await {
            Ok(()) => true,
            Err(err) if err.kind() == ErrorKind::NotFound => false,
            Err(err) => return Err(err.into()),
        };
        let recorded = self.media.delete_by_filename(filename).await?;

        if !on_disk && !recorded {
            return Err(AppError::NotFound(format!("File '{}' not found", filename)));
        }
        log::info!("Deleted upload {}", filename);
        Ok(())
    }
}

fn extension_of(name: &str) -> &str {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
}

/// `<millis>-<random>.<ext>`
fn unique_filename(original_name: &str) -> String {
    let suffix = Uuid::new_v4().as_u128() % 1_000_000_000;
    let extension = extension_of(original_name).to_ascii_lowercase();
    if extension.is_empty() {
        format!("{}-{}", Utc::now().timestamp_millis(), suffix)
    } else {
        format!("{}-{}.{}", Utc::now().timestamp_millis(), suffix, extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryMediaRepository;

    fn service(dir: &Path, max: u64) -> UploadService {
        UploadService::new(Arc::new(InMemoryMediaRepository::new()), dir.to_path_buf(), max)
    }

    #[test]
    fn allow_list_checks_extension_and_mime() {
        assert!(UploadService::check_allowed("cat.PNG", "image/png").is_ok());
        assert!(UploadService::check_allowed(
            "notes.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        )
        .is_ok());
        assert!(UploadService::check_allowed("tool.exe", "application/octet-stream").is_err());
        assert!(UploadService::check_allowed("fake.png", "application/x-msdownload").is_err());
        assert!(UploadService::check_allowed("noext", "image/png").is_err());
    }

    #[test]
    fn unique_filenames_keep_the_extension() {
        let a = unique_filename("Photo.JPG");
        let b = unique_filename("Photo.JPG");
        assert!(a.ends_with(".jpg"));
        assert_ne!(a, b);
        assert!(STORED_NAME.is_match(&a));
    }

    #[tokio::test]
    async fn store_writes_file_and_record() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = service(dir.path(), 1024);

        let file = uploads.store("cat.png", "image/png", b"png-bytes").await.unwrap();

        assert_eq!(file.size, 9);
        assert_eq!(file.media_type, "image");
        assert_eq!(file.url, format!("/uploads/{}", file.filename));
        let written = tokio::fs::read(dir.path().join(&file.filename)).await.unwrap();
        assert_eq!(written, b"png-bytes");
        assert_eq!(uploads.list_files().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn store_rejects_oversized_files() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = service(dir.path(), 4);

        let result = uploads.store("cat.png", "image/png", b"too big").await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn delete_removes_file_then_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = service(dir.path(), 1024);
        let file = uploads.store("song.wav", "audio/wav", b"riff").await.unwrap();

        uploads.delete_file(&file.filename).await.unwrap();
        assert!(!dir.path().join(&file.filename).exists());

        let again = uploads.delete_file(&file.filename).await;
        assert!(matches!(again, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let result = service(dir.path(), 1024).delete_file("../secret").await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}
