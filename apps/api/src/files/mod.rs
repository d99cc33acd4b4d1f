//! Uploaded attachments: bytes on disk under the upload directory, metadata in
//! memory. Metadata is lost on restart like every other collection.

pub mod handlers;

use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::store::{Collection, Record};

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "application/pdf"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

impl Record for StoredFile {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Falls back to the file extension when the client sent no content type.
pub fn resolve_content_type(declared: Option<&str>, file_name: &str) -> Option<String> {
    if let Some(declared) = declared.map(str::trim).filter(|s| !s.is_empty()) {
        return Some(declared.to_ascii_lowercase());
    }
    let extension = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    let guessed = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(guessed.to_string())
}

pub fn check_content_type(content_type: &str) -> Result<(), AppError> {
    if ALLOWED_CONTENT_TYPES.contains(&content_type) {
        Ok(())
    } else {
        Err(AppError::UnsupportedMediaType(format!(
            "'{content_type}' is not allowed; use JPEG, PNG or PDF"
        )))
    }
}

pub fn check_size(size: usize) -> Result<(), AppError> {
    if size == 0 {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(AppError::PayloadTooLarge(format!(
            "File is {size} bytes; the limit is 5 MB"
        )));
    }
    Ok(())
}

#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    files: Collection<StoredFile>,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            files: Collection::default(),
        }
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(id.to_string())
    }

    pub async fn save(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<StoredFile, AppError> {
        check_content_type(content_type)?;
        check_size(bytes.len())?;

        let id = Uuid::new_v4();
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.path_for(id), &bytes).await?;

        let stored = StoredFile {
            id,
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            size: bytes.len(),
            url: format!("/api/files/{id}"),
            uploaded_at: Utc::now(),
        };
        info!("Stored file {} ({} bytes) as {id}", stored.file_name, stored.size);
        Ok(self.files.insert(stored).await)
    }

    pub async fn list(&self) -> Vec<StoredFile> {
        self.files.all().await
    }

    pub async fn read(&self, id: Uuid) -> Result<(StoredFile, Bytes), AppError> {
        let meta = self
            .files
            .find(id)
            .await
            .ok_or_else(|| AppError::not_found("File", id))?;
        let bytes = tokio::fs::read(self.path_for(id)).await?;
        Ok((meta, Bytes::from(bytes)))
    }

    pub async fn delete(&self, id: Uuid) -> Result<StoredFile, AppError> {
        let meta = self
            .files
            .remove(id)
            .await
            .ok_or_else(|| AppError::not_found("File", id))?;
        match tokio::fs::remove_file(self.path_for(id)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        info!("Deleted file {id}");
        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_resolution() {
        assert_eq!(resolve_content_type(Some("Image/PNG"), "x.bin").as_deref(), Some("image/png"));
        assert_eq!(resolve_content_type(None, "scan.JPG").as_deref(), Some("image/jpeg"));
        assert_eq!(resolve_content_type(Some(""), "claim.pdf").as_deref(), Some("application/pdf"));
        assert_eq!(resolve_content_type(None, "notes.txt"), None);
        assert_eq!(resolve_content_type(None, "no_extension"), None);
    }

    #[test]
    fn test_allowed_types_only() {
        assert!(check_content_type("application/pdf").is_ok());
        assert!(matches!(
            check_content_type("text/plain"),
            Err(AppError::UnsupportedMediaType(_))
        ));
    }

    #[test]
    fn test_size_limits() {
        assert!(check_size(MAX_UPLOAD_BYTES).is_ok());
        assert!(matches!(check_size(MAX_UPLOAD_BYTES + 1), Err(AppError::PayloadTooLarge(_))));
        assert!(matches!(check_size(0), Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_save_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        let saved = store
            .save("card.png", "image/png", Bytes::from_static(b"\x89PNG fake"))
            .await
            .unwrap();
        assert_eq!(saved.size, 9);
        assert_eq!(saved.url, format!("/api/files/{}", saved.id));
        assert_eq!(store.list().await.len(), 1);

        let (meta, bytes) = store.read(saved.id).await.unwrap();
        assert_eq!(meta, saved);
        assert_eq!(&bytes[..], b"\x89PNG fake");

        store.delete(saved.id).await.unwrap();
        assert!(store.list().await.is_empty());
        assert!(matches!(store.read(saved.id).await, Err(AppError::NotFound(_))));
        assert!(!dir.path().join("nested").join(saved.id.to_string()).exists());
    }

    #[tokio::test]
    async fn test_rejected_upload_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        let result = store
            .save("a.exe", "application/octet-stream", Bytes::from_static(b"MZ"))
            .await;
        assert!(matches!(result, Err(AppError::UnsupportedMediaType(_))));
        assert!(store.list().await.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
