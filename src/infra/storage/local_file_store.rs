use crate::domain::ports::FileStore;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Component, Path, PathBuf};
use tracing::{error, info};

/// Stores uploads as `<root>/<millis>-<sanitized name>` and hands that path back as the reference.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn sanitize(name: &str) -> String {
        let base = Path::new(name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.pdf");

        let cleaned: String = base
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
            .collect();

        if cleaned.trim_matches('.').is_empty() { "upload.pdf".to_string() } else { cleaned }
    }

    fn resolve(&self, reference: &str) -> Result<PathBuf, AppError> {
        let path = PathBuf::from(reference);
        if !path.starts_with(&self.root) || path.components().any(|c| c == Component::ParentDir) {
            return Err(AppError::NotFound("File not found".into()));
        }
        Ok(path)
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn save(&self, original_name: &str, data: &[u8]) -> Result<String, AppError> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            error!("Failed to create upload dir {:?}: {}", self.root, e);
            AppError::Internal
        })?;

        let file_name = format!("{}-{}", Utc::now().timestamp_millis(), Self::sanitize(original_name));
        let path = self.root.join(file_name);

        tokio::fs::write(&path, data).await.map_err(|e| {
            error!("Failed to write upload {:?}: {}", path, e);
            AppError::Internal
        })?;

        info!("Stored upload at {:?} ({} bytes)", path, data.len());
        Ok(path.to_string_lossy().into_owned())
    }

    async fn read(&self, reference: &str) -> Result<Vec<u8>, AppError> {
        let path = self.resolve(reference)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound("File not found".into()))
            }
            Err(e) => {
                error!("Failed to read upload {:?}: {}", path, e);
                Err(AppError::Internal)
            }
        }
    }

    async fn remove(&self, reference: &str) -> Result<(), AppError> {
        let path = self.resolve(reference)?;
        tokio::fs::remove_file(&path).await.map_err(|e| {
            error!("Failed to remove upload {:?}: {}", path, e);
            AppError::Internal
        })
    }
}
