//! Local-disk storage for uploaded document files.
//!
//! Files live under `<root>/documents/` and are referenced from the database
//! by their path relative to `root`.

use axum::body::Bytes;
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

const DOCUMENTS_DIR: &str = "documents";

/// A file received from a multipart upload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Where and what was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Relative to the store root
    pub path: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: i64,
    /// Lowercase hex sha-256
    pub checksum: String,
}

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn save(&self, upload: &UploadedFile) -> io::Result<StoredFile> {
        let relative = format!(
            "{}/{}-{}{}",
            DOCUMENTS_DIR,
            chrono::Utc::now().timestamp(),
            uuid::Uuid::new_v4().simple(),
            extension_of(upload.file_name.as_deref())
        );
        let full = self.resolve(&relative)?;

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, &upload.bytes).await?;
        debug!("Stored {} bytes at {}", upload.bytes.len(), full.display());

        Ok(StoredFile {
            path: relative,
            file_name: upload.file_name.clone(),
            content_type: upload.content_type.clone(),
            size: upload.bytes.len() as i64,
            checksum: checksum(&upload.bytes),
        })
    }

    pub async fn read(&self, path: &str) -> io::Result<Bytes> {
        let full = self.resolve(path)?;
        let data = tokio::fs::read(full).await?;
        Ok(Bytes::from(data))
    }

    /// Best effort; a missing file is not an error
    pub async fn remove(&self, path: &str) -> io::Result<()> {
        let full = self.resolve(path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("File {} already gone", full.display());
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Join a stored relative path onto the root, refusing anything that could escape it
    fn resolve(&self, relative: &str) -> io::Result<PathBuf> {
        let path = Path::new(relative);
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes || relative.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid storage path: {}", relative),
            ));
        }
        Ok(self.root.join(path))
    }
}

pub fn checksum(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// `.ext` from the client file name, kept only when it is short and alphanumeric
fn extension_of(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 16 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}
