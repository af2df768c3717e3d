use bytes::Bytes;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

/// Where an upload lands inside the content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadCategory {
    GovtId,
    ProductImage,
}

impl UploadCategory {
    fn dir(self) -> &'static str {
        match self {
            UploadCategory::GovtId => "uploads/govt_ids",
            UploadCategory::ProductImage => "uploads/products",
        }
    }
}

/// A file part taken from a multipart request.
#[derive(Debug, Clone)]
pub struct UploadItem {
    pub body: Bytes,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

/// Result of a successful upload: the key for cleanup and the public reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub key: String,
    pub url: String,
}

/// Validates and stores an upload under a fresh, collision-free name.
pub async fn store(
    st: &AppState,
    item: UploadItem,
    category: UploadCategory,
) -> Result<StoredFile, AppError> {
    let filename = item
        .filename
        .as_deref()
        .map(base_name)
        .filter(|n| !n.trim_matches('.').trim().is_empty())
        .ok_or_else(|| AppError::Upload("Invalid file: missing file name".into()))?;
    if item.body.is_empty() {
        return Err(AppError::Upload("Invalid file: empty upload".into()));
    }

    let ext = sanitized_extension(filename)
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    let key = format!("{}/{}{}", category.dir(), Uuid::new_v4().simple(), ext);
    let content_type = item
        .content_type
        .as_deref()
        .unwrap_or("application/octet-stream");
    let size = item.body.len();

    st.storage
        .put_object(&key, item.body, content_type)
        .await
        .map_err(|e| {
            error!(error = ?e, %key, "content store write failed");
            AppError::Upload("File upload failed".into())
        })?;

    info!(%key, size, "upload stored");
    Ok(StoredFile {
        url: st.storage.public_url(&key),
        key,
    })
}

/// Best-effort removal of a file whose owning record was never created.
pub async fn discard(st: &AppState, file: &StoredFile) {
    if let Err(e) = st.storage.delete_object(&file.key).await {
        warn!(error = ?e, key = %file.key, "could not remove orphaned upload");
    }
}

fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

fn sanitized_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 10 {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
