use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    api::{AttachmentId, FileId},
    StrConversion,
};

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub enum UploadStatus {
    Pending,
    Uploading,
    Completed,
    Error,
}

impl std::fmt::Display for UploadStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.as_str())
    }
}
impl StrConversion for UploadStatus {
    fn from_str(value: &str) -> Self {
        match value {
            "Uploading" => Self::Uploading,
            "Completed" => Self::Completed,
            "Error" => Self::Error,
            _ => Self::Pending,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Uploading => "Uploading",
            Self::Completed => "Completed",
            Self::Error => "Error",
        }
    }
}

/// One file in the current submission batch.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileRecord {
    pub id: FileId,
    /// Where the file lives on disk. `None` for records restored from the
    /// persisted snapshot, which keeps only the descriptive metadata.
    pub source: Option<PathBuf>,
    pub name: String,
    pub size: u64,
    pub status: UploadStatus,
    pub progress: u8,
    pub attachment_id: Option<AttachmentId>,
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl FileRecord {
    pub fn is_settled(&self) -> bool {
        matches!(self.status, UploadStatus::Completed | UploadStatus::Error)
    }

    /// Projection persisted across runs. Only completed records with a
    /// server-assigned attachment id qualify.
    pub fn stored(&self) -> Option<StoredUpload> {
        if self.status != UploadStatus::Completed {
            return None;
        }
        let attachment_id = self.attachment_id.clone()?;
        Some(StoredUpload {
            id: self.id.clone(),
            name: self.name.clone(),
            size: self.size,
            attachment_id,
            uploaded_at: self.uploaded_at.unwrap_or_else(Utc::now),
        })
    }
}

/// A completed upload as it survives restarts. The file handle itself does
/// not round-trip; only the metadata and the attachment id do.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StoredUpload {
    pub id: FileId,
    pub name: String,
    pub size: u64,
    pub attachment_id: AttachmentId,
    pub uploaded_at: DateTime<Utc>,
}

impl From<StoredUpload> for FileRecord {
    fn from(x: StoredUpload) -> Self {
        Self {
            id: x.id,
            source: None,
            name: x.name,
            size: x.size,
            status: UploadStatus::Completed,
            progress: 100,
            attachment_id: Some(x.attachment_id),
            uploaded_at: Some(x.uploaded_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn stored_projection_requires_a_completed_record() {
        let record = FileRecord {
            id: FileId("books.zip-17-abc".to_string()),
            source: Some(PathBuf::from("/tmp/books.zip")),
            name: "books.zip".to_string(),
            size: 42,
            status: UploadStatus::Uploading,
            progress: 60,
            attachment_id: None,
            uploaded_at: None,
        };
        assert!(record.stored().is_none());

        let record = FileRecord {
            status: UploadStatus::Completed,
            progress: 100,
            attachment_id: Some(AttachmentId("A1".to_string())),
            uploaded_at: Some(Utc::now()),
            ..record
        };
        let stored = record.stored().unwrap();
        assert_eq!(stored.attachment_id, AttachmentId("A1".to_string()));
        assert_eq!(stored.name, "books.zip");
    }

    #[test]
    fn stored_uploads_survive_a_json_round_trip_without_the_file_handle() {
        let stored = StoredUpload {
            id: FileId("books.zip-17-abc".to_string()),
            name: "books.zip".to_string(),
            size: 42,
            attachment_id: AttachmentId("A1".to_string()),
            uploaded_at: Utc::now(),
        };
        let text = serde_json::to_string(&stored).unwrap();
        let restored = FileRecord::from(serde_json::from_str::<StoredUpload>(&text).unwrap());
        assert_eq!(restored.id, stored.id);
        assert_eq!(restored.status, UploadStatus::Completed);
        assert_eq!(restored.progress, 100);
        assert!(restored.source.is_none());
        assert_eq!(restored.attachment_id, Some(stored.attachment_id));
    }
}
