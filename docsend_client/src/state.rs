use std::path::PathBuf;

use anyhow::Result;
use docsend_core::{models::uploads::StoredUpload, upload::session::UploadMirror};

/// Completed uploads persisted as a JSON array next to the config file, so
/// a finished batch survives a restart. A missing file is an empty set.
pub struct JsonStateMirror {
    path: PathBuf,
}

impl JsonStateMirror {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl UploadMirror for JsonStateMirror {
    fn load(&self) -> Result<Vec<StoredUpload>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, completed: &[StoredUpload]) -> Result<()> {
        let text = serde_json::to_string_pretty(completed)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use docsend_core::api::{AttachmentId, FileId};

    #[test]
    fn missing_state_file_is_an_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = JsonStateMirror::new(dir.path().join("uploads.json"));
        assert!(mirror.load().unwrap().is_empty());
    }

    #[test]
    fn saved_uploads_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = JsonStateMirror::new(dir.path().join("uploads.json"));
        let uploads = vec![StoredUpload {
            id: FileId("books.zip-17-abc".to_string()),
            name: "books.zip".to_string(),
            size: 420,
            attachment_id: AttachmentId("A1".to_string()),
            uploaded_at: Utc::now(),
        }];
        mirror.save(&uploads).unwrap();

        let loaded = mirror.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, uploads[0].id);
        assert_eq!(loaded[0].name, uploads[0].name);
        assert_eq!(loaded[0].size, uploads[0].size);
        assert_eq!(loaded[0].attachment_id, uploads[0].attachment_id);
    }

    #[test]
    fn save_overwrites_the_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = JsonStateMirror::new(dir.path().join("uploads.json"));
        let upload = StoredUpload {
            id: FileId("a".to_string()),
            name: "a.zip".to_string(),
            size: 1,
            attachment_id: AttachmentId("A1".to_string()),
            uploaded_at: Utc::now(),
        };
        mirror.save(std::slice::from_ref(&upload)).unwrap();
        mirror.save(&[]).unwrap();
        assert!(mirror.load().unwrap().is_empty());
    }
}
