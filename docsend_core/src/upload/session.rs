use std::collections::HashSet;

use anyhow::Result;
use chrono::Utc;

use crate::{
    api::{AttachmentId, FileId},
    models::uploads::{FileRecord, StoredUpload, UploadStatus},
    upload::{validate, validate::FileCandidate, UploadPolicy},
};

/// Durable store for the completed set. Read once when the session is
/// restored, written on every completed-set mutation. Single writer.
pub trait UploadMirror {
    fn load(&self) -> Result<Vec<StoredUpload>>;
    fn save(&self, completed: &[StoredUpload]) -> Result<()>;
}

/// Callbacks from an in-flight upload, keyed by file identity. The session
/// reacts to these; it never blocks on the transfer itself.
#[derive(Debug, Clone)]
pub enum UploadEvent {
    Started {
        id: FileId,
    },
    Progress {
        id: FileId,
        percent: u8,
    },
    Completed {
        id: FileId,
        attachment_id: AttachmentId,
    },
    Failed {
        id: FileId,
        message: String,
    },
}

impl UploadEvent {
    pub fn file_id(&self) -> &FileId {
        match self {
            Self::Started { id }
            | Self::Progress { id, .. }
            | Self::Completed { id, .. }
            | Self::Failed { id, .. } => id,
        }
    }
}

/// What removing a record means for the caller.
#[derive(Debug, PartialEq, Eq)]
pub enum Removal {
    NotFound,
    /// The record never reached the wire; nothing else to do.
    Discarded,
    /// The record was mid-upload. Later events for it will be ignored; the
    /// caller should cancel the transfer if it can.
    Cancelled,
    /// The record had completed. The caller may request a best-effort remote
    /// delete of the attachment; local state has already moved on.
    Deleted {
        attachment_id: AttachmentId,
    },
}

/// Owns the active set of the current submission batch and applies the
/// per-file upload lifecycle. Constructed explicitly and passed to whoever
/// needs it; there is no ambient instance.
pub struct UploadSession<M: UploadMirror> {
    policy: UploadPolicy,
    mirror: M,
    files: Vec<FileRecord>,
    errors: Vec<String>,
    suppressed: HashSet<FileId>,
}

impl<M: UploadMirror> UploadSession<M> {
    /// Restore the completed set from the mirror and start an empty batch on
    /// top of it.
    pub fn restore(policy: UploadPolicy, mirror: M) -> Result<Self> {
        let files = mirror.load()?.into_iter().map(FileRecord::from).collect();
        Ok(Self {
            policy,
            mirror,
            files,
            errors: Vec::new(),
            suppressed: HashSet::new(),
        })
    }

    /// Admit a batch. Returns the newly admitted records so the caller can
    /// hand each one to the uploader; rejections land in `errors()`.
    ///
    /// A batch that would push the active set past `max_files` is rejected
    /// whole, with a single capacity error and no mutation.
    pub fn add_files(&mut self, candidates: Vec<FileCandidate>) -> Result<Vec<FileRecord>> {
        self.errors.clear();
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        if !self.policy.multiple {
            self.clear()?;
        }

        let outcome = validate::partition_batch(candidates, &self.files, &self.policy);

        if self.files.len() + outcome.admitted.len() > self.policy.max_files {
            self.errors.push(format!(
                "At most {} files can be submitted.",
                self.policy.max_files
            ));
            return Ok(Vec::new());
        }

        self.errors.extend(outcome.errors);
        if outcome.admitted.is_empty() {
            return Ok(Vec::new());
        }

        self.files.extend(outcome.admitted.iter().cloned());
        Ok(outcome.admitted)
    }

    /// Apply one upload callback. Events for removed records are dropped, as
    /// are progress or terminal events arriving after a record settled.
    pub fn apply(&mut self, event: UploadEvent) -> Result<()> {
        match event {
            UploadEvent::Started { id } => {
                if self.suppressed.contains(&id) {
                    return Ok(());
                }
                if let Some(record) = self.record_mut(&id) {
                    if record.status == UploadStatus::Pending {
                        record.status = UploadStatus::Uploading;
                    }
                }
            }
            UploadEvent::Progress { id, percent } => {
                if self.suppressed.contains(&id) {
                    return Ok(());
                }
                if let Some(record) = self.record_mut(&id) {
                    if record.status == UploadStatus::Uploading {
                        record.progress = percent.min(100);
                    }
                }
            }
            UploadEvent::Completed { id, attachment_id } => {
                if self.suppressed.remove(&id) {
                    return Ok(());
                }
                let Some(record) = self.record_mut(&id) else {
                    return Ok(());
                };
                if record.status == UploadStatus::Completed {
                    return Ok(());
                }
                record.status = UploadStatus::Completed;
                record.progress = 100;
                record.attachment_id = Some(attachment_id);
                record.uploaded_at = Some(Utc::now());
                self.save_completed()?;
            }
            UploadEvent::Failed { id, message } => {
                if self.suppressed.remove(&id) {
                    return Ok(());
                }
                let Some(record) = self.record_mut(&id) else {
                    return Ok(());
                };
                if record.status == UploadStatus::Completed {
                    return Ok(());
                }
                record.status = UploadStatus::Error;
                self.errors.push(message);
            }
        }
        Ok(())
    }

    /// Drop a record from the active set. See [`Removal`] for what the
    /// caller still owes depending on where the record was in its lifecycle.
    pub fn remove(&mut self, id: &FileId) -> Result<Removal> {
        let Some(position) = self.files.iter().position(|record| record.id == *id) else {
            return Ok(Removal::NotFound);
        };
        let record = self.files.remove(position);
        match record.status {
            UploadStatus::Uploading => {
                self.suppressed.insert(record.id);
                Ok(Removal::Cancelled)
            }
            UploadStatus::Completed => {
                self.save_completed()?;
                match record.attachment_id {
                    Some(attachment_id) => Ok(Removal::Deleted { attachment_id }),
                    None => Ok(Removal::Discarded),
                }
            }
            UploadStatus::Pending | UploadStatus::Error => Ok(Removal::Discarded),
        }
    }

    /// Empty the batch, suppressing whatever was still in flight, and
    /// persist the now-empty completed set.
    pub fn clear(&mut self) -> Result<()> {
        for record in &self.files {
            if record.status == UploadStatus::Uploading {
                self.suppressed.insert(record.id.clone());
            }
        }
        self.files.clear();
        self.save_completed()
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn completed(&self) -> impl Iterator<Item = &FileRecord> {
        self.files
            .iter()
            .filter(|record| record.status == UploadStatus::Completed)
    }

    pub fn attachment_ids(&self) -> Vec<AttachmentId> {
        self.completed()
            .filter_map(|record| record.attachment_id.clone())
            .collect()
    }

    fn record_mut(&mut self, id: &FileId) -> Option<&mut FileRecord> {
        self.files.iter_mut().find(|record| record.id == *id)
    }

    fn save_completed(&self) -> Result<()> {
        let stored: Vec<StoredUpload> = self.files.iter().filter_map(FileRecord::stored).collect();
        self.mirror.save(&stored)
    }
}
