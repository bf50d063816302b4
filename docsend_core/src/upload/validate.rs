use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::{
    api::FileId,
    models::uploads::{FileRecord, UploadStatus},
    upload::UploadPolicy,
    util::format_bytes,
};

/// A file offered for admission into the batch. Callers fill in the content
/// type; the validator does not sniff the file itself.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub source: PathBuf,
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub admitted: Vec<FileRecord>,
    pub errors: Vec<String>,
}

/// Check a single candidate against the policy. Returns a user-facing
/// message on rejection, `None` when the file may be admitted.
pub fn check_file(candidate: &FileCandidate, policy: &UploadPolicy) -> Option<String> {
    if candidate.size > policy.max_size {
        return Some(format!(
            "File \"{}\" exceeds the maximum size of {}.",
            candidate.name,
            format_bytes(policy.max_size)
        ));
    }
    if !policy.accept.matches(&candidate.name, &candidate.content_type) {
        return Some(format!(
            "File \"{}\" is not an accepted type.",
            candidate.name
        ));
    }
    None
}

/// Partition a batch into admitted records and rejection messages.
/// Candidates matching the `(name, size)` of a file already in the active
/// set are skipped without an error.
pub fn partition_batch(
    candidates: Vec<FileCandidate>,
    existing: &[FileRecord],
    policy: &UploadPolicy,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for candidate in candidates {
        let already_exists = existing
            .iter()
            .chain(outcome.admitted.iter())
            .any(|record| record.name == candidate.name && record.size == candidate.size);
        if already_exists {
            continue;
        }

        if let Some(message) = check_file(&candidate, policy) {
            outcome.errors.push(message);
            continue;
        }

        outcome.admitted.push(FileRecord {
            id: FileId::generate(&candidate.name, candidate.modified),
            source: Some(candidate.source),
            name: candidate.name,
            size: candidate.size,
            status: UploadStatus::Pending,
            progress: 0,
            attachment_id: None,
            uploaded_at: None,
        });
    }
    outcome
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::upload::AcceptPattern;

    pub(crate) fn candidate(name: &str, size: u64, content_type: &str) -> FileCandidate {
        FileCandidate {
            source: PathBuf::from(format!("/tmp/{name}")),
            name: name.to_string(),
            size,
            content_type: content_type.to_string(),
            modified: Some(Utc::now()),
        }
    }

    fn zip_policy(max_size: u64) -> UploadPolicy {
        UploadPolicy {
            max_size,
            accept: AcceptPattern::parse(".zip").unwrap(),
            multiple: true,
            ..UploadPolicy::default()
        }
    }

    #[test]
    fn oversize_file_is_rejected_with_a_message() {
        let policy = zip_policy(1024);
        let outcome = partition_batch(
            vec![candidate("big.zip", 2048, "application/zip")],
            &[],
            &policy,
        );
        assert!(outcome.admitted.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("big.zip"));
        assert!(outcome.errors[0].contains("1 KB"));
    }

    #[test]
    fn wrong_type_is_rejected() {
        let policy = zip_policy(u64::MAX);
        let outcome = partition_batch(
            vec![candidate("notes.txt", 10, "text/plain")],
            &[],
            &policy,
        );
        assert!(outcome.admitted.is_empty());
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn duplicates_inside_one_batch_are_skipped() {
        let policy = zip_policy(u64::MAX);
        let outcome = partition_batch(
            vec![
                candidate("a.zip", 10, "application/zip"),
                candidate("a.zip", 10, "application/zip"),
            ],
            &[],
            &policy,
        );
        assert_eq!(outcome.admitted.len(), 1);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn mixed_batch_admits_the_valid_remainder() {
        let policy = zip_policy(1024);
        let outcome = partition_batch(
            vec![
                candidate("ok.zip", 100, "application/zip"),
                candidate("huge.zip", 4096, "application/zip"),
                candidate("notes.txt", 10, "text/plain"),
            ],
            &[],
            &policy,
        );
        assert_eq!(outcome.admitted.len(), 1);
        assert_eq!(outcome.admitted[0].name, "ok.zip");
        assert_eq!(outcome.errors.len(), 2);
    }

    #[test]
    fn admitted_records_start_pending_with_fresh_ids() {
        let policy = zip_policy(u64::MAX);
        let outcome = partition_batch(
            vec![
                candidate("a.zip", 10, "application/zip"),
                candidate("b.zip", 10, "application/zip"),
            ],
            &[],
            &policy,
        );
        assert_eq!(outcome.admitted.len(), 2);
        for record in &outcome.admitted {
            assert_eq!(record.status, UploadStatus::Pending);
            assert_eq!(record.progress, 0);
            assert!(record.attachment_id.is_none());
        }
        assert_ne!(outcome.admitted[0].id, outcome.admitted[1].id);
    }
}
