use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::warn;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use docsend_api::{ApiError, ProgressFn, Uploader};
use docsend_core::{
    api::FileId,
    models::uploads::FileRecord,
    upload::session::{UploadEvent, UploadMirror, UploadSession},
};

/// Hand every admitted record to the uploader and feed the resulting
/// callbacks back into the session until all of them settle. Ctrl-C cancels
/// the in-flight transfers and drops their records.
pub async fn run_batch<M, U>(
    session: &mut UploadSession<M>,
    uploader: Arc<U>,
    admitted: Vec<FileRecord>,
) -> Result<()>
where
    M: UploadMirror,
    U: Uploader + 'static,
{
    if admitted.is_empty() {
        return Ok(());
    }

    let (events_tx, mut events) = mpsc::unbounded_channel::<UploadEvent>();
    let progress = MultiProgress::new();
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{bar:.cyan/blue}] {pos:>3}% {msg}",
    )?
    .progress_chars("#>-");

    let mut bars: HashMap<FileId, ProgressBar> = HashMap::new();
    let mut tokens: HashMap<FileId, CancellationToken> = HashMap::new();

    for record in admitted {
        let Some(source) = record.source.clone() else {
            continue;
        };

        let bar = progress.add(ProgressBar::new(100));
        bar.set_style(style.clone());
        bar.set_message(record.name.clone());
        bars.insert(record.id.clone(), bar);

        let token = CancellationToken::new();
        tokens.insert(record.id.clone(), token.clone());

        let tx = events_tx.clone();
        let uploader = Arc::clone(&uploader);
        let id = record.id.clone();
        let name = record.name.clone();
        tokio::spawn(async move {
            let _ = tx.send(UploadEvent::Started { id: id.clone() });

            let progress_tx = tx.clone();
            let progress_id = id.clone();
            let on_progress: ProgressFn = Arc::new(move |percent| {
                let _ = progress_tx.send(UploadEvent::Progress {
                    id: progress_id.clone(),
                    percent,
                });
            });

            match uploader.upload(&source, &name, on_progress, token).await {
                Ok(attachment_id) => {
                    let _ = tx.send(UploadEvent::Completed { id, attachment_id });
                }
                // A cancelled transfer was already removed from the session.
                Err(ApiError::Cancelled) => {}
                Err(err) => {
                    let _ = tx.send(UploadEvent::Failed {
                        id,
                        message: err.to_string(),
                    });
                }
            }
        });
    }
    drop(events_tx);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;

    loop {
        tokio::select! {
            maybe = events.recv() => {
                let Some(event) = maybe else {
                    break;
                };
                if let Some(bar) = bars.get(event.file_id()) {
                    match &event {
                        UploadEvent::Started { .. } => bar.tick(),
                        UploadEvent::Progress { percent, .. } => {
                            bar.set_position(u64::from(*percent));
                        }
                        UploadEvent::Completed { .. } => {
                            bar.set_position(100);
                            bar.finish();
                        }
                        UploadEvent::Failed { .. } => bar.abandon(),
                    }
                }
                session.apply(event)?;
            }
            _ = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                warn!("Interrupted, cancelling in-flight uploads...");
                let active: Vec<FileId> = session
                    .files()
                    .iter()
                    .filter(|record| !record.is_settled())
                    .map(|record| record.id.clone())
                    .collect();
                for id in &active {
                    if let Some(token) = tokens.get(id) {
                        token.cancel();
                    }
                    if let Some(bar) = bars.get(id) {
                        bar.abandon();
                    }
                    session.remove(id)?;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use async_trait::async_trait;
    use docsend_core::{
        api::AttachmentId,
        models::uploads::UploadStatus,
        upload::{AcceptPattern, UploadPolicy},
    };

    use super::*;
    use crate::{files, state::JsonStateMirror};

    struct StubUploader;

    #[async_trait]
    impl Uploader for StubUploader {
        async fn upload(
            &self,
            _source: &Path,
            file_name: &str,
            progress: ProgressFn,
            _cancel: CancellationToken,
        ) -> Result<AttachmentId, ApiError> {
            for percent in [0, 50, 100] {
                progress(percent);
            }
            Ok(AttachmentId(format!("stub-{file_name}")))
        }
    }

    struct FailingUploader;

    #[async_trait]
    impl Uploader for FailingUploader {
        async fn upload(
            &self,
            _source: &Path,
            _file_name: &str,
            _progress: ProgressFn,
            _cancel: CancellationToken,
        ) -> Result<AttachmentId, ApiError> {
            Err(ApiError::NotFound)
        }
    }

    fn policy() -> UploadPolicy {
        UploadPolicy {
            max_files: 5,
            max_size: 1024 * 1024,
            accept: AcceptPattern::parse(".zip").unwrap(),
            multiple: true,
        }
    }

    #[tokio::test]
    async fn run_batch_drives_admitted_files_to_completion() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("books.zip");
        std::fs::write(&file_path, b"zip bytes").unwrap();

        let mirror = JsonStateMirror::new(dir.path().join("uploads.json"));
        let mut session = UploadSession::restore(policy(), mirror).unwrap();
        let candidates = files::gather_candidates(&[file_path]).unwrap();
        let admitted = session.add_files(candidates).unwrap();
        assert_eq!(admitted.len(), 1);

        run_batch(&mut session, Arc::new(StubUploader), admitted).await.unwrap();

        let record = &session.files()[0];
        assert_eq!(record.status, UploadStatus::Completed);
        assert_eq!(record.progress, 100);
        assert_eq!(
            record.attachment_id,
            Some(AttachmentId("stub-books.zip".to_string()))
        );

        // The mirror picked the completed record up.
        let reloaded =
            UploadSession::restore(policy(), JsonStateMirror::new(dir.path().join("uploads.json")))
                .unwrap();
        assert_eq!(reloaded.files().len(), 1);
    }

    #[tokio::test]
    async fn failed_uploads_land_in_the_error_list() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("books.zip");
        std::fs::write(&file_path, b"zip bytes").unwrap();

        let mirror = JsonStateMirror::new(dir.path().join("uploads.json"));
        let mut session = UploadSession::restore(policy(), mirror).unwrap();
        let candidates = files::gather_candidates(&[file_path]).unwrap();
        let admitted = session.add_files(candidates).unwrap();

        run_batch(&mut session, Arc::new(FailingUploader), admitted).await.unwrap();

        assert_eq!(session.errors().len(), 1);
        assert_eq!(session.files()[0].status, UploadStatus::Error);
        assert!(session.attachment_ids().is_empty());
    }
}
