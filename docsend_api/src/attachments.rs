use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use futures_util::TryStreamExt;
use tokio_util::{io::ReaderStream, sync::CancellationToken};

use docsend_core::api::{AttachmentId, AttachmentUploadResponse};

use crate::{ApiClient, ApiError};

/// Percentage sink for an in-flight upload. Invoked from the request body
/// stream as chunks go out; values are non-decreasing.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// The transfer seam the submission workflow is driven through. One call,
/// one terminal result; cancelling the token aborts the request.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(
        &self,
        source: &Path,
        file_name: &str,
        progress: ProgressFn,
        cancel: CancellationToken,
    ) -> Result<AttachmentId, ApiError>;
}

impl ApiClient {
    /// Stream a file as a multipart upload, reporting progress per chunk.
    pub async fn upload_attachment(
        &self,
        source: &Path,
        file_name: &str,
        progress: ProgressFn,
        cancel: CancellationToken,
    ) -> Result<AttachmentId, ApiError> {
        let file = tokio::fs::File::open(source).await?;
        let total = file.metadata().await?.len();

        let mut sent: u64 = 0;
        let stream = ReaderStream::new(file).inspect_ok(move |chunk| {
            sent += chunk.len() as u64;
            let percent = ((sent * 100) / total.max(1)).min(100) as u8;
            progress(percent);
        });

        let body = reqwest::Body::wrap_stream(stream);
        let part = reqwest::multipart::Part::stream_with_length(body, total)
            .file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let request = self
            .http()
            .post(format!("{}/attachments", self.base_url()))
            .multipart(form)
            .send();

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ApiError::Cancelled),
            response = request => response?,
        };

        let parsed: AttachmentUploadResponse = Self::ensure_ok(response).await?.json().await?;
        Ok(parsed.attachment_id)
    }
}

/// [`Uploader`] backed by the real API.
pub struct HttpUploader {
    api: ApiClient,
}

impl HttpUploader {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(
        &self,
        source: &Path,
        file_name: &str,
        progress: ProgressFn,
        cancel: CancellationToken,
    ) -> Result<AttachmentId, ApiError> {
        self.api
            .upload_attachment(source, file_name, progress, cancel)
            .await
    }
}
