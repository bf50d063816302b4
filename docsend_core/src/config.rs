use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::upload::{
    AcceptPattern, PolicyError, UploadPolicy, DEFAULT_ACCEPT, DEFAULT_MAX_FILES, DEFAULT_MAX_SIZE,
};

/// `docsend.toml`, shared by both binaries. Everything but the server URL is
/// optional; the upload section falls back to the stock limits.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConfigFile {
    pub server_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_path: Option<String>,
    #[serde(default, skip_serializing_if = "UploadSection::is_empty")]
    pub upload: UploadSection,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UploadSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_files: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple: Option<bool>,
}

impl UploadSection {
    fn is_empty(&self) -> bool {
        self.max_files.is_none()
            && self.max_size.is_none()
            && self.accept.is_none()
            && self.multiple.is_none()
    }
}

impl ConfigFile {
    /// Build the typed upload policy, rejecting malformed limits up front.
    pub fn policy(&self) -> Result<UploadPolicy, PolicyError> {
        let accept = match &self.upload.accept {
            Some(accept) => AcceptPattern::parse(accept)?,
            None => AcceptPattern::parse(DEFAULT_ACCEPT)?,
        };
        UploadPolicy {
            max_files: self.upload.max_files.unwrap_or(DEFAULT_MAX_FILES),
            max_size: self.upload.max_size.unwrap_or(DEFAULT_MAX_SIZE),
            accept,
            multiple: self.upload.multiple.unwrap_or(true),
        }
        .validated()
    }

    /// Where the completed-upload snapshot lives. The default name carries
    /// the crate major version so incompatible snapshots never collide.
    pub fn state_path(&self) -> PathBuf {
        match &self.state_path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(format!(
                "docsend.uploads.v{}.json",
                env!("CARGO_PKG_VERSION_MAJOR")
            )),
        }
    }
}
