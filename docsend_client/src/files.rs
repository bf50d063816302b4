use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use docsend_core::upload::validate::FileCandidate;

/// Turn the paths given on the command line into upload candidates,
/// sniffing the content type from the extension.
pub fn gather_candidates(paths: &[PathBuf]) -> anyhow::Result<Vec<FileCandidate>> {
    paths.iter().map(|path| candidate_for(path)).collect()
}

fn candidate_for(path: &Path) -> anyhow::Result<FileCandidate> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    if !metadata.is_file() {
        return Err(anyhow!("{} is not a file", path.display()));
    }
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("Invalid filename: {}", path.to_string_lossy()))?
        .to_string();
    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    let modified = metadata.modified().ok().map(DateTime::<Utc>::from);

    Ok(FileCandidate {
        source: path.to_path_buf(),
        name,
        size: metadata.len(),
        content_type,
        modified,
    })
}
