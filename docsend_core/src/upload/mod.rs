pub mod session;
pub mod validate;

pub const DEFAULT_MAX_FILES: usize = 5;
pub const DEFAULT_MAX_SIZE: u64 = 100 * 1024 * 1024;
pub const DEFAULT_ACCEPT: &str = ".zip";

#[derive(thiserror::Error, Debug)]
pub enum PolicyError {
    #[error("invalid accept entry {0:?}")]
    InvalidAccept(String),
    #[error("max_files must be at least 1")]
    ZeroMaxFiles,
    #[error("max_size must be at least 1 byte")]
    ZeroMaxSize,
}

/// Limits a batch is admitted under. Built once at startup from the config
/// file; malformed values are rejected there rather than at admission time.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_files: usize,
    pub max_size: u64,
    pub accept: AcceptPattern,
    pub multiple: bool,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_size: DEFAULT_MAX_SIZE,
            accept: AcceptPattern::any(),
            multiple: false,
        }
    }
}

impl UploadPolicy {
    pub fn validated(self) -> Result<Self, PolicyError> {
        if self.max_files == 0 {
            return Err(PolicyError::ZeroMaxFiles);
        }
        if self.max_size == 0 {
            return Err(PolicyError::ZeroMaxSize);
        }
        Ok(self)
    }
}

/// Comma-separated accept list: `.ext`, `type/*`, `type/subtype`, or `*`.
#[derive(Debug, Clone)]
pub struct AcceptPattern {
    entries: Vec<AcceptEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AcceptEntry {
    Any,
    Extension(String),
    TypePrefix(String),
    Exact(String),
}

impl AcceptPattern {
    pub fn any() -> Self {
        Self {
            entries: vec![AcceptEntry::Any],
        }
    }

    pub fn parse(value: &str) -> Result<Self, PolicyError> {
        let mut entries = Vec::new();
        for raw in value.split(',') {
            let entry = raw.trim();
            if entry.is_empty() {
                return Err(PolicyError::InvalidAccept(raw.to_string()));
            }
            if entry == "*" || entry == "*/*" {
                entries.push(AcceptEntry::Any);
            } else if let Some(ext) = entry.strip_prefix('.') {
                if ext.is_empty() || ext.contains('/') {
                    return Err(PolicyError::InvalidAccept(entry.to_string()));
                }
                entries.push(AcceptEntry::Extension(ext.to_ascii_lowercase()));
            } else if let Some(base) = entry.strip_suffix("/*") {
                if base.is_empty() {
                    return Err(PolicyError::InvalidAccept(entry.to_string()));
                }
                entries.push(AcceptEntry::TypePrefix(format!(
                    "{}/",
                    base.to_ascii_lowercase()
                )));
            } else {
                let mut parts = entry.split('/');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(base), Some(sub), None) if !base.is_empty() && !sub.is_empty() => {
                        entries.push(AcceptEntry::Exact(entry.to_ascii_lowercase()));
                    }
                    _ => return Err(PolicyError::InvalidAccept(entry.to_string())),
                }
            }
        }
        if entries.is_empty() {
            return Err(PolicyError::InvalidAccept(value.to_string()));
        }
        Ok(Self { entries })
    }

    pub fn matches(&self, file_name: &str, content_type: &str) -> bool {
        let content_type = content_type.to_ascii_lowercase();
        let extension = file_name
            .rsplit('.')
            .next()
            .map(|ext| ext.to_ascii_lowercase());
        self.entries.iter().any(|entry| match entry {
            AcceptEntry::Any => true,
            AcceptEntry::Extension(ext) => extension.as_deref() == Some(ext.as_str()),
            AcceptEntry::TypePrefix(prefix) => content_type.starts_with(prefix),
            AcceptEntry::Exact(exact) => content_type == *exact,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_everything_by_default() {
        let pattern = AcceptPattern::any();
        assert!(pattern.matches("notes.txt", "text/plain"));
    }

    #[test]
    fn matches_extension_case_insensitively() {
        let pattern = AcceptPattern::parse(".zip").unwrap();
        assert!(pattern.matches("books.ZIP", "application/octet-stream"));
        assert!(!pattern.matches("books.tar", "application/x-tar"));
    }

    #[test]
    fn matches_wildcard_subtype() {
        let pattern = AcceptPattern::parse("image/*").unwrap();
        assert!(pattern.matches("photo.png", "image/png"));
        assert!(!pattern.matches("clip.mp4", "video/mp4"));
    }

    #[test]
    fn matches_exact_content_type() {
        let pattern = AcceptPattern::parse("application/zip").unwrap();
        assert!(pattern.matches("docs.zip", "application/zip"));
        assert!(!pattern.matches("docs.gz", "application/gzip"));
    }

    #[test]
    fn mixed_list_matches_any_entry() {
        let pattern = AcceptPattern::parse(".zip, application/pdf").unwrap();
        assert!(pattern.matches("a.zip", "application/zip"));
        assert!(pattern.matches("a.pdf", "application/pdf"));
        assert!(!pattern.matches("a.txt", "text/plain"));
    }

    #[test]
    fn rejects_malformed_entries() {
        assert!(AcceptPattern::parse("zip").is_err());
        assert!(AcceptPattern::parse(".").is_err());
        assert!(AcceptPattern::parse("/*").is_err());
        assert!(AcceptPattern::parse("").is_err());
    }

    #[test]
    fn policy_rejects_zero_limits() {
        let policy = UploadPolicy {
            max_files: 0,
            ..UploadPolicy::default()
        };
        assert!(policy.validated().is_err());

        let policy = UploadPolicy {
            max_size: 0,
            ..UploadPolicy::default()
        };
        assert!(policy.validated().is_err());
    }
}
