pub mod git;
pub mod mtime;

use serde::{Deserialize, Serialize};

use crate::artifact::Artifact;
use crate::config::{UploadConfig, UploadSource};
use crate::error::Result;

/// Who uploaded an artifact and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadInfo {
    pub uploaded_by: String,
    /// Unix epoch seconds; `None` when unknown.
    pub upload_timestamp: Option<i64>,
}

/// A provider derives upload metadata for a discovered artifact.
pub trait Provider: Send + Sync {
    /// Which upload source this provider implements.
    fn source(&self) -> UploadSource;

    /// Look up upload metadata for one artifact.
    fn lookup(&self, artifact: &Artifact) -> Result<UploadInfo>;
}

/// Build the provider selected by the upload configuration.
pub fn provider_for(config: &UploadConfig) -> Box<dyn Provider> {
    match config.source {
        UploadSource::Git => Box::new(git::GitHistory::new(&config.default_uploader)),
        UploadSource::Mtime => Box::new(mtime::FileMtime::new(&config.default_uploader)),
    }
}

impl std::fmt::Display for UploadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Git => write!(f, "git"),
            Self::Mtime => write!(f, "mtime"),
        }
    }
}

/// Zero is treated the same as a missing timestamp.
pub(crate) fn nonzero(ts: i64) -> Option<i64> {
    (ts != 0).then_some(ts)
}
