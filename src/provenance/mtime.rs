use std::time::UNIX_EPOCH;

use super::{nonzero, Provider, UploadInfo};
use crate::artifact::Artifact;
use crate::config::UploadSource;
use crate::error::Result;

/// Upload metadata from the file's modification time and a fixed uploader.
pub struct FileMtime {
    uploader: String,
}

impl FileMtime {
    pub fn new(uploader: &str) -> Self {
        Self {
            uploader: uploader.to_string(),
        }
    }
}

impl Provider for FileMtime {
    fn source(&self) -> UploadSource {
        UploadSource::Mtime
    }

    fn lookup(&self, artifact: &Artifact) -> Result<UploadInfo> {
        let modified = std::fs::metadata(&artifact.path)?.modified()?;
        // Pre-epoch mtimes are clamped to unknown.
        let upload_timestamp = modified
            .duration_since(UNIX_EPOCH)
            .ok()
            .and_then(|d| i64::try_from(d.as_secs()).ok())
            .and_then(nonzero);

        Ok(UploadInfo {
            uploaded_by: self.uploader.clone(),
            upload_timestamp,
        })
    }
}
