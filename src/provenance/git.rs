use std::path::Path;
use std::process::Command;

use super::{nonzero, Provider, UploadInfo};
use crate::artifact::Artifact;
use crate::config::UploadSource;
use crate::error::{IndexError, Result};

/// Upload metadata from the last commit touching the artifact.
///
/// Runs `git log -1` from the artifact's directory. A failing git command
/// (untracked file, not a repository) leaves stdout empty and the defaults
/// apply; only a missing `git` binary is an error.
pub struct GitHistory {
    default_uploader: String,
}

impl GitHistory {
    pub fn new(default_uploader: &str) -> Self {
        Self {
            default_uploader: default_uploader.to_string(),
        }
    }

    fn log_field(&self, dir: &Path, format: &str, filename: &str) -> Result<String> {
        let pretty = format!("--pretty={}", format);
        let output = Command::new("git")
            .args(["log", "-1", pretty.as_str(), "--", filename])
            .current_dir(dir)
            .output()
            .map_err(|source| IndexError::Git {
                dir: dir.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            tracing::debug!(
                dir = %dir.display(),
                file = filename,
                status = %output.status,
                "git log failed, falling back to defaults"
            );
        }

        Ok(first_line(&String::from_utf8_lossy(&output.stdout)).to_string())
    }
}

impl Provider for GitHistory {
    fn source(&self) -> UploadSource {
        UploadSource::Git
    }

    fn lookup(&self, artifact: &Artifact) -> Result<UploadInfo> {
        let dir = artifact.dir();
        let timestamp = self.log_field(dir, "%at", &artifact.filename)?;
        let author = self.log_field(dir, "%aN", &artifact.filename)?;
        Ok(parse_log(&timestamp, &author, &self.default_uploader))
    }
}

fn first_line(stdout: &str) -> &str {
    stdout.split('\n').next().unwrap_or("").trim_end_matches('\r')
}

/// Turn the `%at` / `%aN` lines into upload metadata.
fn parse_log(timestamp: &str, author: &str, default_uploader: &str) -> UploadInfo {
    let upload_timestamp = timestamp.trim().parse::<i64>().ok().and_then(nonzero);
    let uploaded_by = if author.is_empty() {
        default_uploader.to_string()
    } else {
        author.to_string()
    };
    UploadInfo {
        uploaded_by,
        upload_timestamp,
    }
}
