//! The JSON-lines package list consumed by the index renderer.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::artifact::{self, Artifact};
use crate::error::{IndexError, Result};
use crate::provenance::UploadInfo;

/// One line of `package-list.jsonl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub filename: String,
    /// `sha256=<hex>`.
    pub hash: String,
    pub uploaded_by: String,
    pub upload_timestamp: Option<i64>,
}

impl ManifestEntry {
    pub fn new(artifact: &Artifact, hash: String, upload: UploadInfo) -> Self {
        Self {
            filename: artifact.filename.clone(),
            hash,
            uploaded_by: upload.uploaded_by,
            upload_timestamp: upload.upload_timestamp,
        }
    }

    /// Hex digest without the `sha256=` prefix.
    pub fn sha256(&self) -> Option<&str> {
        self.hash.strip_prefix("sha256=")
    }
}

/// Write entries, one JSON object per line, replacing any existing file.
pub fn write(path: &Path, entries: &[ManifestEntry]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(path)?);
    for entry in entries {
        serde_json::to_writer(&mut out, entry)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    tracing::info!(path = %path.display(), entries = entries.len(), "wrote manifest");
    Ok(())
}

/// Read a manifest back. Blank lines are skipped, unknown keys ignored.
pub fn read(path: &Path) -> Result<Vec<ManifestEntry>> {
    let reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: ManifestEntry =
            serde_json::from_str(&line).map_err(|e| IndexError::Manifest {
                file: path.display().to_string(),
                line: idx + 1,
                message: e.to_string(),
            })?;
        entries.push(entry);
    }

    Ok(entries)
}

/// A manifest line whose hash no longer matches the file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashMismatch {
    pub filename: String,
    pub manifest: String,
    pub actual: String,
}

/// Differences between a manifest and the artifacts currently on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub checked: usize,
    /// Discovered files with fewer manifest lines than copies on disk.
    pub missing: Vec<String>,
    /// Manifest lines with no discovered file.
    pub extra: Vec<String>,
    pub mismatched: Vec<HashMismatch>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty() && self.mismatched.is_empty()
    }
}

/// Check that every artifact has exactly one manifest line per discovered
/// copy, carrying the digest of its current content.
pub fn verify(artifacts: &[Artifact], entries: &[ManifestEntry]) -> Result<VerifyReport> {
    let mut on_disk: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for a in artifacts {
        on_disk
            .entry(a.filename.as_str())
            .or_default()
            .push(artifact::hash_file(&a.path)?);
    }

    let mut listed: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for e in entries {
        listed
            .entry(e.filename.as_str())
            .or_default()
            .push(e.hash.as_str());
    }

    let mut report = VerifyReport {
        checked: artifacts.len(),
        ..Default::default()
    };

    for (filename, hashes) in &on_disk {
        let Some(lines) = listed.get(filename) else {
            report.missing.push(filename.to_string());
            continue;
        };
        if lines.len() < hashes.len() {
            report.missing.push(filename.to_string());
        } else if lines.len() > hashes.len() {
            report.extra.push(filename.to_string());
        }
        for line_hash in lines {
            if !hashes.iter().any(|h| h == line_hash) {
                report.mismatched.push(HashMismatch {
                    filename: filename.to_string(),
                    manifest: line_hash.to_string(),
                    actual: hashes[0].clone(),
                });
            }
        }
    }

    report.extra.extend(
        listed
            .keys()
            .filter(|name| !on_disk.contains_key(*name))
            .map(|name| name.to_string()),
    );

    Ok(report)
}
