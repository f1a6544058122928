//! Artifact discovery and hashing.
//!
//! Artifacts are treated as opaque blobs: the only things read from them are
//! their bytes (for the digest) and their filesystem metadata.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};

use glob::MatchOptions;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::error::{IndexError, Result};

/// Distribution format, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Wheel,
    Sdist,
}

impl ArtifactKind {
    pub fn from_filename(filename: &str) -> Option<Self> {
        if filename.ends_with(".whl") {
            Some(Self::Wheel)
        } else if filename.ends_with(".tar.gz") {
            Some(Self::Sdist)
        } else {
            None
        }
    }

    /// Value of `packagetype` in the PyPI JSON API.
    pub fn package_type(&self) -> &'static str {
        match self {
            Self::Wheel => "bdist_wheel",
            Self::Sdist => "sdist",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wheel => write!(f, "wheel"),
            Self::Sdist => write!(f, "sdist"),
        }
    }
}

/// A discovered wheel or sdist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Location on disk.
    pub path: PathBuf,
    /// Path relative to the index root, `/`-separated.
    pub relative: String,
    /// Basename, used as the manifest key.
    pub filename: String,
}

impl Artifact {
    /// Directory holding the artifact.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Wildcards never match a leading `.`, so hidden partial uploads are skipped.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: true,
};

/// Expand every configured pattern under `root`, in order, and drop
/// excluded prefixes. Duplicates are kept.
pub fn discover(root: &Path, config: &Config) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();

    let base = glob::Pattern::escape(&root.to_string_lossy());
    let base = base.trim_end_matches('/');

    for pattern in &config.sources {
        let full = format!("{}/{}", base, pattern);
        let paths = glob::glob_with(&full, MATCH_OPTIONS).map_err(|e| IndexError::Pattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;

        let mut matched = 0usize;
        for entry in paths {
            let path = entry?;
            if !path.is_file() {
                continue;
            }
            let relative = relative_path(root, &path);
            if is_excluded(&relative, &config.exclude_prefixes) {
                tracing::debug!(path = %relative, "excluded by prefix");
                continue;
            }
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if ArtifactKind::from_filename(&filename).is_none() {
                tracing::warn!(path = %relative, "matched file is neither a wheel nor an sdist");
            }
            artifacts.push(Artifact {
                path,
                relative,
                filename,
            });
            matched += 1;
        }

        if matched == 0 {
            tracing::debug!(pattern = %pattern, "pattern matched no artifacts");
        }
    }

    tracing::info!(count = artifacts.len(), "discovered artifacts");
    Ok(artifacts)
}

/// Hash a file's full contents, returning `sha256=<hex>`.
pub fn hash_file(path: &Path) -> Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(format_digest(&hasher.finalize()))
}

/// Hash an in-memory buffer the same way `hash_file` does.
pub fn hash_bytes(content: &[u8]) -> String {
    format_digest(&Sha256::digest(content))
}

fn format_digest(digest: &[u8]) -> String {
    format!("sha256={}", hex::encode(digest))
}

fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_excluded(relative: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|p| relative.starts_with(p.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::fs;

    fn touch(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn empty_file_digest() {
        assert_eq!(
            hash_bytes(b""),
            "sha256=e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn hash_file_matches_known_digest() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "abc.whl", b"abc");
        assert_eq!(
            hash_file(&dir.path().join("abc.whl")).unwrap(),
            "sha256=ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn discovers_in_pattern_order_and_excludes_prefixes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "artifacts/zstandard-0.23.0-cp313-cp313-wasix_wasm32.whl", b"z");
        touch(root, "artifacts/psycopg-3.2.3-py3-none-any.whl", b"p");
        touch(root, "artifacts/msgpack-1.1.0.tar.gz", b"m");
        touch(root, "artifacts/notes.txt", b"n");
        touch(root, "cache/psycopg-3.2.4-cp313-cp313-wasix_wasm32.whl", b"c");

        let config = Config {
            sources: vec![
                "artifacts/*.whl".into(),
                "artifacts/*.tar.gz".into(),
                "cache/psycopg*.whl".into(),
            ],
            ..Config::default()
        };

        let found = discover(root, &config).unwrap();
        let rel: Vec<&str> = found.iter().map(|a| a.relative.as_str()).collect();
        assert_eq!(
            rel,
            vec![
                "artifacts/zstandard-0.23.0-cp313-cp313-wasix_wasm32.whl",
                "artifacts/msgpack-1.1.0.tar.gz",
                "cache/psycopg-3.2.4-cp313-cp313-wasix_wasm32.whl",
            ]
        );
        assert_eq!(found[1].filename, "msgpack-1.1.0.tar.gz");
    }

    #[test]
    fn overlapping_patterns_keep_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "artifacts/six-1.16.0-py2.py3-none-any.whl", b"six");
        let config = Config {
            sources: vec!["artifacts/*.whl".into(), "artifacts/six*".into()],
            exclude_prefixes: vec![],
            ..Config::default()
        };
        assert_eq!(discover(dir.path(), &config).unwrap().len(), 2);
    }

    #[test]
    fn wildcards_skip_dotfiles() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "artifacts/.partial.whl", b"tmp");
        touch(dir.path(), "artifacts/idna-3.10-py3-none-any.whl", b"idna");
        let config = Config {
            sources: vec!["artifacts/*.whl".into(), "artifacts/.partial*".into()],
            ..Config::default()
        };
        let rel: Vec<String> = discover(dir.path(), &config)
            .unwrap()
            .into_iter()
            .map(|a| a.relative)
            .collect();
        assert_eq!(
            rel,
            vec![
                "artifacts/idna-3.10-py3-none-any.whl".to_string(),
                "artifacts/.partial.whl".to_string(),
            ]
        );
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            sources: vec!["artifacts/[.whl".into()],
            ..Config::default()
        };
        assert!(matches!(
            discover(dir.path(), &config),
            Err(IndexError::Pattern { .. })
        ));
    }

    #[test]
    fn kind_from_extension() {
        assert_eq!(ArtifactKind::from_filename("a-1-py3-none-any.whl"), Some(ArtifactKind::Wheel));
        assert_eq!(ArtifactKind::from_filename("a-1.tar.gz"), Some(ArtifactKind::Sdist));
        assert_eq!(ArtifactKind::from_filename("a-1.zip"), None);
    }

    proptest! {
        #[test]
        fn file_and_buffer_digests_agree(content in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("blob.whl");
            fs::write(&path, &content).unwrap();
            let digest = hash_file(&path).unwrap();
            prop_assert_eq!(&digest, &hash_bytes(&content));
            prop_assert_eq!(digest.len(), "sha256=".len() + 64);
        }
    }
}
