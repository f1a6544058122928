use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};

/// Default file name looked up in the index root.
pub const CONFIG_FILE_NAME: &str = ".wasix-index.toml";

const WHEEL_CACHE: &str = "python-wasix-binaries/wheels";

/// Projects taken from the vendored wheel cache rather than local builds.
const CACHED_PROJECTS: &[&str] = &[
    "aiohttp",
    "cryptography",
    "ddtrace",
    "httptools",
    "jiter",
    "orjson",
    "peewee",
    "primp",
    "psycopg",
    "pydantic_core",
    "pynacl",
    "pyyaml",
    "rpds_py",
    "tiktoken",
    "tokenizers",
    "tornado",
    "watchdog",
    "watchfiles",
];

/// Top-level configuration from `.wasix-index.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Glob patterns, relative to the index root, evaluated in order.
    pub sources: Vec<String>,
    /// Root-relative path prefixes that are left out of the index.
    pub exclude_prefixes: Vec<String>,
    /// Where the JSON-lines manifest is written.
    pub manifest: PathBuf,
    /// Directory receiving the rendered index.
    pub output_dir: PathBuf,
    /// Artifact copy directory, relative to `output_dir`.
    pub packages_dir: PathBuf,
    /// Link prefix used by project pages to reach the artifacts.
    pub packages_url: String,
    pub title: String,
    pub upload: UploadConfig,
}

/// Where upload metadata comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadSource {
    /// Last commit touching the file.
    Git,
    /// File modification time.
    Mtime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    pub source: UploadSource,
    pub default_uploader: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            source: UploadSource::Git,
            default_uploader: "wasmer".into(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut sources = vec!["artifacts/*.whl".to_string(), "artifacts/*.tar.gz".to_string()];
        sources.extend(
            CACHED_PROJECTS
                .iter()
                .map(|project| format!("{WHEEL_CACHE}/{project}*.whl")),
        );

        Self {
            sources,
            exclude_prefixes: vec!["artifacts/psycopg".into()],
            manifest: PathBuf::from("package-list.jsonl"),
            output_dir: PathBuf::from("dist"),
            packages_dir: PathBuf::from("packages"),
            packages_url: "../../packages/".into(),
            title: "WASIX Python native wheels".into(),
            upload: UploadConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would produce an unusable index.
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(IndexError::Config(
                "at least one source pattern is required".into(),
            ));
        }
        if self.title.trim().is_empty() {
            return Err(IndexError::Config("title must not be empty".into()));
        }
        if self.packages_url.is_empty() {
            return Err(IndexError::Config("packages_url must not be empty".into()));
        }
        if self.packages_url.contains("://") {
            url::Url::parse(&self.packages_url).map_err(|e| {
                IndexError::Config(format!("invalid packages_url '{}': {}", self.packages_url, e))
            })?;
        }
        if self.upload.default_uploader.is_empty() {
            return Err(IndexError::Config(
                "upload.default_uploader must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Absolute location of the artifact copies.
    pub fn packages_path(&self, root: &Path) -> PathBuf {
        root.join(&self.output_dir).join(&self.packages_dir)
    }

    /// Generate a starter config file listing the default source patterns.
    pub fn starter_toml() -> String {
        let sources: String = Self::default()
            .sources
            .iter()
            .map(|p| format!("    \"{}\",\n", p))
            .collect();

        format!(
            r#"# wasix-index configuration
# Paths are relative to the directory holding this file.

# Glob patterns for wheels and sdists, evaluated in order.
sources = [
{sources}]

# Root-relative path prefixes left out of the index.
exclude_prefixes = ["artifacts/psycopg"]

manifest = "package-list.jsonl"
output_dir = "dist"
packages_dir = "packages"
packages_url = "../../packages/"
title = "WASIX Python native wheels"

[upload]
# "git" uses the last commit touching each file, "mtime" the file timestamp.
source = "git"
default_uploader = "wasmer"
"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_local_and_cached_wheels() {
        let config = Config::default();
        assert_eq!(config.sources[0], "artifacts/*.whl");
        assert_eq!(config.sources[1], "artifacts/*.tar.gz");
        assert!(config
            .sources
            .contains(&"python-wasix-binaries/wheels/watchfiles*.whl".to_string()));
        assert_eq!(config.sources.len(), 2 + CACHED_PROJECTS.len());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn starter_toml_parses_and_validates() {
        let config: Config = toml::from_str(&Config::starter_toml()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.upload.source, UploadSource::Git);
        assert_eq!(config.sources, Config::default().sources);
        assert_eq!(config.exclude_prefixes, Config::default().exclude_prefixes);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str("title = \"Nightly\"\n[upload]\nsource = \"mtime\"\n").unwrap();
        assert_eq!(config.title, "Nightly");
        assert_eq!(config.upload.source, UploadSource::Mtime);
        assert_eq!(config.upload.default_uploader, "wasmer");
        assert_eq!(config.output_dir, PathBuf::from("dist"));
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(toml::from_str::<Config>("titel = \"typo\"\n").is_err());
    }

    #[test]
    fn empty_sources_rejected() {
        let config = Config {
            sources: vec![],
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(IndexError::Config(_))));
    }

    #[test]
    fn absolute_packages_url_must_parse() {
        let mut config = Config {
            packages_url: "https://cdn.example.com/wheels/".into(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
        config.packages_url = "https://exa mple.com/".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config.packages_url, "../../packages/");
    }
}
