//! Manifest entries grouped by project and release, ready to render.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::manifest::ManifestEntry;
use crate::parser::{self, DistFilename};

static RELEASE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)*)(.*)$").unwrap());

/// All projects in the index, sorted by normalized name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    pub packages: Vec<Package>,
    /// Manifest filenames that are not recognizable wheels or sdists.
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Package {
    /// PEP 503 normalized name, used in URLs.
    pub name: String,
    /// Spelling taken from the newest file name.
    pub display_name: String,
    /// Oldest first.
    pub releases: Vec<Release>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Release {
    pub version: String,
    /// Sorted by filename.
    pub files: Vec<DistFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistFile {
    pub entry: ManifestEntry,
    pub dist: DistFilename,
}

impl Catalog {
    /// Group entries by project. When a filename repeats, the last entry wins.
    pub fn build(entries: &[ManifestEntry]) -> Self {
        let mut unique: Vec<&ManifestEntry> = Vec::with_capacity(entries.len());
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for entry in entries {
            match seen.get(entry.filename.as_str()) {
                Some(&idx) => {
                    tracing::warn!(file = %entry.filename, "duplicate filename, keeping last entry");
                    unique[idx] = entry;
                }
                None => {
                    seen.insert(entry.filename.as_str(), unique.len());
                    unique.push(entry);
                }
            }
        }

        let mut skipped = Vec::new();
        let mut by_project: BTreeMap<String, Vec<DistFile>> = BTreeMap::new();
        for entry in unique {
            match parser::parse(&entry.filename) {
                Some(dist) => by_project
                    .entry(dist.normalized_name())
                    .or_default()
                    .push(DistFile {
                        entry: entry.clone(),
                        dist,
                    }),
                None => {
                    tracing::warn!(file = %entry.filename, "unrecognized distribution filename, not indexed");
                    skipped.push(entry.filename.clone());
                }
            }
        }

        let packages = by_project
            .into_iter()
            .map(|(name, files)| Package::from_files(name, files))
            .collect();

        Self { packages, skipped }
    }

    pub fn file_count(&self) -> usize {
        self.packages.iter().map(Package::file_count).sum()
    }

    /// Every indexed file, newest upload first; unknown timestamps last.
    pub fn recent_files(&self) -> Vec<(&Package, &DistFile)> {
        let mut files: Vec<(&Package, &DistFile)> = self
            .packages
            .iter()
            .flat_map(|p| p.files().map(move |f| (p, f)))
            .collect();
        files.sort_by(|(_, a), (_, b)| {
            match (a.entry.upload_timestamp, b.entry.upload_timestamp) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
            .then_with(|| a.entry.filename.cmp(&b.entry.filename))
        });
        files
    }
}

impl Package {
    fn from_files(name: String, files: Vec<DistFile>) -> Self {
        let mut by_version: BTreeMap<String, Vec<DistFile>> = BTreeMap::new();
        for f in files {
            by_version.entry(f.dist.version.clone()).or_default().push(f);
        }

        let mut releases: Vec<Release> = by_version
            .into_iter()
            .map(|(version, mut files)| {
                files.sort_by(|a, b| a.entry.filename.cmp(&b.entry.filename));
                Release { version, files }
            })
            .collect();
        releases.sort_by(|a, b| compare_versions(&a.version, &b.version));

        let display_name = releases
            .last()
            .and_then(|r| r.files.first())
            .map(|f| f.dist.name.clone())
            .unwrap_or_else(|| name.clone());

        Self {
            name,
            display_name,
            releases,
        }
    }

    pub fn latest(&self) -> Option<&Release> {
        self.releases.last()
    }

    pub fn files(&self) -> impl Iterator<Item = &DistFile> {
        self.releases.iter().flat_map(|r| r.files.iter())
    }

    pub fn file_count(&self) -> usize {
        self.releases.iter().map(|r| r.files.len()).sum()
    }

    pub fn last_upload(&self) -> Option<i64> {
        self.files().filter_map(|f| f.entry.upload_timestamp).max()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    Dev,
    Pre,
    Final,
    Local,
    Post,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct VersionKey {
    epoch: u64,
    release: Vec<u64>,
    phase: Phase,
    rest: String,
}

fn version_key(version: &str) -> VersionKey {
    let v = version.trim().trim_start_matches(['v', 'V']);
    let (epoch, v) = v
        .split_once('!')
        .and_then(|(e, r)| e.parse::<u64>().ok().map(|e| (e, r)))
        .unwrap_or((0, v));

    let (mut release, rest) = match RELEASE_RE.captures(v) {
        Some(caps) => (
            caps[1]
                .split('.')
                .map(|s| s.parse::<u64>().unwrap_or(u64::MAX))
                .collect::<Vec<_>>(),
            caps[2].to_lowercase(),
        ),
        None => (Vec::new(), v.to_lowercase()),
    };
    while release.len() > 1 && release.last() == Some(&0) {
        release.pop();
    }

    let rest = rest.trim_start_matches(['.', '-', '_']).to_string();
    let phase = if rest.is_empty() {
        Phase::Final
    } else if rest.starts_with('+') {
        Phase::Local
    } else if rest.starts_with("dev") {
        Phase::Dev
    } else if rest.starts_with("post") || rest.starts_with("rev") {
        Phase::Post
    } else {
        Phase::Pre
    };

    VersionKey {
        epoch,
        release,
        phase,
        rest,
    }
}

/// Order versions by epoch, numeric release segments, then pre/final/post.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    version_key(a)
        .cmp(&version_key(b))
        .then_with(|| a.cmp(b))
}
