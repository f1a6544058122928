//! Inventory of the per-library smoke-test scripts.
//!
//! Each script exercises one third-party library on the WASIX interpreter.
//! Its status is encoded in the file name:
//!
//! - `zstandard-test.py`: active
//! - `contourpy-test.skip.py`: skipped
//! - `lxml-test-broken.py`, `pyarrow-test-broken.skip.py`: known broken
//! - `sdl-test.c`: native (non-Python) test

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{IndexError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Active,
    Skipped,
    Broken,
    Native,
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Skipped => write!(f, "skipped"),
            Self::Broken => write!(f, "broken"),
            Self::Native => write!(f, "native"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmokeTest {
    pub path: PathBuf,
    pub file_name: String,
    /// Library under test, derived from the file name.
    pub library: String,
    pub status: TestStatus,
}

/// Classify a script by its file name.
pub fn classify(file_name: &str) -> (String, TestStatus) {
    let Some(mut stem) = file_name.strip_suffix(".py") else {
        let stem = file_name
            .rsplit_once('.')
            .map(|(s, _)| s)
            .unwrap_or(file_name);
        return (library_name(stem), TestStatus::Native);
    };

    let skipped = match stem.strip_suffix(".skip") {
        Some(s) => {
            stem = s;
            true
        }
        None => false,
    };
    let broken = match stem.strip_suffix("-broken") {
        Some(s) => {
            stem = s;
            true
        }
        None => false,
    };

    let status = if broken {
        TestStatus::Broken
    } else if skipped {
        TestStatus::Skipped
    } else {
        TestStatus::Active
    };
    (library_name(stem), status)
}

fn library_name(stem: &str) -> String {
    stem.strip_suffix("-test").unwrap_or(stem).to_string()
}

/// List the scripts directly inside `dir`, sorted by file name.
pub fn inventory(dir: &Path) -> Result<Vec<SmokeTest>> {
    let mut tests = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| match e.into_io_error() {
            Some(io) => io.into(),
            None => IndexError::Internal("filesystem loop while listing tests".into()),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.starts_with('.') {
            continue;
        }
        let (library, status) = classify(&file_name);
        tests.push(SmokeTest {
            path: entry.path().to_path_buf(),
            file_name,
            library,
            status,
        });
    }

    tracing::debug!(dir = %dir.display(), count = tests.len(), "listed smoke tests");
    Ok(tests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classifies_naming_conventions() {
        assert_eq!(classify("zstandard-test.py"), ("zstandard".into(), TestStatus::Active));
        assert_eq!(classify("contourpy-test.skip.py"), ("contourpy".into(), TestStatus::Skipped));
        assert_eq!(classify("lxml-test-broken.py"), ("lxml".into(), TestStatus::Broken));
        assert_eq!(
            classify("pyarrow-test-broken.skip.py"),
            ("pyarrow".into(), TestStatus::Broken)
        );
        assert_eq!(
            classify("typing-inspection.py"),
            ("typing-inspection".into(), TestStatus::Active)
        );
        assert_eq!(classify("sdl-test.c"), ("sdl".into(), TestStatus::Native));
    }

    #[test]
    fn inventory_sorted_and_skips_hidden_and_dirs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["uvloop-test.py", "aiohttp-test-broken.py", ".hidden.py", "sdl-test.c"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("__pycache__")).unwrap();

        let tests = inventory(dir.path()).unwrap();
        let names: Vec<(&str, TestStatus)> = tests
            .iter()
            .map(|t| (t.library.as_str(), t.status))
            .collect();
        assert_eq!(
            names,
            vec![
                ("aiohttp", TestStatus::Broken),
                ("sdl", TestStatus::Native),
                ("uvloop", TestStatus::Active),
            ]
        );
    }
}
