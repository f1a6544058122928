use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactKind;

static WHEEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<name>[^\s-]+?)-(?P<version>[^\s-]+?)(?:-(?P<build>\d[^\s-]*))?-(?P<python>[^\s-]+?)-(?P<abi>[^\s-]+?)-(?P<platform>[^\s-]+?)\.whl$",
    )
    .unwrap()
});

static SDIST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<name>.+?)-(?P<version>\d[^-\s]*)\.tar\.gz$").unwrap());

static SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-_.]+").unwrap());

/// Name, version and tags extracted from a wheel or sdist file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistFilename {
    /// Project name as spelled in the file name.
    pub name: String,
    pub version: String,
    pub kind: ArtifactKind,
    /// Wheel compatibility tags: `python-abi-platform`.
    pub tags: Option<String>,
    pub build: Option<String>,
}

impl DistFilename {
    /// PEP 503 form of the project name.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

/// Parse a wheel (`name-version[-build]-python-abi-platform.whl`) or sdist
/// (`name-version.tar.gz`) file name.
pub fn parse(filename: &str) -> Option<DistFilename> {
    if let Some(caps) = WHEEL_RE.captures(filename) {
        return Some(DistFilename {
            name: caps["name"].to_string(),
            version: caps["version"].to_string(),
            kind: ArtifactKind::Wheel,
            tags: Some(format!(
                "{}-{}-{}",
                &caps["python"], &caps["abi"], &caps["platform"]
            )),
            build: caps.name("build").map(|m| m.as_str().to_string()),
        });
    }

    SDIST_RE.captures(filename).map(|caps| DistFilename {
        name: caps["name"].to_string(),
        version: caps["version"].to_string(),
        kind: ArtifactKind::Sdist,
        tags: None,
        build: None,
    })
}

/// Normalize a project name: lowercase, runs of `-`, `_` and `.` become `-`.
pub fn normalize_name(name: &str) -> String {
    SEPARATOR_RE.replace_all(name, "-").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_wasix_wheel() {
        let parsed = parse("cryptography-43.0.1-cp313-abi3-wasix_wasm32.whl").unwrap();
        assert_eq!(parsed.name, "cryptography");
        assert_eq!(parsed.version, "43.0.1");
        assert_eq!(parsed.kind, ArtifactKind::Wheel);
        assert_eq!(parsed.tags.as_deref(), Some("cp313-abi3-wasix_wasm32"));
        assert_eq!(parsed.build, None);
    }

    #[test]
    fn parses_wheel_with_build_tag() {
        let parsed = parse("pydantic_core-2.27.2-1-cp313-cp313-wasix_wasm32.whl").unwrap();
        assert_eq!(parsed.name, "pydantic_core");
        assert_eq!(parsed.version, "2.27.2");
        assert_eq!(parsed.build.as_deref(), Some("1"));
        assert_eq!(parsed.normalized_name(), "pydantic-core");
    }

    #[test]
    fn parses_sdist_with_dashed_name() {
        let parsed = parse("python-crc32c-1.7.tar.gz").unwrap();
        assert_eq!(parsed.name, "python-crc32c");
        assert_eq!(parsed.version, "1.7");
        assert_eq!(parsed.kind, ArtifactKind::Sdist);
        assert_eq!(parsed.tags, None);
    }

    #[test]
    fn rejects_other_files() {
        assert!(parse("README.md").is_none());
        assert!(parse("broken.whl").is_none());
        assert!(parse("noversion.tar.gz").is_none());
    }

    #[test]
    fn normalizes_separators() {
        assert_eq!(normalize_name("Pydantic_Core"), "pydantic-core");
        assert_eq!(normalize_name("zope.interface"), "zope-interface");
        assert_eq!(normalize_name("a-_.b"), "a-b");
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(name in "[A-Za-z0-9][A-Za-z0-9._-]{0,30}") {
            let once = normalize_name(&name);
            prop_assert_eq!(normalize_name(&once), once.clone());
            prop_assert!(!once.contains('_') && !once.contains('.'));
        }
    }
}
