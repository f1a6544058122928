use serde_json::{json, Map, Value};

use super::{file_url, iso_timestamp};
use crate::catalog::{DistFile, Package};
use crate::error::Result;

/// Render `pypi/<name>/json`, a subset of the PyPI JSON API.
///
/// `info.version` is the newest release; `urls` lists its files.
pub fn render(package: &Package, packages_url: &str) -> Result<String> {
    let mut releases = Map::new();
    for release in &package.releases {
        let files: Vec<Value> = release
            .files
            .iter()
            .map(|f| file_json(f, packages_url))
            .collect();
        releases.insert(release.version.clone(), Value::Array(files));
    }

    let latest = package.latest();
    let urls: Vec<Value> = latest
        .map(|r| r.files.iter().map(|f| file_json(f, packages_url)).collect())
        .unwrap_or_default();

    let doc = json!({
        "info": {
            "name": package.display_name,
            "normalized_name": package.name,
            "version": latest.map(|r| r.version.as_str()),
        },
        "releases": releases,
        "urls": urls,
    });

    let output = serde_json::to_string_pretty(&doc)?;
    Ok(output)
}

fn file_json(file: &DistFile, packages_url: &str) -> Value {
    json!({
        "filename": file.entry.filename,
        "url": file_url(packages_url, &file.entry.filename, &file.entry.hash),
        "digests": {
            "sha256": file.entry.sha256(),
        },
        "packagetype": file.dist.kind.package_type(),
        "upload_time": file.entry.upload_timestamp.and_then(iso_timestamp),
        "uploaded_by": file.entry.uploaded_by,
    })
}
