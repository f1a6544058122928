pub mod console;
pub mod html;
pub mod json;
pub mod pypi_json;
pub mod simple;

use std::path::Path;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{IndexError, Result};
use crate::GenerateReport;

/// Summary format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
}

impl OutputFormat {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Some(Self::Console),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Render a run summary into the specified format.
pub fn render(report: &GenerateReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render(report)),
        OutputFormat::Json => json::render(report),
    }
}

/// Write the static index for `catalog` into `out_dir`. Returns the number
/// of pages written.
pub fn write_site(out_dir: &Path, catalog: &Catalog, config: &Config) -> Result<usize> {
    let mut pages = 0usize;

    write_page(&out_dir.join("index.html"), &html::render_index(catalog, &config.title))?;
    write_page(
        &out_dir.join("changelog.html"),
        &html::render_changelog(catalog, &config.title),
    )?;
    write_page(
        &out_dir.join("simple").join("index.html"),
        &simple::render_root(catalog),
    )?;
    pages += 3;

    for package in &catalog.packages {
        write_page(
            &out_dir.join("simple").join(&package.name).join("index.html"),
            &simple::render_project(package, &config.packages_url),
        )?;
        write_page(
            &out_dir.join("pypi").join(&package.name).join("json"),
            &pypi_json::render(package, &config.packages_url)?,
        )?;
        pages += 2;
    }

    tracing::info!(
        dir = %out_dir.display(),
        pages,
        packages = catalog.packages.len(),
        "rendered index"
    );
    Ok(pages)
}

fn write_page(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            IndexError::Output(format!("cannot create {}: {}", parent.display(), e))
        })?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Link to an artifact, carrying its digest as a URL fragment.
pub(crate) fn file_url(packages_url: &str, filename: &str, hash: &str) -> String {
    match hash.split_once('=') {
        Some((alg, digest)) => format!("{}{}#{}={}", packages_url, filename, alg, digest),
        None => format!("{}{}", packages_url, filename),
    }
}

/// Epoch seconds as `YYYY-MM-DDTHH:MM:SSZ`.
pub(crate) fn iso_timestamp(ts: i64) -> Option<String> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
