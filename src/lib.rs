//! wasix-index: static package index for WASIX Python builds.
//!
//! Discovers wheels and sdists, hashes them, records who uploaded them and
//! when, writes a JSON-lines manifest and renders a PyPI-compatible static
//! index next to copies of the artifacts.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use wasix_index::{generate, GenerateOptions};
//!
//! let report = generate(Path::new("."), &GenerateOptions::default()).unwrap();
//! println!("{} artifacts, {} packages", report.artifacts, report.packages);
//! ```

pub mod artifact;
pub mod catalog;
pub mod config;
pub mod error;
pub mod manifest;
pub mod output;
pub mod parser;
pub mod provenance;
pub mod publish;
pub mod smoke;

use std::path::{Path, PathBuf};

use serde::Serialize;

use artifact::Artifact;
use catalog::Catalog;
use config::{Config, UploadSource, CONFIG_FILE_NAME};
use error::Result;
use manifest::{ManifestEntry, VerifyReport};
use output::OutputFormat;

/// Options for a generator invocation.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Path to config file (defaults to `.wasix-index.toml` in the root).
    pub config_path: Option<PathBuf>,
    /// CLI override for the upload metadata source.
    pub upload_source: Option<UploadSource>,
}

/// Summary of a complete run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport {
    pub artifacts: usize,
    pub packages: usize,
    pub pages: usize,
    pub manifest: PathBuf,
    pub output_dir: PathBuf,
    pub packages_dir: PathBuf,
    pub upload_source: UploadSource,
    /// Files hashed and copied but left out of the rendered index.
    pub skipped: Vec<String>,
}

/// Load the config for `root`, applying CLI overrides.
pub fn load_config(root: &Path, options: &GenerateOptions) -> Result<Config> {
    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(|| root.join(CONFIG_FILE_NAME));
    let mut config = Config::load(&config_path)?;

    if let Some(source) = options.upload_source {
        config.upload.source = source;
    }
    Ok(config)
}

/// Discover artifacts and build one manifest entry per artifact.
pub fn collect(root: &Path, config: &Config) -> Result<(Vec<Artifact>, Vec<ManifestEntry>)> {
    let artifacts = artifact::discover(root, config)?;
    let provider = provenance::provider_for(&config.upload);

    let mut entries = Vec::with_capacity(artifacts.len());
    for a in &artifacts {
        let hash = artifact::hash_file(&a.path)?;
        let upload = provider.lookup(a)?;
        tracing::debug!(
            file = %a.filename,
            hash = %hash,
            source = %provider.source(),
            uploaded_by = %upload.uploaded_by,
            "hashed artifact"
        );
        entries.push(ManifestEntry::new(a, hash, upload));
    }

    Ok((artifacts, entries))
}

/// Discover, hash and write the manifest, without rendering.
pub fn write_manifest(root: &Path, options: &GenerateOptions) -> Result<Vec<ManifestEntry>> {
    let config = load_config(root, options)?;
    let (_, entries) = collect(root, &config)?;
    manifest::write(&root.join(&config.manifest), &entries)?;
    Ok(entries)
}

/// Render the static index from an existing manifest.
pub fn render_from_manifest(
    root: &Path,
    options: &GenerateOptions,
    manifest_path: Option<&Path>,
) -> Result<(Catalog, usize)> {
    let config = load_config(root, options)?;
    let path = manifest_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.join(&config.manifest));
    let entries = manifest::read(&path)?;
    let catalog = Catalog::build(&entries);
    let pages = output::write_site(&root.join(&config.output_dir), &catalog, &config)?;
    Ok((catalog, pages))
}

/// Run the full pipeline: manifest, index, artifact copies.
///
/// Any failure stops the run; nothing is retried.
pub fn generate(root: &Path, options: &GenerateOptions) -> Result<GenerateReport> {
    let config = load_config(root, options)?;

    let (artifacts, entries) = collect(root, &config)?;
    let manifest_path = root.join(&config.manifest);
    manifest::write(&manifest_path, &entries)?;

    let catalog = Catalog::build(&entries);
    let output_dir = root.join(&config.output_dir);
    let pages = output::write_site(&output_dir, &catalog, &config)?;

    let packages_dir = config.packages_path(root);
    publish::copy_artifacts(&artifacts, &packages_dir)?;

    Ok(GenerateReport {
        artifacts: artifacts.len(),
        packages: catalog.packages.len(),
        pages,
        manifest: manifest_path,
        output_dir,
        packages_dir,
        upload_source: config.upload.source,
        skipped: catalog.skipped,
    })
}

/// Compare the manifest on disk with the artifacts currently discovered.
pub fn verify(root: &Path, options: &GenerateOptions) -> Result<VerifyReport> {
    let config = load_config(root, options)?;
    let artifacts = artifact::discover(root, &config)?;
    let entries = manifest::read(&root.join(&config.manifest))?;
    manifest::verify(&artifacts, &entries)
}

/// Render a run summary in the specified format.
pub fn render_report(report: &GenerateReport, format: OutputFormat) -> Result<String> {
    output::render(report, format)
}
