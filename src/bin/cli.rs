use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wasix_index::config::{Config, UploadSource, CONFIG_FILE_NAME};
use wasix_index::error::IndexError;
use wasix_index::output::OutputFormat;
use wasix_index::GenerateOptions;

#[derive(Parser)]
#[command(
    name = "wasix-index",
    about = "Static PyPI index generator for WASIX Python builds",
    version,
    author
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct IndexArgs {
    /// Directory the config paths and source patterns are relative to
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Config file path
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Upload metadata source (git, mtime)
    #[arg(long, env = "WASIX_INDEX_UPLOAD_SOURCE")]
    upload_source: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the manifest, render the index and copy artifacts
    Build {
        #[command(flatten)]
        index: IndexArgs,

        /// Summary format (console, json)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,

        /// Write the summary to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Only discover, hash and write the manifest
    Manifest {
        #[command(flatten)]
        index: IndexArgs,
    },

    /// Render the index from an existing manifest
    Render {
        #[command(flatten)]
        index: IndexArgs,

        /// Manifest to read (defaults to the configured one)
        #[arg(long)]
        manifest: Option<PathBuf>,
    },

    /// Check the manifest against the artifacts on disk
    Verify {
        #[command(flatten)]
        index: IndexArgs,
    },

    /// List smoke-test scripts and their status
    ListTests {
        /// Directory holding the test scripts
        #[arg(default_value = "tests")]
        dir: PathBuf,

        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// Generate a starter .wasix-index.toml config file
    Init {
        /// Directory to write the config into
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Build {
            index,
            format,
            output,
        } => cmd_build(index, format, output),
        Commands::Manifest { index } => cmd_manifest(index),
        Commands::Render { index, manifest } => cmd_render(index, manifest),
        Commands::Verify { index } => cmd_verify(index),
        Commands::ListTests { dir, format } => cmd_list_tests(dir, format),
        Commands::Init { root, force } => cmd_init(root, force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

impl IndexArgs {
    fn options(&self) -> GenerateOptions {
        let upload_source = self.upload_source.as_deref().and_then(|s| {
            match s.to_lowercase().as_str() {
                "git" => Some(UploadSource::Git),
                "mtime" => Some(UploadSource::Mtime),
                _ => {
                    eprintln!("Warning: unknown upload source '{}', using config default", s);
                    None
                }
            }
        });

        GenerateOptions {
            config_path: self.config.clone(),
            upload_source,
        }
    }
}

fn cmd_build(
    index: IndexArgs,
    format_str: String,
    output_path: Option<PathBuf>,
) -> Result<i32, IndexError> {
    let format = OutputFormat::from_str_lenient(&format_str).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", format_str);
        OutputFormat::Console
    });

    let report = wasix_index::generate(&index.root, &index.options())?;
    let rendered = wasix_index::render_report(&report, format)?;

    match output_path {
        Some(out) => std::fs::write(&out, &rendered)?,
        None => print!("{}", rendered),
    }

    Ok(0)
}

fn cmd_manifest(index: IndexArgs) -> Result<i32, IndexError> {
    let entries = wasix_index::write_manifest(&index.root, &index.options())?;
    println!("Wrote {} manifest entries", entries.len());
    Ok(0)
}

fn cmd_render(index: IndexArgs, manifest: Option<PathBuf>) -> Result<i32, IndexError> {
    let (catalog, pages) =
        wasix_index::render_from_manifest(&index.root, &index.options(), manifest.as_deref())?;
    println!(
        "Rendered {} pages for {} packages ({} files)",
        pages,
        catalog.packages.len(),
        catalog.file_count()
    );
    for name in &catalog.skipped {
        eprintln!("Warning: not indexed (unrecognized name): {}", name);
    }
    Ok(0)
}

fn cmd_verify(index: IndexArgs) -> Result<i32, IndexError> {
    let report = wasix_index::verify(&index.root, &index.options())?;

    for name in &report.missing {
        println!("  missing   {}", name);
    }
    for name in &report.extra {
        println!("  extra     {}", name);
    }
    for m in &report.mismatched {
        println!("  changed   {} ({} != {})", m.filename, m.manifest, m.actual);
    }

    // Exit code: 0 = manifest matches, 1 = drift detected
    if report.is_clean() {
        println!("Manifest matches {} artifact(s)", report.checked);
        Ok(0)
    } else {
        Ok(1)
    }
}

fn cmd_list_tests(dir: PathBuf, format_str: String) -> Result<i32, IndexError> {
    let tests = wasix_index::smoke::inventory(&dir)?;

    match format_str.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&tests)?;
            println!("{}", json);
        }
        _ => {
            println!("{:<24} {:<10} FILE", "LIBRARY", "STATUS");
            println!("{}", "-".repeat(64));
            for test in &tests {
                println!(
                    "{:<24} {:<10} {}",
                    test.library,
                    test.status.to_string(),
                    test.file_name
                );
            }
        }
    }

    Ok(0)
}

fn cmd_init(root: PathBuf, force: bool) -> Result<i32, IndexError> {
    let path = root.join(CONFIG_FILE_NAME);

    if path.exists() && !force {
        eprintln!("{} already exists. Use --force to overwrite.", path.display());
        return Ok(1);
    }

    std::fs::create_dir_all(&root)?;
    std::fs::write(&path, Config::starter_toml())?;
    println!("Created {}", path.display());

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_config_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("site");

        assert_eq!(cmd_init(root.clone(), false).unwrap(), 0);
        assert!(root.join(CONFIG_FILE_NAME).is_file());
        assert_eq!(cmd_init(root.clone(), false).unwrap(), 1);
        assert_eq!(cmd_init(root.clone(), true).unwrap(), 0);

        let config = wasix_index::load_config(&root, &GenerateOptions::default()).unwrap();
        assert_eq!(config.sources, Config::default().sources);
    }
}
