use chrono::{DateTime, Utc};

use super::html_escape;
use crate::catalog::Catalog;

const STYLE: &str = r#"
  :root {
    --bg: #0d1117; --fg: #c9d1d9; --border: #30363d;
    --card: #161b22; --accent: #58a6ff; --muted: #8b949e;
  }
  * { margin: 0; padding: 0; box-sizing: border-box; }
  body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
    background: var(--bg); color: var(--fg); line-height: 1.5; padding: 2rem; }
  .container { max-width: 1100px; margin: 0 auto; }
  header { display: flex; align-items: center; justify-content: space-between;
    padding: 1.5rem; background: var(--card); border: 1px solid var(--border);
    border-radius: 8px; margin-bottom: 1.5rem; }
  header h1 { font-size: 1.4rem; }
  header nav a { color: var(--accent); margin-left: 1rem; font-size: 0.9rem; }
  .summary { color: var(--muted); margin-bottom: 1rem; font-size: 0.9rem; }
  table { width: 100%; border-collapse: collapse; background: var(--card);
    border: 1px solid var(--border); border-radius: 8px; overflow: hidden; }
  th { text-align: left; padding: 0.75rem 1rem; border-bottom: 2px solid var(--border);
    font-size: 0.8rem; text-transform: uppercase; color: var(--muted); }
  td { padding: 0.6rem 1rem; border-bottom: 1px solid var(--border); font-size: 0.9rem; }
  td a { color: var(--accent); text-decoration: none; }
  .badge { display: inline-block; padding: 0.1rem 0.45rem; border-radius: 4px;
    font-size: 0.75rem; font-weight: 700; background: var(--muted); color: #000; }
  .badge.wheel { background: var(--accent); }
  footer { margin-top: 1.5rem; text-align: center; font-size: 0.8rem; color: var(--muted); }
  .empty { text-align: center; padding: 3rem; color: var(--muted); font-size: 1.2rem; }
"#;

/// Render the browsable front page: one row per project.
pub fn render_index(catalog: &Catalog, title: &str) -> String {
    let rows: String = catalog
        .packages
        .iter()
        .map(|p| {
            format!(
                r#"<tr>
  <td><a href="simple/{name}/">{display}</a></td>
  <td><code>{version}</code></td>
  <td>{files}</td>
  <td>{uploaded}</td>
  <td><a href="pypi/{name}/json">json</a></td>
</tr>
"#,
                name = html_escape(&p.name),
                display = html_escape(&p.display_name),
                version = p
                    .latest()
                    .map(|r| html_escape(&r.version))
                    .unwrap_or_else(|| "-".into()),
                files = p.file_count(),
                uploaded = display_time(p.last_upload()),
            )
        })
        .collect();

    let content = if catalog.packages.is_empty() {
        "<div class=\"empty\">No packages indexed.</div>".to_string()
    } else {
        format!(
            r#"<table>
  <thead>
    <tr><th>Package</th><th>Latest</th><th>Files</th><th>Last upload</th><th>API</th></tr>
  </thead>
  <tbody>
{rows}  </tbody>
</table>"#
        )
    };

    page(
        title,
        &format!(
            "<p class=\"summary\">{} packages, {} files</p>\n  {}",
            catalog.packages.len(),
            catalog.file_count(),
            content
        ),
    )
}

/// Render every file ordered by upload time, newest first.
pub fn render_changelog(catalog: &Catalog, title: &str) -> String {
    let rows: String = catalog
        .recent_files()
        .iter()
        .map(|(package, file)| {
            format!(
                r#"<tr>
  <td>{uploaded}</td>
  <td><a href="simple/{name}/">{display}</a></td>
  <td><code>{version}</code></td>
  <td><span class="badge {kind}">{kind}</span> {filename}</td>
  <td>{uploader}</td>
</tr>
"#,
                uploaded = display_time(file.entry.upload_timestamp),
                name = html_escape(&package.name),
                display = html_escape(&package.display_name),
                version = html_escape(&file.dist.version),
                kind = file.dist.kind,
                filename = html_escape(&file.entry.filename),
                uploader = html_escape(&file.entry.uploaded_by),
            )
        })
        .collect();

    let content = if rows.is_empty() {
        "<div class=\"empty\">No uploads yet.</div>".to_string()
    } else {
        format!(
            r#"<table>
  <thead>
    <tr><th>Uploaded</th><th>Package</th><th>Version</th><th>File</th><th>By</th></tr>
  </thead>
  <tbody>
{rows}  </tbody>
</table>"#
        )
    };

    page(&format!("{} changelog", title), &content)
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<div class="container">
  <header>
    <h1>{title}</h1>
    <nav><a href="index.html">Packages</a><a href="changelog.html">Changelog</a><a href="simple/">Simple index</a></nav>
  </header>

  {body}

  <footer>
    Generated {generated} by wasix-index {version}
  </footer>
</div>
</body>
</html>
"#,
        title = html_escape(title),
        style = STYLE,
        body = body,
        generated = Utc::now().format("%Y-%m-%d %H:%M UTC"),
        version = env!("CARGO_PKG_VERSION"),
    )
}

fn display_time(ts: Option<i64>) -> String {
    ts.and_then(|t| DateTime::from_timestamp(t, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "-".into())
}
