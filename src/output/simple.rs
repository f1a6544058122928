//! PEP 503 "simple" repository pages.

use super::{file_url, html_escape};
use crate::catalog::{Catalog, Package};

/// `simple/index.html`: one link per project.
pub fn render_root(catalog: &Catalog) -> String {
    let links: String = catalog
        .packages
        .iter()
        .map(|p| {
            format!(
                "    <a href=\"{name}/\">{display}</a><br>\n",
                name = html_escape(&p.name),
                display = html_escape(&p.display_name),
            )
        })
        .collect();

    format!(
        "<!DOCTYPE html>\n<html>\n  <head>\n    <meta name=\"pypi:repository-version\" content=\"1.0\">\n    <title>Simple index</title>\n  </head>\n  <body>\n{links}  </body>\n</html>\n"
    )
}

/// `simple/<name>/index.html`: one link per file, newest release first.
pub fn render_project(package: &Package, packages_url: &str) -> String {
    let links: String = package
        .releases
        .iter()
        .rev()
        .flat_map(|r| r.files.iter())
        .map(|f| {
            format!(
                "    <a href=\"{href}\">{filename}</a><br>\n",
                href = html_escape(&file_url(packages_url, &f.entry.filename, &f.entry.hash)),
                filename = html_escape(&f.entry.filename),
            )
        })
        .collect();

    format!(
        "<!DOCTYPE html>\n<html>\n  <head>\n    <meta name=\"pypi:repository-version\" content=\"1.0\">\n    <title>Links for {name}</title>\n  </head>\n  <body>\n    <h1>Links for {name}</h1>\n{links}  </body>\n</html>\n",
        name = html_escape(&package.display_name),
    )
}
