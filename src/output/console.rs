use crate::GenerateReport;

/// Render a run summary as plain console text.
pub fn render(report: &GenerateReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n  Indexed {} artifact(s) into {} package(s)\n\n",
        report.artifacts, report.packages
    ));
    output.push_str(&format!("  manifest:  {}\n", report.manifest.display()));
    output.push_str(&format!("  index:     {}\n", report.output_dir.display()));
    output.push_str(&format!("  packages:  {}\n", report.packages_dir.display()));
    output.push_str(&format!("  uploads:   {}\n", report.upload_source));
    output.push_str(&format!("  pages:     {}\n", report.pages));

    if !report.skipped.is_empty() {
        output.push_str(&format!(
            "\n  {} file(s) not indexed (unrecognized name):\n",
            report.skipped.len()
        ));
        for name in &report.skipped {
            output.push_str(&format!("           {}\n", name));
        }
    }
    output.push('\n');

    output
}
