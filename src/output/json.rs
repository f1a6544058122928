use crate::error::Result;
use crate::GenerateReport;

/// Render a run summary as pretty-printed JSON.
pub fn render(report: &GenerateReport) -> Result<String> {
    let json = serde_json::to_string_pretty(report)?;
    Ok(json)
}
