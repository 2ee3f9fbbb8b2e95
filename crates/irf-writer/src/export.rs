//! Markdown file export.

use std::path::{Path, PathBuf};

use irf_core::{
  profile::CompanyProfile,
  report::{Report, render_report_markdown},
};
use tracing::info;

use crate::Result;

/// Write the rendered report to `<output_dir>/<TICKER>/<report_date>_report.md`
/// and return the path written.
pub async fn export_markdown(
  report: &Report,
  profile: &CompanyProfile,
  output_dir: &Path,
) -> Result<PathBuf> {
  let ticker = match profile.metadata.ticker.as_str() {
    "" => "UNKNOWN",
    t => t,
  };
  let report_date = match report.report_date.as_str() {
    "" => "unknown",
    d => d,
  };

  let company_dir = output_dir.join(ticker);
  tokio::fs::create_dir_all(&company_dir).await?;

  let path = company_dir.join(format!("{report_date}_report.md"));
  tokio::fs::write(&path, render_report_markdown(report, profile)).await?;

  info!(path = %path.display(), "report exported");
  Ok(path)
}
