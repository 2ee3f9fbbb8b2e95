//! Section results, report assembly and the markdown document view.

use std::collections::BTreeMap;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::{
  citation::{Citation, assign_citation_ids, format_references_section},
  format::{slugify, thousands},
  framework::{EffectiveFramework, EffectiveSection},
  profile::{CompanyProfile, generate_id},
  qa::QaResult,
};

// ─── Section results ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionStatus {
  Generated,
  Error,
}

/// The output of one generation attempt for one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionResult {
  pub section_id: u32,
  pub name:       String,
  #[serde(default)]
  pub content:    String,
  #[serde(default)]
  pub word_count: usize,
  pub status:     SectionStatus,
  #[serde(default)]
  pub error:      Option<String>,
}

impl SectionResult {
  pub fn generated(section: &EffectiveSection, content: String) -> Self {
    Self {
      section_id: section.id,
      name: section.name.clone(),
      word_count: content.split_whitespace().count(),
      content,
      status: SectionStatus::Generated,
      error: None,
    }
  }

  pub fn failed(section: &EffectiveSection, error: impl Into<String>) -> Self {
    Self {
      section_id: section.id,
      name:       section.name.clone(),
      content:    String::new(),
      word_count: 0,
      status:     SectionStatus::Error,
      error:      Some(error.into()),
    }
  }

  pub fn is_generated(&self) -> bool { self.status == SectionStatus::Generated }
}

// ─── Report ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
  Draft,
  Complete,
}

/// An assembled report. Persisted as a whole record; never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
  pub id:                String,
  pub company_id:        String,
  pub framework_id:      String,
  pub status:            ReportStatus,
  pub report_date:       String,
  pub reference_quarter: String,
  pub sections:          Vec<SectionResult>,
  #[serde(default)]
  pub citations:         Vec<Citation>,
  #[serde(default)]
  pub qa_results:        Option<QaResult>,
  pub word_count:        usize,
  /// Export format → written file path.
  #[serde(default)]
  pub output_paths:      BTreeMap<String, String>,
}

fn status_of(sections: &[SectionResult]) -> ReportStatus {
  if sections.iter().all(SectionResult::is_generated) {
    ReportStatus::Complete
  } else {
    ReportStatus::Draft
  }
}

impl Report {
  /// Swap in a regenerated section, keyed by `section_id`. A section that
  /// was not part of the report is appended. Totals and status are derived
  /// again afterwards.
  pub fn replace_section(&mut self, result: SectionResult) {
    match self.sections.iter_mut().find(|s| s.section_id == result.section_id) {
      Some(slot) => *slot = result,
      None => self.sections.push(result),
    }
    self.word_count = self.sections.iter().map(|s| s.word_count).sum();
    self.status = status_of(&self.sections);
  }
}

/// Combine per-section results and citations into a report.
///
/// Citations are renumbered `1..=N` in the order given.
pub fn assemble_report(
  sections: Vec<SectionResult>,
  profile: &CompanyProfile,
  framework: &EffectiveFramework,
  citations: Option<Vec<Citation>>,
) -> Report {
  let meta = &profile.metadata;
  let mut citations = citations.unwrap_or_default();
  assign_citation_ids(&mut citations);

  let report_date = if meta.report_date.is_empty() {
    Local::now().format("%Y-%m-%d").to_string()
  } else {
    meta.report_date.clone()
  };

  Report {
    id: generate_id(),
    company_id: profile.id.clone(),
    framework_id: framework.sector_id.clone(),
    status: status_of(&sections),
    report_date,
    reference_quarter: meta.reference_quarter.clone(),
    word_count: sections.iter().map(|s| s.word_count).sum(),
    sections,
    citations,
    qa_results: None,
    output_paths: BTreeMap::new(),
  }
}

// ─── Markdown ────────────────────────────────────────────────────────────────

/// Render a report as a standalone markdown document.
pub fn render_report_markdown(report: &Report, profile: &CompanyProfile) -> String {
  let meta = &profile.metadata;
  let mut lines = vec![
    format!("# {} ({}) — Investment Analysis", meta.name, meta.ticker),
    String::new(),
    format!("**Report Date:** {}", report.report_date),
    format!("**Reference Quarter:** {}", report.reference_quarter),
    format!("**Framework:** {}", report.framework_id),
    String::new(),
    "---".to_owned(),
    String::new(),
    "## Table of Contents".to_owned(),
    String::new(),
  ];

  for section in &report.sections {
    lines.push(format!(
      "{}. [{}](#{})",
      section.section_id,
      section.name,
      slugify(&section.name)
    ));
  }
  lines.extend([String::new(), "---".to_owned(), String::new()]);

  for section in &report.sections {
    match section.status {
      SectionStatus::Error => {
        let error = section.error.as_deref().unwrap_or("Unknown error");
        lines.extend([
          format!("## {}", section.name),
          String::new(),
          format!("> **Generation Error:** {error}"),
          String::new(),
        ]);
      }
      SectionStatus::Generated if !section.content.is_empty() => {
        if !section.content.trim().starts_with('#') {
          lines.extend([format!("## {}", section.name), String::new()]);
        }
        lines.extend([
          section.content.clone(),
          String::new(),
          format!("*[{} words]*", section.word_count),
          String::new(),
        ]);
      }
      SectionStatus::Generated => {}
    }
    lines.extend(["---".to_owned(), String::new()]);
  }

  if !report.citations.is_empty() {
    lines.push(format_references_section(&report.citations));
    lines.push(String::new());
  }

  lines.extend([
    "---".to_owned(),
    String::new(),
    format!(
      "*Report generated on {} using the Investment Report Framework Creator.*",
      report.report_date
    ),
    format!("*Total word count: {}*", thousands(report.word_count as u64)),
  ]);

  lines.join("\n")
}
