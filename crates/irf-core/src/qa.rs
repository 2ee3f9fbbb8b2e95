//! Quality-assurance rule engine for assembled reports.
//!
//! Checks are grouped into four independent categories. Each check yields a
//! [`CheckResult`]; the aggregate only flips `overall_pass` and sorts failure
//! messages into errors and warnings. Nothing here is fatal.
//!
//! The table and metric counts are regex heuristics, not a markdown parser.
//! Malformed tables may be over- or under-counted.

use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
  citation::{Citation, validate_citations},
  format::thousands,
  report::{Report, SectionResult},
  template::SECTION_COUNT,
};

static TABLE_ROW_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?m)^\|.+\|$").expect("valid table row regex"));

static METRIC_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\$[\d,.]+[BMK]?|\d+\.?\d*%|\d{1,3}(?:,\d{3})+").expect("valid metric regex")
});

/// `I` is matched case-sensitively so that a lowercase `i` never trips it.
static FIRST_PERSON_I_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\bI\b").expect("valid pronoun regex"));

static FIRST_PERSON_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)\b(?:we|our|my|us)\b").expect("valid pronoun regex"));

pub const HYPE_WORDS: [&str; 12] = [
  "massive",
  "incredible",
  "game-changing",
  "revolutionary",
  "unprecedented",
  "explosive",
  "skyrocket",
  "moonshot",
  "disruptive",
  "phenomenal",
  "extraordinary",
  "jaw-dropping",
];

const WORD_COUNT_RANGE: (usize, usize) = (8_000, 10_000);
const TABLE_RANGE: (usize, usize) = (2, 10);
const CITATION_RANGE: (usize, usize) = (25, 40);
const MIN_METRICS: usize = 10;

const PEER_SECTION: u32 = 9;
const FINANCIAL_SECTION: u32 = 7;
const RISK_SECTION: u32 = 10;

// ─── Result types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
  Info,
  Warning,
  Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
  pub pass:    bool,
  pub message: String,
  pub level:   Level,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub value:   Option<u64>,
}

impl CheckResult {
  fn new(pass: bool, message: impl Into<String>, level: Level) -> Self {
    Self { pass, message: message.into(), level, value: None }
  }

  fn with_value(mut self, value: usize) -> Self {
    self.value = Some(value as u64);
    self
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureChecks {
  pub all_11_sections_present:   CheckResult,
  pub section_generation_status: CheckResult,
  pub total_word_count:          CheckResult,
  pub tables_present:            CheckResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationChecks {
  pub total_count:          CheckResult,
  pub no_orphaned:          CheckResult,
  pub no_uncited:           CheckResult,
  pub sequential_numbering: CheckResult,
}

/// Section-specific checks only run when that section is in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentChecks {
  pub specific_metrics_present: CheckResult,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub peer_comparison_table:    Option<CheckResult>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub financial_table:          Option<CheckResult>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub risk_probability_impact:  Option<CheckResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneChecks {
  pub no_hype_language: CheckResult,
  pub no_first_person:  CheckResult,
}

impl StructureChecks {
  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &CheckResult)> {
    [
      ("all_11_sections_present", &self.all_11_sections_present),
      ("section_generation_status", &self.section_generation_status),
      ("total_word_count", &self.total_word_count),
      ("tables_present", &self.tables_present),
    ]
    .into_iter()
  }
}

impl CitationChecks {
  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &CheckResult)> {
    [
      ("total_count", &self.total_count),
      ("no_orphaned", &self.no_orphaned),
      ("no_uncited", &self.no_uncited),
      ("sequential_numbering", &self.sequential_numbering),
    ]
    .into_iter()
  }
}

impl ContentChecks {
  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &CheckResult)> {
    let optional = [
      ("peer_comparison_table", self.peer_comparison_table.as_ref()),
      ("financial_table", self.financial_table.as_ref()),
      ("risk_probability_impact", self.risk_probability_impact.as_ref()),
    ];
    std::iter::once(("specific_metrics_present", &self.specific_metrics_present)).chain(
      optional
        .into_iter()
        .filter_map(|(name, check)| check.map(|c| (name, c))),
    )
  }
}

impl ToneChecks {
  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &CheckResult)> {
    [
      ("no_hype_language", &self.no_hype_language),
      ("no_first_person", &self.no_first_person),
    ]
    .into_iter()
  }
}

/// Every check of a QA pass, plus the aggregated verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaResult {
  pub structure:    StructureChecks,
  pub citations:    CitationChecks,
  pub content:      ContentChecks,
  pub tone:         ToneChecks,
  pub overall_pass: bool,
  /// `[category.check] message` for failed checks below `error` level.
  pub warnings:     Vec<String>,
  /// `[category.check] message` for failed `error`-level checks.
  pub errors:       Vec<String>,
}

impl QaResult {
  /// All checks as `(category, name, result)`, in report order.
  pub fn checks(&self) -> impl Iterator<Item = (&'static str, &'static str, &CheckResult)> {
    let structure = self.structure.iter().map(|(name, c)| ("structure", name, c));
    let citations = self.citations.iter().map(|(name, c)| ("citations", name, c));
    let content = self.content.iter().map(|(name, c)| ("content", name, c));
    let tone = self.tone.iter().map(|(name, c)| ("tone", name, c));
    structure.chain(citations).chain(content).chain(tone)
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Run the full battery of checks against an assembled report.
pub fn run_qa_checks(report: &Report) -> QaResult {
  let sections = &report.sections;
  let generated_content = sections
    .iter()
    .filter(|s| s.is_generated())
    .map(|s| s.content.as_str())
    .collect::<Vec<_>>()
    .join("\n\n");

  let mut result = QaResult {
    structure:    check_structure(sections, report.word_count),
    citations:    check_citations(&generated_content, &report.citations),
    content:      check_content(&generated_content, sections),
    tone:         check_tone(&generated_content),
    overall_pass: true,
    warnings:     Vec::new(),
    errors:       Vec::new(),
  };

  let failures: Vec<(String, Level)> = result
    .checks()
    .filter(|(_, _, check)| !check.pass)
    .map(|(category, name, check)| {
      (format!("[{category}.{name}] {}", check.message), check.level)
    })
    .collect();

  for (message, level) in failures {
    result.overall_pass = false;
    match level {
      Level::Error => result.errors.push(message),
      Level::Warning | Level::Info => result.warnings.push(message),
    }
  }

  result
}

fn has_table_row(content: &str) -> bool { TABLE_ROW_RE.is_match(content) }

fn find_section(sections: &[SectionResult], id: u32) -> Option<&SectionResult> {
  sections.iter().find(|s| s.section_id == id)
}

fn format_ids<T: ToString>(ids: impl IntoIterator<Item = T>) -> String {
  let ids: Vec<String> = ids.into_iter().map(|id| id.to_string()).collect();
  format!("[{}]", ids.join(", "))
}

fn check_structure(sections: &[SectionResult], total_words: usize) -> StructureChecks {
  let present: BTreeSet<u32> = sections.iter().map(|s| s.section_id).collect();
  let missing: Vec<u32> = (1..=SECTION_COUNT).filter(|id| !present.contains(id)).collect();
  let all_present = if missing.is_empty() {
    CheckResult::new(true, "All 11 sections present", Level::Error)
  } else {
    CheckResult::new(false, format!("Missing sections: {}", format_ids(missing)), Level::Error)
  };

  let not_generated: Vec<String> = sections
    .iter()
    .filter(|s| !s.is_generated())
    .map(|s| format!("Section {}: not generated", s.section_id))
    .collect();
  let generation = if not_generated.is_empty() {
    CheckResult::new(true, "All sections generated", Level::Info)
  } else {
    CheckResult::new(false, not_generated.join("; "), Level::Error)
  };

  let (lo, hi) = WORD_COUNT_RANGE;
  let word_count = CheckResult::new(
    (lo..=hi).contains(&total_words),
    format!(
      "Total: {} words (target: {}–{})",
      thousands(total_words as u64),
      thousands(lo as u64),
      thousands(hi as u64)
    ),
    Level::Warning,
  )
  .with_value(total_words);

  // Header and separator rows together stand for one table.
  let all_content = sections
    .iter()
    .map(|s| s.content.as_str())
    .collect::<Vec<_>>()
    .join("\n");
  let tables = TABLE_ROW_RE.find_iter(&all_content).count() / 2;
  let (lo, hi) = TABLE_RANGE;
  let tables_present = CheckResult::new(
    (lo..=hi).contains(&tables),
    format!("~{tables} tables found (target: {lo}–{hi})"),
    Level::Warning,
  )
  .with_value(tables);

  StructureChecks {
    all_11_sections_present: all_present,
    section_generation_status: generation,
    total_word_count: word_count,
    tables_present,
  }
}

fn check_citations(content: &str, citations: &[Citation]) -> CitationChecks {
  let validation = validate_citations(content, citations);
  let (lo, hi) = CITATION_RANGE;
  let total = validation.total_citations;

  CitationChecks {
    total_count: CheckResult::new(
      (lo..=hi).contains(&total),
      format!("{total} citations (target: {lo}–{hi})"),
      Level::Warning,
    )
    .with_value(total),
    no_orphaned: if validation.orphaned.is_empty() {
      CheckResult::new(true, "No orphaned citations", Level::Error)
    } else {
      CheckResult::new(
        false,
        format!("Orphaned citation IDs in text: {}", format_ids(validation.orphaned)),
        Level::Error,
      )
    },
    no_uncited: if validation.uncited.is_empty() {
      CheckResult::new(true, "All references cited", Level::Warning)
    } else {
      CheckResult::new(
        false,
        format!("Uncited references: {}", format_ids(validation.uncited)),
        Level::Warning,
      )
    },
    sequential_numbering: if validation.sequential {
      CheckResult::new(true, "Sequential", Level::Warning)
    } else {
      CheckResult::new(false, "Non-sequential numbering", Level::Warning)
    },
  }
}

fn check_content(content: &str, sections: &[SectionResult]) -> ContentChecks {
  let metrics = METRIC_RE.find_iter(content).count();
  let specific_metrics_present = CheckResult::new(
    metrics >= MIN_METRICS,
    format!("{metrics} specific metrics found (target: {MIN_METRICS}+)"),
    Level::Warning,
  )
  .with_value(metrics);

  let table_check = |id: u32, present: &'static str, missing: &'static str| {
    find_section(sections, id).map(|s| {
      let ok = has_table_row(&s.content);
      CheckResult::new(ok, if ok { present } else { missing }, Level::Warning)
    })
  };

  let risk_probability_impact = find_section(sections, RISK_SECTION).map(|s| {
    let lower = s.content.to_lowercase();
    let ok = ["probability", "likelihood", "impact"]
      .iter()
      .any(|term| lower.contains(term));
    let message = if ok {
      "Risk framework present"
    } else {
      "Missing probability/impact assessment"
    };
    CheckResult::new(ok, message, Level::Warning)
  });

  ContentChecks {
    specific_metrics_present,
    peer_comparison_table: table_check(
      PEER_SECTION,
      "Peer table present",
      "Missing peer comparison table",
    ),
    financial_table: table_check(
      FINANCIAL_SECTION,
      "Financial table present",
      "Missing financial table",
    ),
    risk_probability_impact,
  }
}

fn check_tone(content: &str) -> ToneChecks {
  let lower = content.to_lowercase();
  let hype: Vec<&str> = HYPE_WORDS
    .iter()
    .copied()
    .filter(|word| lower.contains(word))
    .collect();
  let no_hype_language = if hype.is_empty() {
    CheckResult::new(true, "No hype language detected", Level::Warning)
  } else {
    CheckResult::new(
      false,
      format!("Hype words found: {}", hype.join(", ")),
      Level::Warning,
    )
  };

  let first_person = FIRST_PERSON_I_RE.is_match(content) || FIRST_PERSON_RE.is_match(content);
  let no_first_person = if first_person {
    CheckResult::new(false, "First person language detected", Level::Warning)
  } else {
    CheckResult::new(true, "No first person language", Level::Warning)
  };

  ToneChecks { no_hype_language, no_first_person }
}

// ─── Formatting ──────────────────────────────────────────────────────────────

fn title_case(category: &str) -> String {
  let mut chars = category.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

/// Human-readable QA report.
pub fn format_qa_report(qa: &QaResult) -> String {
  let status = if qa.overall_pass { "PASS" } else { "NEEDS REVIEW" };
  let mut lines = vec![
    "## Quality Assurance Report".to_owned(),
    String::new(),
    format!("**Overall Status:** {status}"),
    String::new(),
  ];

  let mut current = "";
  for (category, name, check) in qa.checks() {
    if category != current {
      if !current.is_empty() {
        lines.push(String::new());
      }
      lines.push(format!("### {}", title_case(category)));
      current = category;
    }
    let icon = match (check.pass, check.level) {
      (true, _) => "PASS",
      (false, Level::Error) => "FAIL",
      (false, _) => "WARN",
    };
    lines.push(format!("  [{icon}] {name}: {}", check.message));
  }
  lines.push(String::new());

  if !qa.errors.is_empty() {
    lines.push("### Errors".to_owned());
    lines.extend(qa.errors.iter().map(|e| format!("  - {e}")));
    lines.push(String::new());
  }
  if !qa.warnings.is_empty() {
    lines.push("### Warnings".to_owned());
    lines.extend(qa.warnings.iter().map(|w| format!("  - {w}")));
  }

  lines.join("\n")
}
