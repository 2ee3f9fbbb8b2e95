//! Citations: construction, numbering, reference formatting and the
//! in-text integrity check.

use std::{collections::BTreeSet, sync::LazyLock};

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Matches `[N]` in-text citation markers.
static MARKER_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\[(\d+)\]").expect("valid citation marker regex"));

// ─── Types ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationCategory {
  CompanyOfficial,
  FinancialData,
  #[default]
  News,
  Industry,
  Peer,
  Government,
}

/// A single source referenced by a report.
///
/// `id` stays `None` until [`assign_citation_ids`] numbers the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
  pub id:                    Option<u32>,
  pub url:                   String,
  pub title:                 String,
  #[serde(default)]
  pub publication:           Option<String>,
  #[serde(default)]
  pub author:                Option<String>,
  #[serde(default)]
  pub category:              CitationCategory,
  #[serde(default)]
  pub subject:               String,
  #[serde(default)]
  pub date_published:        Option<String>,
  /// `YYYY-MM-DD`.
  #[serde(default)]
  pub date_accessed:         String,
  #[serde(default)]
  pub data_points_extracted: Vec<String>,
  #[serde(default)]
  pub sections_cited_in:     Vec<u32>,
}

impl Citation {
  /// A new, unnumbered citation accessed today.
  pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
    Self {
      id:                    None,
      url:                   url.into(),
      title:                 title.into(),
      publication:           None,
      author:                None,
      category:              CitationCategory::default(),
      subject:               String::new(),
      date_published:        None,
      date_accessed:         Local::now().format("%Y-%m-%d").to_string(),
      data_points_extracted: Vec::new(),
      sections_cited_in:     Vec::new(),
    }
  }

  pub fn with_publication(mut self, publication: impl Into<String>) -> Self {
    self.publication = Some(publication.into());
    self
  }

  pub fn with_category(mut self, category: CitationCategory) -> Self {
    self.category = category;
    self
  }

  pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
    self.subject = subject.into();
    self
  }
}

// ─── Numbering ───────────────────────────────────────────────────────────────

/// Number citations `1..=N` in list order, overwriting any previous ids.
pub fn assign_citation_ids(citations: &mut [Citation]) {
  for (citation, id) in citations.iter_mut().zip(1..) {
    citation.id = Some(id);
  }
}

// ─── Formatting ──────────────────────────────────────────────────────────────

const TURKISH_MONTHS: [&str; 12] = [
  "Ocak", "Şubat", "Mart", "Nisan", "Mayıs", "Haziran", "Temmuz", "Ağustos",
  "Eylül", "Ekim", "Kasım", "Aralık",
];

/// Format one entry of the References section:
/// `[N] Title - Publication - erişim tarihi <Month> D, YYYY - URL`.
pub fn format_citation_reference(citation: &Citation) -> String {
  let id = citation.id.map_or_else(|| "?".to_owned(), |id| id.to_string());
  let mut parts = vec![format!("[{id}]"), citation.title.clone()];

  if let Some(publication) = citation.publication.as_deref().filter(|p| !p.is_empty()) {
    parts.push(format!("- {publication}"));
  }

  let accessed = &citation.date_accessed;
  if !accessed.is_empty() {
    let access = match NaiveDate::parse_from_str(accessed, "%Y-%m-%d") {
      Ok(date) => format!(
        "erişim tarihi {} {}, {}",
        TURKISH_MONTHS[date.month0() as usize],
        date.day(),
        date.year()
      ),
      Err(_) => format!("accessed {accessed}"),
    };
    parts.push(format!("- {access}"));
  }

  if !citation.url.is_empty() {
    parts.push(format!("- {}", citation.url));
  }

  parts.join(" ")
}

/// Format the full References section, ordered by citation id.
pub fn format_references_section(citations: &[Citation]) -> String {
  let mut sorted: Vec<&Citation> = citations.iter().collect();
  sorted.sort_by_key(|c| c.id.unwrap_or(0));

  let mut lines = vec!["## References".to_owned(), String::new()];
  lines.extend(sorted.into_iter().map(format_citation_reference));
  lines.join("\n")
}

// ─── Integrity ───────────────────────────────────────────────────────────────

/// Outcome of cross-checking in-text markers against the reference list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationValidation {
  /// Cited in the text but missing from the reference list, ascending.
  pub orphaned:        Vec<u64>,
  /// In the reference list but never cited, ascending.
  pub uncited:         Vec<u64>,
  /// Reference ids form exactly `1..=max`. Vacuously true when empty.
  pub sequential:      bool,
  pub total_citations: usize,
  pub total_cited:     usize,
}

/// Every distinct id appearing in a `[N]` marker within `content`.
///
/// Markers too large for a `u64` saturate to `u64::MAX`, which no reference
/// can carry, so they still show up as orphans.
pub fn cited_ids(content: &str) -> BTreeSet<u64> {
  MARKER_RE
    .captures_iter(content)
    .map(|caps| caps[1].parse().unwrap_or(u64::MAX))
    .collect()
}

pub fn validate_citations(content: &str, citations: &[Citation]) -> CitationValidation {
  let cited = cited_ids(content);
  let references: BTreeSet<u64> =
    citations.iter().filter_map(|c| c.id).map(u64::from).collect();

  let sequential = match references.last() {
    Some(&max) => references.len() as u64 == max && references.first() == Some(&1),
    None => true,
  };

  CitationValidation {
    orphaned: cited.difference(&references).copied().collect(),
    uncited: references.difference(&cited).copied().collect(),
    sequential,
    total_citations: references.len(),
    total_cited: cited.len(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn numbered(ids: &[u32]) -> Vec<Citation> {
    ids
      .iter()
      .map(|&id| Citation {
        id: Some(id),
        ..Citation::new(format!("https://example.com/{id}"), format!("Source {id}"))
      })
      .collect()
  }

  #[test]
  fn new_citation_is_unnumbered_and_dated() {
    let c = Citation::new("https://example.com", "Test Article")
      .with_publication("Test Pub")
      .with_category(CitationCategory::News);
    assert_eq!(c.id, None);
    assert_eq!(c.url, "https://example.com");
    assert_eq!(c.date_accessed.len(), 10);
  }

  #[test]
  fn ids_follow_list_order_and_renumber() {
    let mut list: Vec<Citation> = (0..5)
      .map(|i| Citation::new(format!("https://example.com/{i}"), format!("Article {i}")))
      .collect();
    assign_citation_ids(&mut list);
    let ids: Vec<_> = list.iter().map(|c| c.id).collect();
    assert_eq!(ids, (1..=5).map(Some).collect::<Vec<_>>());

    list.swap(0, 4);
    assign_citation_ids(&mut list);
    assert_eq!(list[0].title, "Article 4");
    assert_eq!(list[0].id, Some(1));
    assert_eq!(list[4].id, Some(5));
  }

  #[test]
  fn reference_uses_turkish_access_date() {
    let c = Citation {
      id: Some(1),
      date_accessed: "2026-02-12".into(),
      ..Citation::new("https://ir.example.com", "Q4 Earnings").with_publication("Company IR")
    };
    assert_eq!(
      format_citation_reference(&c),
      "[1] Q4 Earnings - Company IR - erişim tarihi Şubat 12, 2026 - https://ir.example.com"
    );
  }

  #[test]
  fn unparseable_access_date_falls_back() {
    let c = Citation { date_accessed: "last week".into(), ..Citation::new("", "T") };
    assert_eq!(format_citation_reference(&c), "[?] T - accessed last week");
  }

  #[test]
  fn references_section_is_sorted_by_id() {
    let mut list = numbered(&[2, 1]);
    list[0].date_accessed = "2026-01-15".into();
    let section = format_references_section(&list);
    assert!(section.starts_with("## References\n\n[1] Source 1"));
    assert!(section.contains("[2] Source 2"));
  }

  #[test]
  fn all_cited_and_sequential() {
    let content = "Revenue was $10B[1], beating estimates[2]. Growth was strong[3].";
    let result = validate_citations(content, &numbered(&[1, 2, 3]));
    assert!(result.orphaned.is_empty());
    assert!(result.uncited.is_empty());
    assert!(result.sequential);
    assert_eq!(result.total_cited, 3);
  }

  #[test]
  fn orphaned_markers_are_reported() {
    let result = validate_citations("Data shows growth[1][5].", &numbered(&[1]));
    assert_eq!(result.orphaned, vec![5]);
  }

  #[test]
  fn oversized_markers_are_orphans() {
    let result = validate_citations("[1] and [99999999999]", &numbered(&[1]));
    assert_eq!(result.orphaned, vec![99_999_999_999]);
    assert_eq!(result.total_cited, 2);

    let huge = validate_citations("[123456789012345678901234567890]", &numbered(&[1]));
    assert_eq!(huge.orphaned, vec![u64::MAX]);
    assert_eq!(huge.uncited, vec![1]);
  }

  #[test]
  fn uncited_references_are_reported() {
    let result = validate_citations("Only one citation[1].", &numbered(&[1, 2, 3]));
    assert_eq!(result.uncited, vec![2, 3]);
  }

  #[test]
  fn gaps_break_sequential_numbering() {
    let result = validate_citations("Refs [1] and [3].", &numbered(&[1, 3]));
    assert!(!result.sequential);
    assert!(!validate_citations("", &numbered(&[2])).sequential);
    assert!(validate_citations("", &[]).sequential);
  }

  #[test]
  fn unassigned_ids_are_ignored() {
    let list = vec![Citation::new("https://a", "A")];
    let result = validate_citations("[1]", &list);
    assert_eq!(result.total_citations, 0);
    assert_eq!(result.orphaned, vec![1]);
  }
}
