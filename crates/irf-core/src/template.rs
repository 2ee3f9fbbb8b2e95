//! The base 11-section report template.
//!
//! Every sector framework inherits from this catalog. The table is a
//! process-wide constant: merges always build new values from it and nothing
//! ever writes back.

use serde::{Deserialize, Serialize};

// ─── Targets ─────────────────────────────────────────────────────────────────

/// An inclusive `min..=max` target, used for word counts and citation counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
  pub min: u32,
  pub max: u32,
}

impl Bounds {
  pub const fn new(min: u32, max: u32) -> Self { Self { min, max } }

  pub fn contains(&self, value: u32) -> bool {
    (self.min..=self.max).contains(&value)
  }
}

/// A target as written in an override. Either side may be left out, in
/// which case the base section's value for that side stays in force.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialBounds {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub min: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max: Option<u32>,
}

impl PartialBounds {
  pub fn apply(self, base: Bounds) -> Bounds {
    Bounds {
      min: self.min.unwrap_or(base.min),
      max: self.max.unwrap_or(base.max),
    }
  }

  /// Only a range with both ends given can be inverted; an open end counts
  /// as 0 or unbounded.
  pub fn is_inverted(&self) -> bool {
    matches!((self.min, self.max), (Some(min), Some(max)) if min > max)
  }
}

impl From<Bounds> for PartialBounds {
  fn from(bounds: Bounds) -> Self {
    Self { min: Some(bounds.min), max: Some(bounds.max) }
  }
}

// ─── Base sections ───────────────────────────────────────────────────────────

/// One of the eleven fixed template sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseSection {
  pub id:                u32,
  pub name:              &'static str,
  pub word_count:        Bounds,
  pub citation_target:   Bounds,
  pub required_elements: Option<&'static [&'static str]>,
  pub subsections:       Option<&'static [&'static str]>,
  /// Allowed alternate structures for the section.
  pub variants:          Option<&'static [&'static str]>,
  /// Free-form statement of what the section is for.
  pub purpose:           Option<&'static str>,
}

/// Number of sections in every report.
pub const SECTION_COUNT: u32 = 11;

const fn section(
  id: u32,
  name: &'static str,
  word_count: Bounds,
  citation_target: Bounds,
) -> BaseSection {
  BaseSection {
    id,
    name,
    word_count,
    citation_target,
    required_elements: None,
    subsections: None,
    variants: None,
    purpose: None,
  }
}

static BASE_SECTIONS: [BaseSection; SECTION_COUNT as usize] = [
  BaseSection {
    required_elements: Some(&[
      "headline_thesis",
      "key_catalysts",
      "headline_metrics",
      "valuation_context",
      "mispricing_argument",
      "investor_takeaway",
    ]),
    ..section(1, "Executive Summary", Bounds::new(400, 500), Bounds::new(3, 5))
  },
  BaseSection {
    subsections: Some(&[
      "industry_tailwinds",
      "market_cycle_position",
      "geopolitical_regulatory_context",
    ]),
    ..section(
      2,
      "Macroeconomic & Geopolitical Backdrop",
      Bounds::new(400, 600),
      Bounds::new(4, 6),
    )
  },
  BaseSection {
    variants: Some(&["restructuring", "business_overview", "m_and_a"]),
    ..section(3, "Strategic Positioning", Bounds::new(400, 600), Bounds::new(3, 5))
  },
  BaseSection {
    required_elements: Some(&[
      "segment_overview",
      "product_portfolio",
      "operational_kpis",
      "outlook",
    ]),
    ..section(
      4,
      "Operational Analysis - Primary",
      Bounds::new(800, 1200),
      Bounds::new(8, 12),
    )
  },
  section(
    5,
    "Operational Analysis - Secondary",
    Bounds::new(400, 600),
    Bounds::new(3, 5),
  ),
  section(
    6,
    "Associated Companies & Ecosystem",
    Bounds::new(300, 400),
    Bounds::new(2, 4),
  ),
  BaseSection {
    required_elements: Some(&[
      "pnl_snapshot_table",
      "revenue_analysis",
      "margin_analysis",
      "backlog_or_forward_metrics",
      "balance_sheet_cash_flow",
    ]),
    ..section(
      7,
      "Financial Performance Deep Dive",
      Bounds::new(600, 800),
      Bounds::new(6, 10),
    )
  },
  BaseSection {
    purpose: Some("Teach readers how to analyze this company type"),
    ..section(8, "Masterclass", Bounds::new(800, 1000), Bounds::new(4, 6))
  },
  BaseSection {
    required_elements: Some(&[
      "peer_comparison_table",
      "valuation_discussion",
      "fair_value_estimate",
    ]),
    ..section(
      9,
      "Peer Valuation & Comparative Analysis",
      Bounds::new(500, 700),
      Bounds::new(5, 7),
    )
  },
  BaseSection {
    required_elements: Some(&[
      "risk_1_with_probability_impact",
      "risk_2_with_probability_impact",
      "risk_3_with_probability_impact",
    ]),
    ..section(10, "Risks & Challenges", Bounds::new(400, 600), Bounds::new(3, 5))
  },
  BaseSection {
    required_elements: Some(&[
      "thesis_restatement",
      "monitoring_points",
      "actionable_recommendations",
    ]),
    ..section(
      11,
      "Conclusion & Monitoring Framework",
      Bounds::new(300, 400),
      Bounds::new(2, 3),
    )
  },
];

/// All base sections, ordered by id.
pub fn base_sections() -> &'static [BaseSection] { &BASE_SECTIONS }

/// Look up a base section by id (1–11).
pub fn get_base_section(id: u32) -> Option<&'static BaseSection> {
  BASE_SECTIONS.iter().find(|s| s.id == id)
}

pub fn is_valid_section_id(id: u32) -> bool { (1..=SECTION_COUNT).contains(&id) }

// ─── Aggregate targets ───────────────────────────────────────────────────────

/// Sum of the base word-count targets.
///
/// These are the nominal template totals. Sector overrides are not taken into
/// account, so the numbers can differ from a specific effective framework.
pub fn total_word_target() -> Bounds {
  sum_bounds(BASE_SECTIONS.iter().map(|s| s.word_count))
}

/// Sum of the base citation targets. Override-blind, like
/// [`total_word_target`].
pub fn total_citation_target() -> Bounds {
  sum_bounds(BASE_SECTIONS.iter().map(|s| s.citation_target))
}

fn sum_bounds(iter: impl Iterator<Item = Bounds>) -> Bounds {
  iter.fold(Bounds::new(0, 0), |acc, b| {
    Bounds::new(acc.min + b.min, acc.max + b.max)
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn eleven_sections_in_order() {
    let ids: Vec<u32> = base_sections().iter().map(|s| s.id).collect();
    assert_eq!(ids, (1..=11).collect::<Vec<_>>());
  }

  #[test]
  fn targets_are_well_formed() {
    for s in base_sections() {
      assert!(s.word_count.min > 0, "section {}", s.id);
      assert!(s.word_count.min <= s.word_count.max, "section {}", s.id);
      assert!(s.citation_target.min <= s.citation_target.max, "section {}", s.id);
    }
  }

  #[test]
  fn lookup_by_id() {
    assert_eq!(get_base_section(1).map(|s| s.name), Some("Executive Summary"));
    assert!(get_base_section(0).is_none());
    assert!(get_base_section(99).is_none());
  }

  #[test]
  fn totals_sum_the_base_catalog() {
    assert_eq!(total_word_target(), Bounds::new(5300, 7400));
    assert_eq!(total_citation_target(), Bounds::new(43, 68));
  }

  #[test]
  fn extension_fields_live_on_their_sections() {
    assert!(get_base_section(3).and_then(|s| s.variants).is_some());
    assert!(get_base_section(8).and_then(|s| s.purpose).is_some());
    assert!(get_base_section(5).and_then(|s| s.required_elements).is_none());
  }
}
