//! Sector frameworks and the override merge engine.
//!
//! A [`SectorFramework`] is a user-authored set of per-section overrides. It
//! is merged onto the base template to produce an [`EffectiveFramework`],
//! which is always derived on demand and never stored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
  Error, Result,
  template::{BaseSection, Bounds, PartialBounds, base_sections, get_base_section},
};

/// Open bag of sector-specific structural hints (`peer_groups`,
/// `margin_analysis`, `operational_kpis`, ...).
pub type Extensions = Map<String, Value>;

// ─── Overrides ───────────────────────────────────────────────────────────────

/// Per-section customisation carried by a sector framework.
///
/// The known structural fields are typed; everything else lands in `extra`
/// and is copied verbatim onto the effective section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionOverride {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name_override:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub word_count:        Option<PartialBounds>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub citation_target:   Option<PartialBounds>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub required_elements: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subsections:       Option<Vec<String>>,
  #[serde(flatten)]
  pub extra:             Extensions,
}

impl SectionOverride {
  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name_override = Some(name.into());
    self
  }

  pub fn with_required_elements<I, S>(mut self, elements: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.required_elements = Some(elements.into_iter().map(Into::into).collect());
    self
  }

  pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
    self.extra.insert(key.into(), value);
    self
  }
}

// ─── Sector framework ────────────────────────────────────────────────────────

fn default_base_version() -> String { "1.0".to_owned() }

/// A sector-specific customisation of the base template.
///
/// Override keys are decoded to integers on load; JSON object keys such as
/// `"3"` become `3`. Out-of-range ids survive decoding so that the validator
/// can report them, and keys that are not integers at all (`"abc"`, `"-1"`)
/// are kept aside in `unknown_overrides` for the same reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSectorFramework", into = "RawSectorFramework")]
pub struct SectorFramework {
  pub sector_id:         String,
  pub display_name:      String,
  pub description:       String,
  pub base_version:      String,
  pub section_overrides: BTreeMap<u32, SectionOverride>,
  /// Overrides whose key is not a section number. Never merged.
  pub unknown_overrides: BTreeMap<String, SectionOverride>,
  pub data_requirements: Extensions,
}

/// Wire shape of [`SectorFramework`], with override keys left as strings.
#[derive(Serialize, Deserialize)]
struct RawSectorFramework {
  #[serde(default)]
  sector_id:         String,
  #[serde(default)]
  display_name:      String,
  #[serde(default)]
  description:       String,
  #[serde(default = "default_base_version")]
  base_version:      String,
  #[serde(default)]
  section_overrides: BTreeMap<String, SectionOverride>,
  #[serde(default)]
  data_requirements: Extensions,
}

impl From<RawSectorFramework> for SectorFramework {
  fn from(raw: RawSectorFramework) -> Self {
    let mut section_overrides = BTreeMap::new();
    let mut unknown_overrides = BTreeMap::new();
    for (key, ov) in raw.section_overrides {
      match key.parse::<u32>() {
        Ok(id) => {
          section_overrides.insert(id, ov);
        }
        Err(_) => {
          unknown_overrides.insert(key, ov);
        }
      }
    }
    Self {
      sector_id: raw.sector_id,
      display_name: raw.display_name,
      description: raw.description,
      base_version: raw.base_version,
      section_overrides,
      unknown_overrides,
      data_requirements: raw.data_requirements,
    }
  }
}

impl From<SectorFramework> for RawSectorFramework {
  fn from(fw: SectorFramework) -> Self {
    let mut section_overrides: BTreeMap<String, SectionOverride> = fw
      .section_overrides
      .into_iter()
      .map(|(id, ov)| (id.to_string(), ov))
      .collect();
    section_overrides.extend(fw.unknown_overrides);
    Self {
      sector_id: fw.sector_id,
      display_name: fw.display_name,
      description: fw.description,
      base_version: fw.base_version,
      section_overrides,
      data_requirements: fw.data_requirements,
    }
  }
}

impl SectorFramework {
  pub fn new(sector_id: impl Into<String>, display_name: impl Into<String>) -> Self {
    Self {
      sector_id:         sector_id.into(),
      display_name:      display_name.into(),
      description:       String::new(),
      base_version:      default_base_version(),
      section_overrides: BTreeMap::new(),
      unknown_overrides: BTreeMap::new(),
      data_requirements: Extensions::new(),
    }
  }

  pub fn with_override(mut self, section_id: u32, ov: SectionOverride) -> Self {
    self.section_overrides.insert(section_id, ov);
    self
  }

  pub fn override_for(&self, section_id: u32) -> Option<&SectionOverride> {
    self.section_overrides.get(&section_id)
  }

  pub fn from_json(input: &str) -> Result<Self> { Ok(serde_json::from_str(input)?) }

  pub fn to_json_pretty(&self) -> Result<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }
}

// ─── Effective framework ─────────────────────────────────────────────────────

/// A base section with a sector's overrides applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveSection {
  pub id:                u32,
  pub name:              String,
  pub word_count:        Bounds,
  pub citation_target:   Bounds,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub required_elements: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subsections:       Option<Vec<String>>,
  #[serde(flatten)]
  pub extensions:        Extensions,
}

impl EffectiveSection {
  /// Read an extension field as a list of strings, ignoring non-string items.
  pub fn extension_list(&self, key: &str) -> Option<Vec<&str>> {
    let items = self.extensions.get(key)?.as_array()?;
    Some(items.iter().filter_map(Value::as_str).collect())
  }

  fn from_base(base: &BaseSection) -> Self {
    let owned = |items: &[&str]| -> Vec<String> {
      items.iter().map(|s| (*s).to_owned()).collect()
    };

    let mut extensions = Extensions::new();
    if let Some(variants) = base.variants {
      extensions.insert("variants".into(), Value::from(variants.to_vec()));
    }
    if let Some(purpose) = base.purpose {
      extensions.insert("purpose".into(), Value::from(purpose));
    }

    Self {
      id: base.id,
      name: base.name.to_owned(),
      word_count: base.word_count,
      citation_target: base.citation_target,
      required_elements: base.required_elements.map(owned),
      subsections: base.subsections.map(owned),
      extensions,
    }
  }
}

/// All eleven sections of a sector framework, merged and in id order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveFramework {
  pub sector_id:         String,
  pub display_name:      String,
  pub description:       String,
  pub sections:          Vec<EffectiveSection>,
  pub data_requirements: Extensions,
}

impl EffectiveFramework {
  pub fn section(&self, id: u32) -> Option<&EffectiveSection> {
    self.sections.iter().find(|s| s.id == id)
  }
}

// ─── Merge ───────────────────────────────────────────────────────────────────

fn merge(base: &BaseSection, overrides: Option<&SectionOverride>) -> EffectiveSection {
  let mut section = EffectiveSection::from_base(base);
  let Some(ov) = overrides else {
    return section;
  };

  if let Some(name) = &ov.name_override {
    section.name = name.clone();
  }
  // List-valued fields are replaced, never unioned.
  if let Some(elements) = &ov.required_elements {
    section.required_elements = Some(elements.clone());
  }
  if let Some(subsections) = &ov.subsections {
    section.subsections = Some(subsections.clone());
  }
  // A bound given on one side only keeps the base value on the other.
  if let Some(wc) = ov.word_count {
    section.word_count = wc.apply(section.word_count);
  }
  if let Some(ct) = ov.citation_target {
    section.citation_target = ct.apply(section.citation_target);
  }
  for (key, value) in &ov.extra {
    section.extensions.insert(key.clone(), value.clone());
  }

  section
}

/// Build one effective section.
///
/// Fails with [`Error::InvalidSectionId`] when `section_id` is not 1–11.
pub fn build_effective_section(
  section_id: u32,
  overrides: Option<&SectionOverride>,
) -> Result<EffectiveSection> {
  let base = get_base_section(section_id).ok_or(Error::InvalidSectionId(section_id))?;
  Ok(merge(base, overrides))
}

/// Merge a sector framework onto the base template.
///
/// Always yields exactly eleven sections with ids 1–11 in ascending order.
/// Overrides keyed by ids outside that range are ignored here; the validator
/// reports them.
pub fn build_effective_framework(framework: &SectorFramework) -> EffectiveFramework {
  let sections = base_sections()
    .iter()
    .map(|base| merge(base, framework.override_for(base.id)))
    .collect();

  EffectiveFramework {
    sector_id: framework.sector_id.clone(),
    display_name: framework.display_name.clone(),
    description: framework.description.clone(),
    sections,
    data_requirements: framework.data_requirements.clone(),
  }
}

// ─── Documentation view ──────────────────────────────────────────────────────

/// Render an effective framework as markdown documentation.
pub fn framework_to_markdown(effective: &EffectiveFramework) -> String {
  let mut lines = vec![
    format!("# {}", effective.display_name),
    String::new(),
    effective.description.clone(),
    String::new(),
    "## Sections".to_owned(),
    String::new(),
  ];

  for section in &effective.sections {
    let wc = section.word_count;
    let ct = section.citation_target;
    lines.push(format!("### Section {}: {}", section.id, section.name));
    lines.push(format!("- Word count: {}–{}", wc.min, wc.max));
    lines.push(format!("- Citations: {}–{}", ct.min, ct.max));
    if let Some(elements) = &section.required_elements {
      lines.push("- Required elements:".to_owned());
      lines.extend(elements.iter().map(|e| format!("  - {e}")));
    }
    if let Some(subsections) = &section.subsections {
      lines.push("- Subsections:".to_owned());
      lines.extend(subsections.iter().map(|s| format!("  - {s}")));
    }
    lines.push(String::new());
  }

  lines.join("\n")
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn semiconductor() -> SectorFramework {
    SectorFramework::new("semi", "Semi Test")
      .with_override(
        1,
        SectionOverride::default()
          .with_required_elements(["business_model_snapshot", "headline_thesis"]),
      )
      .with_override(
        3,
        SectionOverride::default().with_name("Strategic Positioning - Fabless Model"),
      )
      .with_override(
        9,
        SectionOverride::default()
          .with_extra("peer_groups", json!({ "gpu": ["AMD", "INTC"] })),
      )
  }

  #[test]
  fn no_overrides_yields_base_copy() {
    let section = build_effective_section(1, None).unwrap();
    assert_eq!(section.name, "Executive Summary");
    assert_eq!(section.required_elements.as_ref().map(Vec::len), Some(6));
  }

  #[test]
  fn name_override_replaces_name() {
    let ov = SectionOverride::default().with_name("Custom Name");
    let section = build_effective_section(3, Some(&ov)).unwrap();
    assert_eq!(section.name, "Custom Name");
    assert!(section.extensions.get("name_override").is_none());
  }

  #[test]
  fn invalid_id_is_a_hard_error() {
    assert!(matches!(
      build_effective_section(99, None),
      Err(Error::InvalidSectionId(99))
    ));
    assert!(matches!(
      build_effective_section(0, None),
      Err(Error::InvalidSectionId(0))
    ));
  }

  #[test]
  fn list_fields_are_replaced_not_unioned() {
    let ov = SectionOverride::default().with_required_elements(["x"]);
    let section = build_effective_section(1, Some(&ov)).unwrap();
    assert_eq!(section.required_elements, Some(vec!["x".to_owned()]));
  }

  #[test]
  fn extra_keys_are_copied_and_may_shadow_base_extensions() {
    let ov = SectionOverride::default()
      .with_extra("variants", json!(["spin_off"]))
      .with_extra("operational_kpis", json!(["utilisation"]));
    let section = build_effective_section(3, Some(&ov)).unwrap();
    assert_eq!(section.extension_list("variants"), Some(vec!["spin_off"]));
    assert_eq!(section.extension_list("operational_kpis"), Some(vec!["utilisation"]));
  }

  #[test]
  fn word_count_override_wins() {
    let ov = SectionOverride {
      word_count: Some(Bounds::new(100, 200).into()),
      ..Default::default()
    };
    let section = build_effective_section(5, Some(&ov)).unwrap();
    assert_eq!(section.word_count, Bounds::new(100, 200));
    assert_eq!(section.citation_target, Bounds::new(3, 5));
  }

  #[test]
  fn one_sided_bounds_keep_the_base_value() {
    let ov: SectionOverride = serde_json::from_value(json!({
      "word_count": { "min": 500 },
      "citation_target": { "max": 9 }
    }))
    .unwrap();
    let section = build_effective_section(5, Some(&ov)).unwrap();
    assert_eq!(section.word_count, Bounds::new(500, 600));
    assert_eq!(section.citation_target, Bounds::new(3, 9));
  }

  #[test]
  fn effective_framework_has_eleven_ordered_sections() {
    let empty = build_effective_framework(&SectorFramework::new("empty", "Empty"));
    let ids: Vec<u32> = empty.sections.iter().map(|s| s.id).collect();
    assert_eq!(ids, (1..=11).collect::<Vec<_>>());

    let effective = build_effective_framework(&semiconductor());
    assert_eq!(effective.sections.len(), 11);
    assert_eq!(
      effective.sections[0].required_elements,
      Some(vec!["business_model_snapshot".to_owned(), "headline_thesis".to_owned()])
    );
    assert_eq!(effective.sections[2].name, "Strategic Positioning - Fabless Model");
    assert!(effective.section(9).unwrap().extensions.contains_key("peer_groups"));
  }

  #[test]
  fn merge_leaves_the_base_catalog_untouched() {
    let _ = build_effective_framework(&semiconductor());
    assert_eq!(get_base_section(3).unwrap().name, "Strategic Positioning");
    let fresh = build_effective_section(1, None).unwrap();
    assert_eq!(fresh.required_elements.unwrap()[0], "headline_thesis");
  }

  #[test]
  fn string_keys_decode_to_integer_ids() {
    let fw = SectorFramework::from_json(
      r#"{
        "sector_id": "semi",
        "display_name": "Semi",
        "section_overrides": { "3": { "name_override": "Fabless" } }
      }"#,
    )
    .unwrap();
    assert_eq!(fw.base_version, "1.0");
    assert_eq!(build_effective_framework(&fw).sections[2].name, "Fabless");
  }

  #[test]
  fn non_numeric_keys_are_kept_aside() {
    let fw = SectorFramework::from_json(
      r#"{
        "sector_id": "semi",
        "display_name": "Semi",
        "section_overrides": {
          "abc": { "name_override": "Nope" },
          "-1": {},
          "2": { "name_override": "Macro" }
        }
      }"#,
    )
    .unwrap();
    assert_eq!(fw.section_overrides.keys().collect::<Vec<_>>(), vec![&2]);
    assert_eq!(fw.unknown_overrides.keys().collect::<Vec<_>>(), vec!["-1", "abc"]);

    let effective = build_effective_framework(&fw);
    assert_eq!(effective.sections.len(), 11);
    assert_eq!(effective.sections[1].name, "Macro");

    let reloaded = SectorFramework::from_json(&fw.to_json_pretty().unwrap()).unwrap();
    assert_eq!(reloaded, fw);
  }

  #[test]
  fn json_round_trip_preserves_the_effective_framework() {
    let original = semiconductor();
    let exported = original.to_json_pretty().unwrap();
    let imported = SectorFramework::from_json(&exported).unwrap();
    assert_eq!(imported, original);
    assert_eq!(
      build_effective_framework(&imported),
      build_effective_framework(&original)
    );
  }

  #[test]
  fn markdown_lists_sections_and_elements() {
    let md = framework_to_markdown(&build_effective_framework(&semiconductor()));
    assert!(md.starts_with("# Semi Test"));
    assert!(md.contains("### Section 3: Strategic Positioning - Fabless Model"));
    assert!(md.contains("- Word count: 400–500"));
    assert!(md.contains("  - business_model_snapshot"));
    assert!(md.contains("- Subsections:"));
  }
}
