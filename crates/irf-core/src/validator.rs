//! Structural validation of sector frameworks and of generated section text.
//!
//! Both entry points collect every problem into a list instead of stopping at
//! the first one. An empty list is the only success signal.

use crate::{
  framework::SectorFramework,
  template::{get_base_section, is_valid_section_id},
};

/// Check a sector framework definition. Returns one message per violation.
pub fn validate_framework(framework: &SectorFramework) -> Vec<String> {
  let mut errors = Vec::new();

  for (field, value) in [
    ("sector_id", &framework.sector_id),
    ("display_name", &framework.display_name),
  ] {
    if value.is_empty() {
      errors.push(format!("Missing required field: {field}"));
    }
  }

  let sector_id = &framework.sector_id;
  if !sector_id.is_empty() && !is_valid_sector_id(sector_id) {
    errors.push(format!(
      "sector_id must be alphanumeric with underscores, got: {sector_id}"
    ));
  }

  for id in framework.section_overrides.keys() {
    if !is_valid_section_id(*id) {
      errors.push(format!("Invalid section ID in overrides: {id}"));
    }
  }
  for key in framework.unknown_overrides.keys() {
    errors.push(format!("Invalid section ID in overrides: {key}"));
  }

  let numbered = framework
    .section_overrides
    .iter()
    .map(|(id, ov)| (id.to_string(), ov));
  let unknown = framework.unknown_overrides.iter().map(|(k, ov)| (k.clone(), ov));
  for (key, ov) in numbered.chain(unknown) {
    if ov.word_count.is_some_and(|wc| wc.is_inverted()) {
      errors.push(format!("Section {key}: word_count min exceeds max"));
    }
  }

  errors
}

/// Alphanumerics and underscores only, with at least one alphanumeric.
fn is_valid_sector_id(id: &str) -> bool {
  id.chars().all(|c| c.is_alphanumeric() || c == '_')
    && id.chars().any(char::is_alphanumeric)
}

/// Check generated content against the effective word-count target of its
/// section. Returns advisory warnings; never fails.
pub fn validate_section_content(
  section_id: u32,
  content: &str,
  framework: &SectorFramework,
) -> Vec<String> {
  let Some(base) = get_base_section(section_id) else {
    return vec![format!("Unknown section ID: {section_id}")];
  };

  let target = framework
    .override_for(section_id)
    .and_then(|ov| ov.word_count)
    .map_or(base.word_count, |wc| wc.apply(base.word_count));
  let words = content.split_whitespace().count();

  let mut warnings = Vec::new();
  if words < target.min as usize {
    warnings.push(format!(
      "Section {section_id} ({}): {words} words below minimum {}",
      base.name, target.min
    ));
  }
  if words > target.max as usize {
    warnings.push(format!(
      "Section {section_id} ({}): {words} words exceeds maximum {}",
      base.name, target.max
    ));
  }
  warnings
}
