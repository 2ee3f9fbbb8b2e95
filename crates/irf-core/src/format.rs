//! Small text-formatting helpers shared by the prompt, profile and report
//! renderers.

/// `1234567` → `"1,234,567"`.
pub fn thousands(n: u64) -> String { group_digits(&n.to_string()) }

/// Fixed-point with grouped integer part: `1234.5` → `"1,234.50"`.
pub fn thousands_f64(value: f64, decimals: usize) -> String {
  let raw = format!("{:.*}", decimals, value.abs());
  let (int_part, frac_part) = match raw.split_once('.') {
    Some((i, f)) => (i, Some(f)),
    None => (raw.as_str(), None),
  };
  let sign = if value < 0.0 && raw.chars().any(|c| c != '0' && c != '.') {
    "-"
  } else {
    ""
  };
  match frac_part {
    Some(f) => format!("{sign}{}.{f}", group_digits(int_part)),
    None => format!("{sign}{}", group_digits(int_part)),
  }
}

fn group_digits(digits: &str) -> String {
  let mut out = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, ch) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push(',');
    }
    out.push(ch);
  }
  out
}

/// Billions/millions shorthand, or `None` below one million.
pub fn compact_currency(value: f64) -> Option<String> {
  if value.abs() >= 1e9 {
    Some(format!("${:.1}B", value / 1e9))
  } else if value.abs() >= 1e6 {
    Some(format!("${:.1}M", value / 1e6))
  } else {
    None
  }
}

/// `operational_kpis` → `Operational Kpis`, `m_and_a` → `M And A`.
///
/// Letters following a non-letter are upper-cased; every other letter is
/// lower-cased.
pub fn humanize(key: &str) -> String {
  let mut out = String::with_capacity(key.len());
  let mut at_word_start = true;
  for ch in key.replace('_', " ").chars() {
    if ch.is_alphabetic() {
      if at_word_start {
        out.extend(ch.to_uppercase());
      } else {
        out.extend(ch.to_lowercase());
      }
      at_word_start = false;
    } else {
      out.push(ch);
      at_word_start = true;
    }
  }
  out
}

/// Lower-case, dash-separated anchor for a markdown heading.
pub fn slugify(text: &str) -> String {
  text
    .to_lowercase()
    .replace(' ', "-")
    .replace('&', "and")
    .replace('/', "-")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn groups_integers() {
    assert_eq!(thousands(0), "0");
    assert_eq!(thousands(999), "999");
    assert_eq!(thousands(8500), "8,500");
    assert_eq!(thousands(1_234_567), "1,234,567");
  }

  #[test]
  fn groups_floats() {
    assert_eq!(thousands_f64(2.5, 2), "2.50");
    assert_eq!(thousands_f64(123456.789, 2), "123,456.79");
    assert_eq!(thousands_f64(-1500.0, 2), "-1,500.00");
    assert_eq!(thousands_f64(-0.001, 2), "0.00");
  }

  #[test]
  fn compacts_large_amounts() {
    assert_eq!(compact_currency(39_300_000_000.0).as_deref(), Some("$39.3B"));
    assert_eq!(compact_currency(-2_500_000.0).as_deref(), Some("$-2.5M"));
    assert_eq!(compact_currency(999.0), None);
  }

  #[test]
  fn humanizes_keys() {
    assert_eq!(humanize("operational_kpis"), "Operational Kpis");
    assert_eq!(humanize("m_and_a"), "M And A");
    assert_eq!(humanize("risk_1_with_probability_impact"), "Risk 1 With Probability Impact");
  }

  #[test]
  fn slugs() {
    assert_eq!(
      slugify("Macroeconomic & Geopolitical Backdrop"),
      "macroeconomic-and-geopolitical-backdrop"
    );
  }
}
