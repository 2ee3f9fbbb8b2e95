//! Prompt construction for the external text-generation service.
//!
//! The core only builds the request text. Sending it is the writer's job.

use serde_json::{Map, Value};

use crate::{
  citation::Citation,
  format::{compact_currency, humanize, thousands_f64},
  framework::EffectiveSection,
  profile::CompanyProfile,
};

/// Free-form research notes passed alongside the profile. String values are
/// rendered inline, arrays as bullet lists.
pub type ResearchData = Map<String, Value>;

pub const SYSTEM_PROMPT: &str = "You are an institutional-grade investment analyst writing a detailed research report.

Your writing must follow these standards:
- Institutional tone: professional, evidence-based, balanced
- No first person (never \"I\", \"we\", \"our\")
- No hype language (avoid \"massive\", \"incredible\", \"game-changing\", \"revolutionary\")
- Specific metrics: use actual numbers, percentages, dollar amounts
- Named entities: reference specific companies, products, customers by name
- Citations: embed [N] references inline where claims are supported by sources
- Tables: use markdown tables for financial data and peer comparisons
- Forward-looking statements must reference the source (management guidance, analyst estimates)

Structure each section with clear headers and logical flow.";

/// Extension keys rendered as plain bullet lists when present.
const LIST_EXTENSIONS: [&str; 6] = [
  "operational_kpis",
  "metrics",
  "teaching_topics",
  "risk_categories",
  "valuation_multiples",
  "key_drivers",
];

const MARGIN_KEYS: [&str; 4] = [
  "gross_margin_drivers",
  "gross_margin_headwinds",
  "margin_drivers",
  "margin_headwinds",
];

const MASTERCLASS_SECTION: u32 = 8;
const DEFAULT_PURPOSE: &str = "Teach readers how to analyze this company type";

fn fmt_value(value: Option<f64>) -> String {
  let Some(v) = value else {
    return "Not available".to_owned();
  };
  if let Some(compact) = compact_currency(v) {
    compact
  } else if v < 1.0 {
    format!("{:.1}%", v * 100.0)
  } else {
    thousands_f64(v, 2)
  }
}

fn push_bullets<'a>(out: &mut Vec<String>, heading: String, items: impl Iterator<Item = &'a str>) {
  out.push(heading);
  out.extend(items.map(|item| format!("- {}", humanize(item))));
  out.push(String::new());
}

fn str_items(value: &Value) -> impl Iterator<Item = &str> {
  value.as_array().into_iter().flatten().filter_map(Value::as_str)
}

/// Build the user prompt for one section.
pub fn build_section_prompt(
  section: &EffectiveSection,
  profile: &CompanyProfile,
  research_data: Option<&ResearchData>,
  citations: Option<&[Citation]>,
) -> String {
  let meta = &profile.metadata;
  let fin = &profile.financials;
  let val = &profile.valuation;
  let ops = &profile.operational;
  let (wc, ct) = (section.word_count, section.citation_target);

  let mut parts = vec![
    format!("# Section {}: {}", section.id, section.name),
    String::new(),
    format!("**Company:** {} ({})", meta.name, meta.ticker),
    format!("**Report Date:** {}", meta.report_date),
    format!("**Reference Quarter:** {}", meta.reference_quarter),
    String::new(),
    format!("**Word Count Target:** {}–{} words", wc.min, wc.max),
    format!("**Citation Target:** {}–{} inline citations [N]", ct.min, ct.max),
    String::new(),
  ];

  if let Some(elements) = &section.required_elements {
    push_bullets(
      &mut parts,
      "**Required Elements (must include all):**".to_owned(),
      elements.iter().map(String::as_str),
    );
  }
  if let Some(subsections) = &section.subsections {
    push_bullets(
      &mut parts,
      "**Subsections to cover:**".to_owned(),
      subsections.iter().map(String::as_str),
    );
  }

  // Sector-specific structural hints.
  for key in LIST_EXTENSIONS {
    if let Some(value) = section.extensions.get(key) {
      push_bullets(&mut parts, format!("**{}:**", humanize(key)), str_items(value));
    }
  }

  if let Some(template) = section.extensions.get("product_analysis_template") {
    let per_product = template.get("per_product").map(str_items).into_iter().flatten();
    push_bullets(
      &mut parts,
      "**Per-Product Analysis Template:**".to_owned(),
      per_product,
    );
  }

  if let Some(groups) = section.extensions.get("peer_groups").and_then(Value::as_object) {
    parts.push("**Peer Groups:**".to_owned());
    for (group, tickers) in groups {
      let tickers: Vec<&str> = str_items(tickers).collect();
      parts.push(format!("- {}: {}", humanize(group), tickers.join(", ")));
    }
    parts.push(String::new());
  }

  if let Some(margins) = section.extensions.get("margin_analysis") {
    for key in MARGIN_KEYS {
      if let Some(items) = margins.get(key) {
        push_bullets(&mut parts, format!("**{}:**", humanize(key)), str_items(items));
      }
    }
  }

  parts.extend([
    "---".to_owned(),
    "## Company Data Available".to_owned(),
    String::new(),
    format!("Revenue (current): {}", fmt_value(fin.revenue.current)),
    format!("Gross Margin: {}", fmt_value(fin.gross_margin.current)),
    format!("Operating Margin: {}", fmt_value(fin.operating_margin.current)),
    format!("FCF: {}", fmt_value(fin.fcf)),
    format!("EPS (GAAP): {}", fmt_value(fin.eps.gaap)),
    format!("Market Cap: {}", fmt_value(val.market_cap)),
    format!("EV/Sales: {}", fmt_value(val.ev_sales)),
    format!("Fwd P/E: {}", fmt_value(val.pe_forward)),
    String::new(),
  ]);
  if !ops.products.is_empty() {
    parts.push(format!("Products: {}", ops.products.join(", ")));
  }
  if !ops.customers.is_empty() {
    parts.push(format!("Key Customers: {}", ops.customers.join(", ")));
  }
  parts.push(String::new());

  if let Some(research) = research_data.filter(|r| !r.is_empty()) {
    parts.extend(["---".to_owned(), "## Additional Research Data".to_owned(), String::new()]);
    for (key, value) in research {
      match value {
        Value::String(text) => parts.push(format!("**{key}:** {text}")),
        Value::Array(items) => {
          parts.push(format!("**{key}:**"));
          parts.extend(items.iter().map(|item| match item {
            Value::String(s) => format!("- {s}"),
            other => format!("- {other}"),
          }));
        }
        _ => {}
      }
      parts.push(String::new());
    }
  }

  if let Some(citations) = citations.filter(|c| !c.is_empty()) {
    parts.extend([
      "---".to_owned(),
      "## Available Citations".to_owned(),
      "Use [N] format to cite these sources inline:".to_owned(),
      String::new(),
    ]);
    for c in citations {
      let id = c.id.map_or_else(|| "?".to_owned(), |id| id.to_string());
      parts.push(format!("[{id}] {} — {}", c.title, c.subject));
    }
    parts.push(String::new());
  }

  parts.extend([
    "---".to_owned(),
    String::new(),
    format!("Write Section {}: {}.", section.id, section.name),
    format!("Target {}–{} words.", wc.min, wc.max),
    "Use markdown formatting with appropriate headers (## and ###).".to_owned(),
    "Include inline citations [N] where you reference data or claims.".to_owned(),
    "If financial tables are required, use markdown table format.".to_owned(),
    "Maintain institutional analyst tone throughout.".to_owned(),
  ]);

  if section.id == MASTERCLASS_SECTION {
    let purpose = section
      .extensions
      .get("purpose")
      .and_then(Value::as_str)
      .unwrap_or(DEFAULT_PURPOSE);
    parts.push(format!("\nMasterclass purpose: {purpose}"));
    parts.push(
      "This section should educate the reader, not just analyze the company.".to_owned(),
    );
  }

  parts.join("\n")
}
