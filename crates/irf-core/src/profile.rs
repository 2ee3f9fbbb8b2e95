//! Company profile — the immutable per-cycle snapshot that prompt
//! construction reads from.

use std::collections::BTreeMap;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::format::{compact_currency, thousands_f64};

/// Short random identifier used for companies and reports.
pub fn generate_id() -> String {
  let mut id = uuid::Uuid::new_v4().simple().to_string();
  id.truncate(8);
  id
}

// ─── Profile sections ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileMetadata {
  pub name:              String,
  pub ticker:            String,
  #[serde(default)]
  pub exchange:          String,
  /// Id of the sector framework the report is written against.
  #[serde(default)]
  pub sector_framework:  String,
  /// `YYYY-MM-DD`.
  #[serde(default)]
  pub report_date:       String,
  /// E.g. `Q4 FY2026`.
  #[serde(default)]
  pub reference_quarter: String,
  #[serde(default)]
  pub currency:          String,
}

/// A metric reported for the current and the prior period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodValue {
  pub current:    Option<f64>,
  pub prior_year: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueFigures {
  pub current:    Option<f64>,
  pub prior_year: Option<f64>,
  pub yoy_pct:    Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Eps {
  pub gaap:     Option<f64>,
  pub non_gaap: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Financials {
  pub revenue:           RevenueFigures,
  pub gross_margin:      PeriodValue,
  pub operating_margin:  PeriodValue,
  pub r_and_d_pct:       Option<f64>,
  pub eps:               Eps,
  pub fcf:               Option<f64>,
  pub segment_breakdown: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Operational {
  pub primary_segment: Option<String>,
  pub products:        Vec<String>,
  pub customers:       Vec<String>,
  pub design_wins:     Vec<String>,
  pub foundry:         Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Valuation {
  pub market_cap: Option<f64>,
  pub ev_sales:   Option<f64>,
  pub pe_forward: Option<f64>,
  pub p_fcf:      Option<f64>,
  pub peers:      Vec<String>,
}

// ─── Profile ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
  pub id:          String,
  pub metadata:    ProfileMetadata,
  #[serde(default)]
  pub financials:  Financials,
  #[serde(default)]
  pub operational: Operational,
  #[serde(default)]
  pub valuation:   Valuation,
  #[serde(default)]
  pub catalysts:   Vec<String>,
  #[serde(default)]
  pub risks:       Vec<String>,
  #[serde(default)]
  pub sources:     Vec<String>,
}

impl CompanyProfile {
  /// An empty profile for `ticker`, dated today. The ticker is upper-cased
  /// and doubles as the display name until one is supplied.
  pub fn new(ticker: &str) -> Self {
    let ticker = ticker.to_uppercase();
    Self {
      id:          generate_id(),
      metadata:    ProfileMetadata {
        name:              ticker.clone(),
        ticker,
        exchange:          String::new(),
        sector_framework:  String::new(),
        report_date:       Local::now().format("%Y-%m-%d").to_string(),
        reference_quarter: String::new(),
        currency:          "USD".to_owned(),
      },
      financials:  Financials::default(),
      operational: Operational::default(),
      valuation:   Valuation::default(),
      catalysts:   Vec::new(),
      risks:       Vec::new(),
      sources:     Vec::new(),
    }
  }

  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.metadata.name = name.into();
    self
  }

  pub fn with_framework(mut self, sector_id: impl Into<String>) -> Self {
    self.metadata.sector_framework = sector_id.into();
    self
  }

  pub fn with_reference_quarter(mut self, quarter: impl Into<String>) -> Self {
    self.metadata.reference_quarter = quarter.into();
    self
  }
}

// ─── Summary ─────────────────────────────────────────────────────────────────

fn fmt_currency(value: Option<f64>) -> String {
  match value {
    None => "—".to_owned(),
    Some(v) => compact_currency(v).unwrap_or_else(|| format!("${}", thousands_f64(v, 0))),
  }
}

fn fmt_pct(value: Option<f64>) -> String {
  value.map_or_else(|| "—".to_owned(), |v| format!("{:.1}%", v * 100.0))
}

fn fmt_ratio(value: Option<f64>) -> String {
  value.map_or_else(|| "—".to_owned(), |v| format!("{v:.1}x"))
}

/// A short human-readable profile digest.
pub fn format_profile_summary(profile: &CompanyProfile) -> String {
  let meta = &profile.metadata;
  let fin = &profile.financials;
  let val = &profile.valuation;

  [
    format!("**{}** ({})", meta.name, meta.ticker),
    format!("Exchange: {} | Framework: {}", meta.exchange, meta.sector_framework),
    format!(
      "Report Date: {} | Quarter: {}",
      meta.report_date, meta.reference_quarter
    ),
    String::new(),
    "**Financials:**".to_owned(),
    format!("  Revenue: {}", fmt_currency(fin.revenue.current)),
    format!("  Gross Margin: {}", fmt_pct(fin.gross_margin.current)),
    format!("  Operating Margin: {}", fmt_pct(fin.operating_margin.current)),
    format!("  FCF: {}", fmt_currency(fin.fcf)),
    String::new(),
    "**Valuation:**".to_owned(),
    format!("  Market Cap: {}", fmt_currency(val.market_cap)),
    format!("  EV/Sales: {}", fmt_ratio(val.ev_sales)),
    format!("  Fwd P/E: {}", fmt_ratio(val.pe_forward)),
  ]
  .join("\n")
}
