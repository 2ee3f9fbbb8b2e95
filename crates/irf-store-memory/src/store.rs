//! [`MemoryStore`] — the in-process implementation of [`ResearchStore`].

use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use irf_core::{
  citation::Citation,
  framework::SectorFramework,
  profile::CompanyProfile,
  report::Report,
  store::{FrameworkRecord, LibraryCitation, ResearchStore},
};

use crate::{Error, Result};

// ─── Rows ────────────────────────────────────────────────────────────────────

struct FrameworkRow {
  config:     String,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

struct CompanyRow {
  ticker:  String,
  profile: String,
  /// Bumped on every save; orders "latest by ticker".
  seq:     u64,
}

struct ReportRow {
  company_id: String,
  report:     String,
  /// Fixed at first insert; orders "newest first".
  seq:        u64,
}

#[derive(Default)]
struct Tables {
  frameworks: BTreeMap<String, FrameworkRow>,
  companies:  BTreeMap<String, CompanyRow>,
  reports:    BTreeMap<String, ReportRow>,
  citations:  BTreeMap<u64, LibraryCitation>,
  next_seq:   u64,
}

impl Tables {
  fn bump(&mut self) -> u64 {
    self.next_seq += 1;
    self.next_seq
  }

  fn framework_record(id: &str, row: &FrameworkRow) -> Result<FrameworkRecord> {
    Ok(FrameworkRecord {
      id:         id.to_owned(),
      framework:  SectorFramework::from_json(&row.config)?,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A research store held entirely in memory.
///
/// Cloning is cheap — clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
  tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

impl ResearchStore for MemoryStore {
  type Error = Error;

  // ── Frameworks ────────────────────────────────────────────────────────────

  async fn save_framework(&self, id: &str, framework: &SectorFramework) -> Result<FrameworkRecord> {
    let config = framework.to_json_pretty()?;
    let now = Utc::now();

    let mut tables = self.tables.write().await;
    let created_at = tables
      .frameworks
      .get(id)
      .map_or(now, |existing| existing.created_at);
    let row = FrameworkRow { config, created_at, updated_at: now };
    let record = Tables::framework_record(id, &row)?;
    tables.frameworks.insert(id.to_owned(), row);
    Ok(record)
  }

  async fn get_framework(&self, id: &str) -> Result<Option<FrameworkRecord>> {
    let tables = self.tables.read().await;
    tables
      .frameworks
      .get(id)
      .map(|row| Tables::framework_record(id, row))
      .transpose()
  }

  async fn list_frameworks(&self) -> Result<Vec<FrameworkRecord>> {
    let tables = self.tables.read().await;
    tables
      .frameworks
      .iter()
      .map(|(id, row)| Tables::framework_record(id, row))
      .collect()
  }

  async fn delete_framework(&self, id: &str) -> Result<bool> {
    let mut tables = self.tables.write().await;
    Ok(tables.frameworks.remove(id).is_some())
  }

  // ── Companies ─────────────────────────────────────────────────────────────

  async fn save_company(&self, profile: &CompanyProfile) -> Result<()> {
    let encoded = serde_json::to_string(profile)?;
    let framework_id = &profile.metadata.sector_framework;

    let mut tables = self.tables.write().await;
    if !framework_id.is_empty() && !tables.frameworks.contains_key(framework_id) {
      return Err(Error::FrameworkNotFound(framework_id.clone()));
    }
    let seq = tables.bump();
    tables.companies.insert(profile.id.clone(), CompanyRow {
      ticker: profile.metadata.ticker.to_uppercase(),
      profile: encoded,
      seq,
    });
    Ok(())
  }

  async fn get_company(&self, id: &str) -> Result<Option<CompanyProfile>> {
    let tables = self.tables.read().await;
    let Some(row) = tables.companies.get(id) else {
      return Ok(None);
    };
    Ok(Some(serde_json::from_str(&row.profile)?))
  }

  async fn get_company_by_ticker(&self, ticker: &str) -> Result<Option<CompanyProfile>> {
    let ticker = ticker.to_uppercase();
    let tables = self.tables.read().await;
    let latest = tables
      .companies
      .values()
      .filter(|row| row.ticker == ticker)
      .max_by_key(|row| row.seq);
    match latest {
      Some(row) => Ok(Some(serde_json::from_str(&row.profile)?)),
      None => Ok(None),
    }
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  async fn save_report(&self, report: &Report) -> Result<()> {
    let encoded = serde_json::to_string(report)?;

    let mut tables = self.tables.write().await;
    if !tables.companies.contains_key(&report.company_id) {
      return Err(Error::CompanyNotFound(report.company_id.clone()));
    }
    if !report.framework_id.is_empty() && !tables.frameworks.contains_key(&report.framework_id) {
      return Err(Error::FrameworkNotFound(report.framework_id.clone()));
    }
    let seq = match tables.reports.get(&report.id) {
      Some(existing) => existing.seq,
      None => tables.bump(),
    };
    tables.reports.insert(report.id.clone(), ReportRow {
      company_id: report.company_id.clone(),
      report: encoded,
      seq,
    });
    Ok(())
  }

  async fn get_report(&self, id: &str) -> Result<Option<Report>> {
    let tables = self.tables.read().await;
    let Some(row) = tables.reports.get(id) else {
      return Ok(None);
    };
    Ok(Some(serde_json::from_str(&row.report)?))
  }

  async fn list_reports(&self, ticker: &str) -> Result<Vec<Report>> {
    let ticker = ticker.to_uppercase();
    let tables = self.tables.read().await;

    let mut rows: Vec<&ReportRow> = tables
      .reports
      .values()
      .filter(|row| {
        tables
          .companies
          .get(&row.company_id)
          .is_some_and(|company| company.ticker == ticker)
      })
      .collect();
    rows.sort_by(|a, b| b.seq.cmp(&a.seq));

    rows
      .into_iter()
      .map(|row| serde_json::from_str(&row.report).map_err(Error::from))
      .collect()
  }

  // ── Citation library ──────────────────────────────────────────────────────

  async fn record_citation(&self, citation: &Citation) -> Result<LibraryCitation> {
    let mut tables = self.tables.write().await;
    let existing = tables
      .citations
      .values()
      .find(|c| c.citation.url == citation.url);
    if let Some(existing) = existing {
      return Ok(existing.clone());
    }
    let library_id = tables.citations.keys().next_back().map_or(1, |last| last + 1);
    let entry = LibraryCitation {
      library_id,
      citation: citation.clone(),
      created_at: Utc::now(),
    };
    tables.citations.insert(library_id, entry.clone());
    Ok(entry)
  }
}
