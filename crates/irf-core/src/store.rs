//! The `ResearchStore` trait and the records it persists.
//!
//! The trait is implemented by storage backends (e.g. `irf-store-memory`).
//! The [`FrameworkManager`](crate::manager::FrameworkManager) and any outer
//! surface depend on this abstraction, not on a concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  citation::Citation, framework::SectorFramework, profile::CompanyProfile, report::Report,
};

// ─── Records ─────────────────────────────────────────────────────────────────

/// A stored sector framework with its bookkeeping timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkRecord {
  pub id:         String,
  pub framework:  SectorFramework,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// An entry in the shared citation library. `library_id` is assigned by the
/// store and is unrelated to the per-report `[N]` numbering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryCitation {
  pub library_id: u64,
  pub citation:   Citation,
  pub created_at: DateTime<Utc>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a research store backend.
///
/// Saves are whole-record overwrites keyed by id: saving the same record
/// twice leaves one copy. Nothing is patched in place.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait ResearchStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Frameworks ────────────────────────────────────────────────────────

  /// Persist `framework` under `id`. An existing record keeps its
  /// `created_at`.
  fn save_framework<'a>(
    &'a self,
    id: &'a str,
    framework: &'a SectorFramework,
  ) -> impl Future<Output = Result<FrameworkRecord, Self::Error>> + Send + 'a;

  fn get_framework<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<FrameworkRecord>, Self::Error>> + Send + 'a;

  /// All frameworks, ordered by id.
  fn list_frameworks(
    &self,
  ) -> impl Future<Output = Result<Vec<FrameworkRecord>, Self::Error>> + Send + '_;

  /// Returns `false` if nothing was stored under `id`.
  fn delete_framework<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Companies ─────────────────────────────────────────────────────────

  /// Persist a profile snapshot. A non-empty `sector_framework` must name a
  /// stored framework.
  fn save_company<'a>(
    &'a self,
    profile: &'a CompanyProfile,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn get_company<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<CompanyProfile>, Self::Error>> + Send + 'a;

  /// The most recently saved profile for `ticker` (case-insensitive).
  fn get_company_by_ticker<'a>(
    &'a self,
    ticker: &'a str,
  ) -> impl Future<Output = Result<Option<CompanyProfile>, Self::Error>> + Send + 'a;

  // ── Reports ───────────────────────────────────────────────────────────

  /// Persist a report. `company_id` must name a stored company.
  fn save_report<'a>(
    &'a self,
    report: &'a Report,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn get_report<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Report>, Self::Error>> + Send + 'a;

  /// Reports for every company with `ticker`, newest first.
  fn list_reports<'a>(
    &'a self,
    ticker: &'a str,
  ) -> impl Future<Output = Result<Vec<Report>, Self::Error>> + Send + 'a;

  // ── Citation library ──────────────────────────────────────────────────

  /// Add a citation to the library. URLs are unique: recording a URL that is
  /// already present returns the stored entry unchanged.
  fn record_citation<'a>(
    &'a self,
    citation: &'a Citation,
  ) -> impl Future<Output = Result<LibraryCitation, Self::Error>> + Send + 'a;
}
