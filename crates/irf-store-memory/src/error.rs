//! Error type for `irf-store-memory`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] irf_core::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("framework not found: {0}")]
  FrameworkNotFound(String),

  #[error("company not found: {0}")]
  CompanyNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
