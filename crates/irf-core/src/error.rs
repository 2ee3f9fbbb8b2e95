//! Error types for `irf-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A base section was requested that is not part of the 11-section
  /// template. This is a caller bug, not a data problem.
  #[error("invalid section id: {0}")]
  InvalidSectionId(u32),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
