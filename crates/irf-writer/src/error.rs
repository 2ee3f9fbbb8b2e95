//! Error types for `irf-writer`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Why a single section could not be generated.
///
/// These never escape a generation run: the message is stored on the
/// section result and the run moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
  #[error(
    "No API key configured. Set api_key in .irf_config.json or the ANTHROPIC_API_KEY environment variable"
  )]
  MissingApiKey,

  #[error("generation timed out after {0}s")]
  Timeout(u64),

  #[error("{0}")]
  Service(String),
}
