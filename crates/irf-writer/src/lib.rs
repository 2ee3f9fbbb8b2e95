//! Report generation on top of `irf-core`.
//!
//! Sends one prompt per section to a [`TextGenerator`], with a timeout and
//! retries around each call, then assembles and exports the report.

#![allow(async_fn_in_trait)]

pub mod config;
pub mod error;
pub mod export;
pub mod generator;
pub mod writer;

// `self::` keeps the `config` module distinct from the `config` crate.
pub use self::{
  config::WriterConfig,
  error::{Error, GenerationError, Result},
  export::export_markdown,
  generator::{GenerationRequest, TextGenerator},
  writer::{Progress, SectionWriter, WriteContext},
};
