//! Core types and domain logic for investment-report frameworks.
//!
//! Covers the base section template, sector override merging, framework
//! validation, citation integrity, the QA rule engine and report assembly.
//! This crate does no I/O; storage sits behind [`store::ResearchStore`] and
//! text generation lives in `irf-writer`.

// Native `async fn` in traits; the futures' `Send` bounds are spelled out on
// the trait methods themselves.
#![allow(async_fn_in_trait)]

pub mod citation;
pub mod error;
pub mod format;
pub mod framework;
pub mod manager;
pub mod profile;
pub mod prompt;
pub mod qa;
pub mod report;
pub mod store;
pub mod template;
pub mod validator;

pub use error::{Error, Result};
