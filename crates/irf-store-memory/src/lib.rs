//! In-process backend for the research store.
//!
//! Records are held as serialised JSON behind a [`tokio::sync::RwLock`], so
//! every read hands out an independent snapshot and every save replaces the
//! whole record.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::MemoryStore;
