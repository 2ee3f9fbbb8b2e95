//! The seam to the external text-generation service.
//!
//! The wire protocol belongs to the implementor; the writer only hands over
//! a [`GenerationRequest`] and expects markdown back.

use std::future::Future;

/// One generation call. Carries the credentials so an implementor needs no
/// state of its own beyond a transport.
#[derive(Clone)]
pub struct GenerationRequest {
  pub api_key:    String,
  pub model:      String,
  pub max_tokens: u32,
  pub system:     String,
  pub prompt:     String,
}

impl std::fmt::Debug for GenerationRequest {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GenerationRequest")
      .field("model", &self.model)
      .field("max_tokens", &self.max_tokens)
      .field("prompt_len", &self.prompt.len())
      .finish_non_exhaustive()
  }
}

/// A text-generation backend.
///
/// Implementations should be side-effect free per call: the writer may
/// retry a request and discards any response that arrives after its
/// timeout.
pub trait TextGenerator: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn generate<'a>(
    &'a self,
    request: &'a GenerationRequest,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}
