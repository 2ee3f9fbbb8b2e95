//! Framework CRUD on top of any [`ResearchStore`].
//!
//! Every write is validated first; a framework with validation errors is
//! never persisted.

use serde_json::{Map, Value};

use crate::{
  framework::{
    EffectiveFramework, SectorFramework, build_effective_framework, framework_to_markdown,
  },
  store::{FrameworkRecord, ResearchStore},
  validator::validate_framework,
};

#[derive(Debug, thiserror::Error)]
pub enum ManagerError<E: std::error::Error + 'static> {
  #[error("store error: {0}")]
  Store(#[source] E),

  #[error("framework not found: {0}")]
  NotFound(String),

  /// The framework failed validation; every message is kept.
  #[error("invalid framework: {}", .0.join("; "))]
  Invalid(Vec<String>),

  #[error(transparent)]
  Core(#[from] crate::Error),
}

impl<E: std::error::Error + 'static> From<serde_json::Error> for ManagerError<E> {
  fn from(err: serde_json::Error) -> Self { Self::Core(crate::Error::Serialization(err)) }
}

pub type ManagerResult<T, E> = std::result::Result<T, ManagerError<E>>;

/// Manages sector frameworks held in a store.
pub struct FrameworkManager<S> {
  store: S,
}

impl<S: ResearchStore> FrameworkManager<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  pub async fn list(&self) -> ManagerResult<Vec<FrameworkRecord>, S::Error> {
    self.store.list_frameworks().await.map_err(ManagerError::Store)
  }

  pub async fn get(&self, id: &str) -> ManagerResult<Option<SectorFramework>, S::Error> {
    let record = self.store.get_framework(id).await.map_err(ManagerError::Store)?;
    Ok(record.map(|r| r.framework))
  }

  /// The stored framework merged over the base template.
  pub async fn get_effective(
    &self,
    id: &str,
  ) -> ManagerResult<Option<EffectiveFramework>, S::Error> {
    Ok(self.get(id).await?.as_ref().map(build_effective_framework))
  }

  async fn require(&self, id: &str) -> ManagerResult<SectorFramework, S::Error> {
    self
      .get(id)
      .await?
      .ok_or_else(|| ManagerError::NotFound(id.to_owned()))
  }

  /// Validate and persist a new framework. Its id is the `sector_id`.
  pub async fn create(&self, framework: &SectorFramework) -> ManagerResult<String, S::Error> {
    let errors = validate_framework(framework);
    if !errors.is_empty() {
      return Err(ManagerError::Invalid(errors));
    }
    let record = self
      .store
      .save_framework(&framework.sector_id, framework)
      .await
      .map_err(ManagerError::Store)?;
    Ok(record.id)
  }

  /// Shallow-merge `patch` onto the stored framework: each top-level key
  /// replaces the stored value wholesale. The result is re-validated and
  /// saved under the same id.
  pub async fn update(
    &self,
    id: &str,
    patch: &Map<String, Value>,
  ) -> ManagerResult<SectorFramework, S::Error> {
    let existing = self.require(id).await?;
    let mut fields = match serde_json::to_value(&existing)? {
      Value::Object(fields) => fields,
      _ => Map::new(),
    };
    fields.extend(patch.iter().map(|(k, v)| (k.clone(), v.clone())));
    let updated: SectorFramework = serde_json::from_value(Value::Object(fields))?;

    let errors = validate_framework(&updated);
    if !errors.is_empty() {
      return Err(ManagerError::Invalid(errors));
    }
    self
      .store
      .save_framework(id, &updated)
      .await
      .map_err(ManagerError::Store)?;
    Ok(updated)
  }

  pub async fn delete(&self, id: &str) -> ManagerResult<bool, S::Error> {
    self.store.delete_framework(id).await.map_err(ManagerError::Store)
  }

  /// Copy `source_id` to a new framework whose `sector_id` is `target_id`.
  pub async fn clone_framework(
    &self,
    source_id: &str,
    target_id: &str,
  ) -> ManagerResult<String, S::Error> {
    let mut framework = self.require(source_id).await?;
    let name = if framework.display_name.is_empty() {
      source_id
    } else {
      &framework.display_name
    };
    framework.display_name = format!("Copy of {name}");
    framework.sector_id = target_id.to_owned();
    self.create(&framework).await
  }

  pub async fn export_json(&self, id: &str) -> ManagerResult<String, S::Error> {
    Ok(self.require(id).await?.to_json_pretty()?)
  }

  pub async fn export_markdown(&self, id: &str) -> ManagerResult<String, S::Error> {
    let framework = self.require(id).await?;
    Ok(framework_to_markdown(&build_effective_framework(&framework)))
  }

  /// Parse a JSON document and [`create`](Self::create) it.
  pub async fn import_json(&self, input: &str) -> ManagerResult<String, S::Error> {
    let framework = SectorFramework::from_json(input)?;
    self.create(&framework).await
  }
}
