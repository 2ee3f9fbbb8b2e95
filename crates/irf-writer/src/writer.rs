//! [`SectionWriter`] — drives the generator section by section.
//!
//! Failures are isolated per section: a section that cannot be generated
//! becomes an `error` result and the run continues with the next one.

use std::time::Duration;

use irf_core::{
  citation::Citation,
  framework::{EffectiveFramework, EffectiveSection},
  profile::CompanyProfile,
  prompt::{ResearchData, SYSTEM_PROMPT, build_section_prompt},
  qa::run_qa_checks,
  report::{Report, SectionResult, assemble_report},
};
use tracing::{debug, info, warn};

use crate::{
  config::WriterConfig,
  error::GenerationError,
  generator::{GenerationRequest, TextGenerator},
};

/// Progress notifications emitted by [`SectionWriter::write_all_sections`].
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
  Started { section_id: u32 },
  Finished(&'a SectionResult),
}

/// Shared inputs for every section of one report.
#[derive(Debug, Clone, Copy)]
pub struct WriteContext<'a> {
  pub profile:   &'a CompanyProfile,
  pub research:  Option<&'a ResearchData>,
  pub citations: Option<&'a [Citation]>,
}

impl<'a> WriteContext<'a> {
  pub fn new(profile: &'a CompanyProfile) -> Self {
    Self { profile, research: None, citations: None }
  }

  pub fn with_research(mut self, research: &'a ResearchData) -> Self {
    self.research = Some(research);
    self
  }

  pub fn with_citations(mut self, citations: &'a [Citation]) -> Self {
    self.citations = Some(citations);
    self
  }
}

pub struct SectionWriter<G> {
  config:    WriterConfig,
  generator: G,
}

impl<G: TextGenerator> SectionWriter<G> {
  pub fn new(config: WriterConfig, generator: G) -> Self { Self { config, generator } }

  pub fn config(&self) -> &WriterConfig { &self.config }

  /// Generate one section. Never fails: problems are reported on the result.
  pub async fn write_section(
    &self,
    section: &EffectiveSection,
    ctx: WriteContext<'_>,
  ) -> SectionResult {
    if self.config.api_key.is_empty() {
      warn!(section_id = section.id, "no API key configured, skipping generation");
      return SectionResult::failed(section, GenerationError::MissingApiKey.to_string());
    }

    let request = GenerationRequest {
      api_key:    self.config.api_key.clone(),
      model:      self.config.model.clone(),
      max_tokens: self.config.max_tokens_per_section,
      system:     SYSTEM_PROMPT.to_owned(),
      prompt:     build_section_prompt(section, ctx.profile, ctx.research, ctx.citations),
    };

    match self.generate_with_retry(section.id, &request).await {
      Ok(content) => {
        let result = SectionResult::generated(section, content);
        info!(section_id = section.id, words = result.word_count, "section generated");
        result
      }
      Err(err) => {
        warn!(section_id = section.id, error = %err, "section generation failed");
        SectionResult::failed(section, err.to_string())
      }
    }
  }

  async fn generate_with_retry(
    &self,
    section_id: u32,
    request: &GenerationRequest,
  ) -> Result<String, GenerationError> {
    let attempts = self.config.max_attempts.max(1);
    let limit = Duration::from_secs(self.config.timeout_secs);
    let mut attempt = 1;

    loop {
      debug!(section_id, attempt, "requesting section");
      let err = match tokio::time::timeout(limit, self.generator.generate(request)).await {
        Ok(Ok(content)) => return Ok(content),
        Ok(Err(e)) => GenerationError::Service(e.to_string()),
        Err(_) => GenerationError::Timeout(self.config.timeout_secs),
      };

      if attempt >= attempts {
        return Err(err);
      }
      warn!(section_id, attempt, error = %err, "attempt failed, retrying");
      attempt += 1;
    }
  }

  /// Generate every section of `framework` in order. `progress` is called
  /// before and after each section.
  pub async fn write_all_sections(
    &self,
    framework: &EffectiveFramework,
    ctx: WriteContext<'_>,
    mut progress: impl FnMut(Progress<'_>),
  ) -> Vec<SectionResult> {
    let mut results = Vec::with_capacity(framework.sections.len());
    for section in &framework.sections {
      progress(Progress::Started { section_id: section.id });
      let result = self.write_section(section, ctx).await;
      progress(Progress::Finished(&result));
      results.push(result);
    }
    results
  }

  /// Generate a single section by id. `None` if the framework has no such
  /// section.
  pub async fn write_only(
    &self,
    framework: &EffectiveFramework,
    section_id: u32,
    ctx: WriteContext<'_>,
  ) -> Option<SectionResult> {
    let section = framework.section(section_id)?;
    Some(self.write_section(section, ctx).await)
  }

  /// Generate all sections, assemble the report and attach its QA results.
  pub async fn write_report(
    &self,
    framework: &EffectiveFramework,
    ctx: WriteContext<'_>,
    progress: impl FnMut(Progress<'_>),
  ) -> Report {
    let sections = self.write_all_sections(framework, ctx, progress).await;
    let citations = ctx.citations.map(<[Citation]>::to_vec);
    let mut report = assemble_report(sections, ctx.profile, framework, citations);
    report.qa_results = Some(run_qa_checks(&report));
    info!(
      report_id = %report.id,
      words = report.word_count,
      status = ?report.status,
      "report assembled"
    );
    report
  }

  /// Regenerate one section of an existing report in place and refresh its
  /// QA results. Returns `false` if the framework has no such section.
  pub async fn regenerate_section(
    &self,
    report: &mut Report,
    framework: &EffectiveFramework,
    section_id: u32,
    ctx: WriteContext<'_>,
  ) -> bool {
    let Some(result) = self.write_only(framework, section_id, ctx).await else {
      return false;
    };
    report.replace_section(result);
    report.qa_results = Some(run_qa_checks(report));
    true
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Mutex,
    atomic::{AtomicU32, Ordering},
  };

  use irf_core::{
    framework::{SectorFramework, build_effective_framework},
    report::{ReportStatus, SectionStatus},
  };

  use super::*;

  #[derive(Debug, thiserror::Error)]
  #[error("service unavailable")]
  struct Unavailable;

  /// Scripted generator: fails the first `failures` calls, never answers
  /// when `hang` is set, otherwise echoes the section header.
  #[derive(Default)]
  struct FakeGenerator {
    failures: u32,
    hang:     bool,
    calls:    AtomicU32,
    prompts:  Mutex<Vec<String>>,
  }

  impl TextGenerator for FakeGenerator {
    type Error = Unavailable;

    async fn generate(&self, request: &GenerationRequest) -> Result<String, Unavailable> {
      let call = self.calls.fetch_add(1, Ordering::SeqCst);
      self.prompts.lock().unwrap().push(request.prompt.clone());
      if self.hang {
        std::future::pending::<()>().await;
      }
      if call < self.failures {
        return Err(Unavailable);
      }
      let header = request.prompt.lines().next().unwrap_or_default();
      Ok(format!("{header}\n\nRevenue grew 15% [1]."))
    }
  }

  fn config() -> WriterConfig {
    WriterConfig { api_key: "test-key".into(), ..WriterConfig::default() }
  }

  fn framework() -> EffectiveFramework {
    build_effective_framework(&SectorFramework::new("semiconductor_fabless", "Semi"))
  }

  fn profile() -> CompanyProfile { CompanyProfile::new("TEST").with_name("Test Corp") }

  #[tokio::test]
  async fn missing_api_key_skips_the_service() {
    let writer = SectionWriter::new(WriterConfig::default(), FakeGenerator::default());
    let fw = framework();
    let p = profile();
    let result = writer.write_section(&fw.sections[0], WriteContext::new(&p)).await;

    assert_eq!(result.status, SectionStatus::Error);
    assert!(result.error.as_deref().unwrap().starts_with("No API key configured"));
    assert_eq!(writer.generator.calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn generated_section_counts_words() {
    let writer = SectionWriter::new(config(), FakeGenerator::default());
    let fw = framework();
    let p = profile();
    let result = writer.write_section(&fw.sections[0], WriteContext::new(&p)).await;

    assert!(result.is_generated());
    assert_eq!(result.content, "# Section 1: Executive Summary\n\nRevenue grew 15% [1].");
    assert_eq!(result.word_count, 9);
    let prompts = writer.generator.prompts.lock().unwrap();
    assert!(prompts[0].contains("**Company:** Test Corp (TEST)"));
  }

  #[tokio::test]
  async fn transient_failure_is_retried() {
    let generator = FakeGenerator { failures: 1, ..FakeGenerator::default() };
    let writer = SectionWriter::new(config(), generator);
    let fw = framework();
    let p = profile();
    let result = writer.write_section(&fw.sections[1], WriteContext::new(&p)).await;

    assert!(result.is_generated());
    assert_eq!(writer.generator.calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn exhausted_attempts_fail_the_section() {
    let generator = FakeGenerator { failures: 5, ..FakeGenerator::default() };
    let writer = SectionWriter::new(WriterConfig { max_attempts: 3, ..config() }, generator);
    let fw = framework();
    let p = profile();
    let result = writer.write_section(&fw.sections[1], WriteContext::new(&p)).await;

    assert_eq!(result.status, SectionStatus::Error);
    assert_eq!(result.error.as_deref(), Some("service unavailable"));
    assert_eq!(writer.generator.calls.load(Ordering::SeqCst), 3);
  }

  #[tokio::test(start_paused = true)]
  async fn hung_call_times_out() {
    let generator = FakeGenerator { hang: true, ..FakeGenerator::default() };
    let writer = SectionWriter::new(config(), generator);
    let fw = framework();
    let p = profile();
    let result = writer.write_section(&fw.sections[2], WriteContext::new(&p)).await;

    assert_eq!(result.error.as_deref(), Some("generation timed out after 120s"));
    assert_eq!(writer.generator.calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn all_sections_in_order_with_progress() {
    let writer = SectionWriter::new(config(), FakeGenerator::default());
    let fw = framework();
    let p = profile();
    let mut events = Vec::new();
    let results = writer
      .write_all_sections(&fw, WriteContext::new(&p), |event| {
        events.push(match event {
          Progress::Started { section_id } => format!("start {section_id}"),
          Progress::Finished(r) => format!("done {}", r.section_id),
        })
      })
      .await;

    let ids: Vec<u32> = results.iter().map(|r| r.section_id).collect();
    assert_eq!(ids, (1..=11).collect::<Vec<_>>());
    assert_eq!(events.len(), 22);
    assert_eq!(events[0], "start 1");
    assert_eq!(events[1], "done 1");
  }

  #[tokio::test]
  async fn write_only_unknown_section_is_none() {
    let writer = SectionWriter::new(config(), FakeGenerator::default());
    let fw = framework();
    let p = profile();
    assert!(writer.write_only(&fw, 12, WriteContext::new(&p)).await.is_none());
    let result = writer.write_only(&fw, 7, WriteContext::new(&p)).await.unwrap();
    assert_eq!(result.section_id, 7);
  }

  #[tokio::test]
  async fn report_is_assembled_with_qa() {
    let writer = SectionWriter::new(config(), FakeGenerator::default());
    let fw = framework();
    let p = profile();
    let citations = vec![Citation::new("https://example.com", "Source")];
    let ctx = WriteContext::new(&p).with_citations(&citations);

    let report = writer.write_report(&fw, ctx, |_| {}).await;
    assert_eq!(report.status, ReportStatus::Complete);
    assert_eq!(report.sections.len(), 11);
    assert_eq!(report.citations[0].id, Some(1));
    let qa = report.qa_results.as_ref().unwrap();
    assert!(qa.citations.no_orphaned.pass);
    assert!(qa.structure.all_11_sections_present.pass);
  }

  #[tokio::test]
  async fn regeneration_replaces_failed_section() {
    let fw = framework();
    let p = profile();
    let offline = SectionWriter::new(WriterConfig::default(), FakeGenerator::default());
    let mut report = offline.write_report(&fw, WriteContext::new(&p), |_| {}).await;
    assert_eq!(report.status, ReportStatus::Draft);

    let online = SectionWriter::new(config(), FakeGenerator::default());
    assert!(online.regenerate_section(&mut report, &fw, 4, WriteContext::new(&p)).await);
    assert!(!online.regenerate_section(&mut report, &fw, 42, WriteContext::new(&p)).await);

    assert_eq!(report.sections.len(), 11);
    assert!(report.sections[3].is_generated());
    assert_eq!(report.word_count, report.sections[3].word_count);
    assert_eq!(report.status, ReportStatus::Draft);
    let qa = report.qa_results.as_ref().unwrap();
    assert!(!qa.structure.section_generation_status.pass);
  }
}
