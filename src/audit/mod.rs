//! Page audits: fetch, chunk, fan out model calls, collect a report.

mod report;


pub use report::{AuditKind, AuditReport};

use crate::analyzer::{
    self, AccessibilityFinding, AnalyzerError, ContentSuggestion, Keyed, ReviewOptions,
    TextGenerator, WebSuggestion,
};
use crate::chunker::{Chunk, ChunkerConfig, HtmlChunker};
use crate::config::AppConfig;
use crate::fanout::fan_out;
use crate::fetcher::{FetchError, PageFetcher};
use crate::tokenizer::TokenizerError;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Used when no clarity guideline file is given
pub const DEFAULT_CLARITY_GUIDELINES: &str = "\
Use plain language and common words. Prefer short sentences of 20 words or fewer. \
Put the most important information first. Use active voice. Define acronyms and \
jargon on first use. Address the reader directly. Keep one idea per paragraph.";

/// Used when no layout guideline file is given
pub const DEFAULT_LAYOUT_GUIDELINES: &str = "\
Establish a clear visual hierarchy with distinct heading levels. Keep navigation \
consistent and predictable. Provide a prominent call to action. Maintain text contrast \
of at least 4.5:1. Group related content and leave enough whitespace between groups. \
Keep line length readable and make interactive targets at least 24 by 24 pixels.";

#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),

    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),
}

/// Runs the page analyses with one model client and one configuration
pub struct Auditor {
    fetcher: PageFetcher,
    generator: Arc<dyn TextGenerator>,
    config: AppConfig,
}

impl Auditor {
    /// Build the model client named by `config.model`
    pub fn new(config: AppConfig) -> Result<Self, AuditError> {
        let generator = analyzer::build_generator(&config.model)?;
        Self::with_generator(config, generator)
    }

    pub fn with_generator(
        config: AppConfig,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<Self, AuditError> {
        Ok(Self {
            fetcher: PageFetcher::new()?,
            generator,
            config,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// WCAG review of each markup chunk of the page at `target`
    pub async fn accessibility(
        &self,
        target: &str,
    ) -> Result<AuditReport<Vec<AccessibilityFinding>>, AuditError> {
        let html = self.fetcher.load_or_empty(target).await;
        self.accessibility_html(target, &html).await
    }

    pub async fn accessibility_html(
        &self,
        target: &str,
        html: &str,
    ) -> Result<AuditReport<Vec<AccessibilityFinding>>, AuditError> {
        let chunks = self.chunk(ChunkerConfig::markup(), html)?;
        let chunk_count = chunks.len();
        let generator = self.generator.as_ref();
        let options = &ReviewOptions::from(&self.config);

        let outcome = fan_out(chunks, self.config.workers, |chunk: Chunk| async move {
            analyzer::accessibility_review(generator, &chunk.text, options).await
        })
        .await;
        let failed = outcome.failed();

        let mut findings = outcome.flatten();
        renumber(&mut findings);
        info!(%target, chunks = chunk_count, findings = findings.len(), "accessibility audit done");

        Ok(self
            .report(AuditKind::Accessibility, target, findings)
            .with_chunks(chunk_count, failed))
    }

    /// Clarity rewrites for each text chunk of the page at `target`
    pub async fn content_clarity(
        &self,
        target: &str,
        guidelines: &str,
    ) -> Result<AuditReport<Vec<ContentSuggestion>>, AuditError> {
        let html = self.fetcher.load_or_empty(target).await;
        self.content_clarity_html(target, &html, guidelines).await
    }

    pub async fn content_clarity_html(
        &self,
        target: &str,
        html: &str,
        guidelines: &str,
    ) -> Result<AuditReport<Vec<ContentSuggestion>>, AuditError> {
        let chunks = self.chunk(ChunkerConfig::text(), html)?;
        let chunk_count = chunks.len();
        let generator = self.generator.as_ref();

        let outcome = fan_out(chunks, self.config.workers, |chunk: Chunk| async move {
            analyzer::content_clarity(generator, &chunk.text, guidelines).await
        })
        .await;
        let failed = outcome.failed();

        let suggestions = outcome.flatten();
        info!(%target, chunks = chunk_count, suggestions = suggestions.len(), "clarity audit done");

        Ok(self
            .report(AuditKind::ContentClarity, target, suggestions)
            .with_chunks(chunk_count, failed))
    }

    /// Layout review of a screenshot the model can fetch from `screenshot_url`
    pub async fn web_design(
        &self,
        screenshot_url: &str,
        guidelines: &str,
    ) -> Result<AuditReport<Vec<WebSuggestion>>, AuditError> {
        let mut suggestions =
            analyzer::web_design(self.generator.as_ref(), screenshot_url, guidelines).await?;
        renumber(&mut suggestions);
        info!(%screenshot_url, suggestions = suggestions.len(), "web design audit done");

        Ok(self.report(AuditKind::WebDesign, screenshot_url, suggestions))
    }

    /// Persona walkthrough of each text chunk of the page at `target`
    pub async fn persona(
        &self,
        target: &str,
        persona: &str,
    ) -> Result<AuditReport<Vec<String>>, AuditError> {
        let html = self.fetcher.load_or_empty(target).await;
        self.persona_html(target, &html, persona).await
    }

    pub async fn persona_html(
        &self,
        target: &str,
        html: &str,
        persona: &str,
    ) -> Result<AuditReport<Vec<String>>, AuditError> {
        let chunks = self.chunk(ChunkerConfig::text(), html)?;
        let chunk_count = chunks.len();
        let generator = self.generator.as_ref();

        let outcome = fan_out(chunks, self.config.workers, |chunk: Chunk| async move {
            analyzer::persona_audit(generator, &chunk.text, persona).await
        })
        .await;
        let failed = outcome.failed();

        let notes: Vec<String> = outcome
            .results
            .into_iter()
            .filter(|note| !note.is_empty())
            .collect();
        info!(%target, chunks = chunk_count, "persona audit done");

        Ok(self
            .report(AuditKind::Persona, target, notes)
            .with_chunks(chunk_count, failed))
    }

    fn chunk(&self, config: ChunkerConfig, html: &str) -> Result<Vec<Chunk>, AuditError> {
        let chunker = HtmlChunker::new(config.max_tokens(self.config.token_budget))?;
        Ok(chunker.chunk(html))
    }

    fn report<T>(&self, kind: AuditKind, target: &str, findings: T) -> AuditReport<T> {
        AuditReport::new(kind, target, self.generator.model(), findings)
    }
}

/// Number records 1..=n in report order
fn renumber<T: Keyed>(items: &mut [T]) {
    for (i, item) in items.iter_mut().enumerate() {
        item.set_key(i as u32 + 1);
    }
}
