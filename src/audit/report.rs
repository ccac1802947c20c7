use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    Accessibility,
    ContentClarity,
    WebDesign,
    Persona,
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuditKind::Accessibility => "accessibility",
            AuditKind::ContentClarity => "content_clarity",
            AuditKind::WebDesign => "web_design",
            AuditKind::Persona => "persona",
        };
        f.write_str(name)
    }
}

/// Result of one analysis run over one target
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport<T> {
    pub id: Uuid,
    pub kind: AuditKind,
    /// Page URL, file path, or screenshot URL that was analysed
    pub target: String,
    pub model: String,
    pub generated_at: DateTime<Utc>,
    pub chunk_count: usize,
    /// Chunks whose analysis failed and contributed nothing
    pub failed_chunks: usize,
    pub findings: T,
}

impl<T> AuditReport<T> {
    pub fn new(kind: AuditKind, target: &str, model: &str, findings: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            target: target.to_string(),
            model: model.to_string(),
            generated_at: Utc::now(),
            chunk_count: 0,
            failed_chunks: 0,
            findings,
        }
    }

    pub fn with_chunks(mut self, chunk_count: usize, failed_chunks: usize) -> Self {
        self.chunk_count = chunk_count;
        self.failed_chunks = failed_chunks;
        self
    }
}
