// Public API exports
pub mod analyzer;
pub mod audit;
pub mod chunker;
pub mod config;
pub mod fanout;
pub mod fetcher;
pub mod tokenizer;

// Re-export main types for convenience
pub use tokenizer::{Tokenizer, TokenizerError};

pub use chunker::{
    Chunk, ChunkMetadata, ChunkMode, ChunkerConfig, DEFAULT_TOKEN_BUDGET, HtmlChunker, chunk_html,
};

pub use fetcher::{FetchError, PageFetcher, PageSource};

pub use analyzer::{
    AccessibilityFinding, AnalyzerError, ContentSuggestion, Conversation, TextGenerator,
    WebSuggestion, build_generator,
};

pub use fanout::{DEFAULT_WORKERS, FanOutResult, fan_out};

pub use audit::{AuditError, AuditKind, AuditReport, Auditor};

pub use config::{AppConfig, ConfigError, ModelBackend, ModelConfig};
