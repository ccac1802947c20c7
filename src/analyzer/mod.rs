//! Generative-text collaborator: model clients, structured replies, and the
//! page analyses built on top of them.

mod client;
mod conversation;
mod error;
mod pipeline;
mod prompts;
mod reviews;
mod structured;
mod types;

#[cfg(test)]
pub(crate) mod testing;


use async_trait::async_trait;

pub use client::{AnthropicClient, OpenAiClient, build_generator};
pub use conversation::{ContentPart, Conversation, Message, Role};
pub use error::AnalyzerError;
pub use pipeline::{ReviewOutcome, ReviewPipeline, ReviewStep};
pub use reviews::{
    MAX_CLARITY_SUGGESTIONS, ReviewOptions, accessibility_review, content_clarity, persona_audit,
    web_design,
};
pub use structured::{AccessibilityFinding, ContentSuggestion, Keyed, WebSuggestion, parse_list};

/// A hosted model that turns a conversation into its next reply
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce the assistant's next turn for `conversation`
    async fn generate(&self, conversation: &Conversation) -> Result<String, AnalyzerError>;

    /// Model identifier, for logs and reports
    fn model(&self) -> &str;
}
