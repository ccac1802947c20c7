//! Canned generators for exercising analyses without a network.

use super::{AnalyzerError, Conversation, TextGenerator};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays a fixed script of replies and records every conversation it saw
pub(crate) struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, AnalyzerError>>>,
    seen: Mutex<Vec<Conversation>>,
}

impl ScriptedGenerator {
    pub(crate) fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_results(replies.into_iter().map(|r| Ok(r.into())))
    }

    pub(crate) fn with_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<String, AnalyzerError>>,
    {
        Self {
            replies: Mutex::new(results.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub(crate) fn conversations(&self) -> Vec<Conversation> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, conversation: &Conversation) -> Result<String, AnalyzerError> {
        self.seen.lock().unwrap().push(conversation.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(AnalyzerError::EmptyResponse))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Answers each conversation with a closure over its last user turn
pub(crate) struct FnGenerator<F>(pub(crate) F);

#[async_trait]
impl<F> TextGenerator for FnGenerator<F>
where
    F: Fn(&str) -> Result<String, AnalyzerError> + Send + Sync,
{
    async fn generate(&self, conversation: &Conversation) -> Result<String, AnalyzerError> {
        let prompt = conversation.last_user_text().unwrap_or_default();
        (self.0)(&prompt)
    }

    fn model(&self) -> &str {
        "fn"
    }
}
