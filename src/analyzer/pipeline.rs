use super::prompts::{self, DONE_MARKER};
use super::structured::AccessibilityFinding;
use super::{AnalyzerError, Conversation, TextGenerator};
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// One model turn of an accessibility review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStep {
    FindIssue,
    Suggest,
    Explain,
    Label,
}

impl fmt::Display for ReviewStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReviewStep::FindIssue => "find_issue",
            ReviewStep::Suggest => "suggest",
            ReviewStep::Explain => "explain",
            ReviewStep::Label => "label",
        };
        f.write_str(name)
    }
}

/// How one pass through the review ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The model reported no (further) issues
    NoIssue,
    /// The model cited markup that was already reported
    Duplicate(String),
    /// The model gave up at this step
    Incomplete(ReviewStep),
    Found(AccessibilityFinding),
}

enum Stage {
    FindIssue,
    Suggest {
        issue: String,
    },
    Explain {
        issue: String,
        suggestion: String,
    },
    Label {
        issue: String,
        suggestion: String,
        explanation: String,
    },
    Done(ReviewOutcome),
}

/// Issue → fix → explanation → label, over one growing conversation.
///
/// A `DONE` or empty reply at any step ends the pass. Each step is retried
/// on transport failure up to `step_retries` extra times.
pub struct ReviewPipeline<'g> {
    generator: &'g dyn TextGenerator,
    step_retries: usize,
}

impl<'g> ReviewPipeline<'g> {
    pub fn new(generator: &'g dyn TextGenerator) -> Self {
        Self {
            generator,
            step_retries: 1,
        }
    }

    pub fn step_retries(mut self, retries: usize) -> Self {
        self.step_retries = retries;
        self
    }

    /// Run one pass over `html`, steering the model away from `reported`
    pub async fn run(&self, html: &str, reported: &[String]) -> Result<ReviewOutcome, AnalyzerError> {
        let mut conversation = Conversation::new();
        let mut stage = Stage::FindIssue;

        loop {
            stage = match stage {
                Stage::FindIssue => {
                    let prompt = prompts::find_issue(html, reported);
                    match self.ask(&mut conversation, ReviewStep::FindIssue, prompt).await? {
                        None => Stage::Done(ReviewOutcome::NoIssue),
                        Some(issue) if already_reported(&issue, reported) => {
                            Stage::Done(ReviewOutcome::Duplicate(issue))
                        }
                        Some(issue) => Stage::Suggest { issue },
                    }
                }
                Stage::Suggest { issue } => {
                    let prompt = prompts::suggest(&issue);
                    match self.ask(&mut conversation, ReviewStep::Suggest, prompt).await? {
                        None => Stage::Done(ReviewOutcome::Incomplete(ReviewStep::Suggest)),
                        Some(suggestion) => Stage::Explain { issue, suggestion },
                    }
                }
                Stage::Explain { issue, suggestion } => {
                    let prompt = prompts::explain(&issue, &suggestion);
                    match self.ask(&mut conversation, ReviewStep::Explain, prompt).await? {
                        None => Stage::Done(ReviewOutcome::Incomplete(ReviewStep::Explain)),
                        Some(explanation) => Stage::Label {
                            issue,
                            suggestion,
                            explanation,
                        },
                    }
                }
                Stage::Label {
                    issue,
                    suggestion,
                    explanation,
                } => {
                    let prompt = prompts::label(&issue, &suggestion, &explanation);
                    match self.ask(&mut conversation, ReviewStep::Label, prompt).await? {
                        None => Stage::Done(ReviewOutcome::Incomplete(ReviewStep::Label)),
                        Some(label) => Stage::Done(ReviewOutcome::Found(AccessibilityFinding {
                            key: 0,
                            label,
                            original_content: issue,
                            revised_content: suggestion,
                            explanation,
                        })),
                    }
                }
                Stage::Done(outcome) => return Ok(outcome),
            };
        }
    }

    /// Send `prompt` as the next user turn. `None` means the step ended the pass.
    async fn ask(
        &self,
        conversation: &mut Conversation,
        step: ReviewStep,
        prompt: String,
    ) -> Result<Option<String>, AnalyzerError> {
        conversation.push_user(prompt);
        let reply = self.generate_with_retry(conversation, step).await?;
        let cleaned = clean_reply(&reply);

        if cleaned.is_empty() || is_done_marker(cleaned) {
            debug!(%step, "review ended by model");
            return Ok(None);
        }

        conversation.push_assistant(reply.trim());
        Ok(Some(cleaned.to_string()))
    }

    async fn generate_with_retry(
        &self,
        conversation: &Conversation,
        step: ReviewStep,
    ) -> Result<String, AnalyzerError> {
        let mut attempt = 0;
        loop {
            match self.generator.generate(conversation).await {
                Ok(reply) => return Ok(reply),
                Err(e) if attempt < self.step_retries => {
                    attempt += 1;
                    warn!(%step, attempt, error = %e, "review step failed, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn already_reported(issue: &str, reported: &[String]) -> bool {
    let issue = normalize(issue);
    reported.iter().any(|r| normalize(r) == issue)
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim whitespace and one layer of wrapping quotes or backticks
pub(crate) fn clean_reply(reply: &str) -> &str {
    let mut text = reply.trim();
    if let Some(inner) = text
        .strip_prefix("```html")
        .or_else(|| text.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
    {
        return inner.trim();
    }
    for quote in ['"', '\'', '`'] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            text = text[1..text.len() - 1].trim();
            break;
        }
    }
    text
}

pub(crate) fn is_done_marker(reply: &str) -> bool {
    reply
        .trim_matches(|c: char| !c.is_alphanumeric())
        .eq_ignore_ascii_case(DONE_MARKER)
}

#[cfg(test)]
mod reply_tests {
    use super::*;

    #[test]
    fn test_clean_reply() {
        assert_eq!(clean_reply("  <img src=\"a.png\">  "), "<img src=\"a.png\">");
        assert_eq!(clean_reply("`<button></button>`"), "<button></button>");
        assert_eq!(clean_reply("```html\n<a href=\"#\">x</a>\n```"), "<a href=\"#\">x</a>");
        assert_eq!(clean_reply("\"\""), "");
    }

    #[test]
    fn test_done_marker() {
        assert!(is_done_marker("DONE"));
        assert!(is_done_marker("done."));
        assert!(is_done_marker("**Done**"));
        assert!(!is_done_marker("<div>DONE</div>"));
        assert!(!is_done_marker("Not done yet"));
    }
}
