use super::pipeline::{ReviewOutcome, ReviewPipeline};
use super::prompts;
use super::structured::{AccessibilityFinding, ContentSuggestion, WebSuggestion, parse_list};
use super::{AnalyzerError, ContentPart, Conversation, TextGenerator};
use crate::config::AppConfig;
use tracing::{debug, warn};

/// Upper bound on clarity rewrites kept per text chunk
pub const MAX_CLARITY_SUGGESTIONS: usize = 5;

/// Knobs for the multi-turn accessibility review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOptions {
    /// Review passes per chunk
    pub max_issues: usize,
    /// Extra attempts per step after a transport failure
    pub step_retries: usize,
}

impl Default for ReviewOptions {
    fn default() -> Self {
        Self {
            max_issues: 1,
            step_retries: 1,
        }
    }
}

impl From<&AppConfig> for ReviewOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_issues: config.max_issues,
            step_retries: config.step_retries,
        }
    }
}

/// Review one markup chunk for WCAG issues.
///
/// Runs up to `max_issues` passes, feeding each reported issue back so the
/// model moves on. A transport failure is returned only if nothing was found
/// before it.
pub async fn accessibility_review(
    generator: &dyn TextGenerator,
    html: &str,
    options: &ReviewOptions,
) -> Result<Vec<AccessibilityFinding>, AnalyzerError> {
    let pipeline = ReviewPipeline::new(generator).step_retries(options.step_retries);
    let mut findings: Vec<AccessibilityFinding> = Vec::new();
    let mut reported: Vec<String> = Vec::new();

    for pass in 0..options.max_issues {
        let outcome = match pipeline.run(html, &reported).await {
            Ok(outcome) => outcome,
            Err(e) if findings.is_empty() => return Err(e),
            Err(e) => {
                warn!(pass, error = %e, "review aborted, keeping earlier findings");
                break;
            }
        };

        match outcome {
            ReviewOutcome::Found(finding) => {
                reported.push(finding.original_content.clone());
                findings.push(finding);
            }
            ReviewOutcome::NoIssue => break,
            ReviewOutcome::Duplicate(issue) => {
                debug!(pass, %issue, "skipping issue already reported");
            }
            ReviewOutcome::Incomplete(step) => {
                debug!(pass, %step, "review pass ended early");
            }
        }
    }

    Ok(findings)
}

/// Suggest clearer wording for one text chunk
pub async fn content_clarity(
    generator: &dyn TextGenerator,
    section: &str,
    guidelines: &str,
) -> Result<Vec<ContentSuggestion>, AnalyzerError> {
    let conversation = Conversation::new().user(prompts::content_clarity(
        section,
        guidelines,
        MAX_CLARITY_SUGGESTIONS,
    ));
    let reply = generator.generate(&conversation).await?;

    let mut suggestions: Vec<ContentSuggestion> = parse_list(&reply);
    suggestions.retain(|s| {
        let original = s.original_content.trim();
        let revised = s.suggestion.trim();
        !original.is_empty() && !revised.is_empty() && original != revised
    });
    suggestions.truncate(MAX_CLARITY_SUGGESTIONS);
    Ok(suggestions)
}

/// Layout suggestions for a page screenshot reachable at `screenshot_url`
pub async fn web_design(
    generator: &dyn TextGenerator,
    screenshot_url: &str,
    guidelines: &str,
) -> Result<Vec<WebSuggestion>, AnalyzerError> {
    let conversation = Conversation::new()
        .with_system(prompts::WEB_DESIGN_SYSTEM)
        .user_parts(vec![
            ContentPart::Text(prompts::web_design(guidelines)),
            ContentPart::ImageUrl(screenshot_url.to_string()),
        ]);
    let reply = generator.generate(&conversation).await?;
    Ok(parse_list(&reply))
}

/// Free-text audit of a page's source for one user persona
pub async fn persona_audit(
    generator: &dyn TextGenerator,
    source: &str,
    persona: &str,
) -> Result<String, AnalyzerError> {
    let conversation = Conversation::new().user(prompts::persona_audit(source, persona));
    let reply = generator.generate(&conversation).await?;
    Ok(reply.trim().to_string())
}
