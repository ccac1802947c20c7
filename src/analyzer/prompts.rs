//! Instruction text sent alongside page content.

/// Reply that ends an accessibility review
pub(crate) const DONE_MARKER: &str = "DONE";

pub(crate) const WEB_DESIGN_SYSTEM: &str = "You are an expert in web design and accessibility. \
Analyze the screenshot and give WCAG-compliant layout suggestions.";

pub(crate) fn find_issue(html: &str, already_reported: &[String]) -> String {
    let mut prompt = format!(
        "You are a strict accessibility reviewer analyzing the following HTML:\n{html}\n\n\
         Identify one real accessibility issue under WCAG 2.1 AA. Do not invent problems and \
         do not cite markup that is already correct.\n\
         - Reply with the exact offending HTML only, copied from the input.\n\
         - If you cannot cite the exact HTML, do not report the issue.\n\
         - If there are no issues, reply with {DONE_MARKER}.\n\
         - No explanation and no extra text.\n\n\
         Examples of valid replies:\n\
         <img src=\"images/banner.png\" alt=\"\">\n\
         <button></button>\n\
         <a href=\"#\">Click here</a>\n\
         <div onclick=\"openMenu()\">Menu</div>"
    );

    if !already_reported.is_empty() {
        prompt.push_str("\n\nThese issues were already reported; do not repeat them:\n");
        for issue in already_reported {
            prompt.push_str(issue);
            prompt.push('\n');
        }
    }

    prompt
}

pub(crate) fn suggest(issue: &str) -> String {
    format!(
        "Provide corrected HTML for the issue you identified:\n{issue}\n\n\
         - Reply with the improved HTML only, no extra text and no explanation.\n\
         - If no improvement is possible, reply with an empty message.\n\n\
         Examples of valid replies:\n\
         <img src=\"images/banner.png\" alt=\"Voters lined up outside a polling place\">\n\
         <button aria-label=\"Submit form\"></button>\n\
         <a href=\"/reports\">View the full election report</a>"
    )
}

pub(crate) fn explain(issue: &str, suggestion: &str) -> String {
    format!(
        "Explain in one or two sentences why replacing\n{issue}\nwith\n{suggestion}\n\
         improves accessibility, citing the relevant WCAG 2.1 success criterion.\n\
         If no explanation can be given, reply with an empty message.\n\n\
         Example: Adding alt text gives screen reader users a text alternative, meeting \
         WCAG 2.1 success criterion 1.1.1 (Non-text Content)."
    )
}

pub(crate) fn label(issue: &str, suggestion: &str, explanation: &str) -> String {
    format!(
        "Give a short label (at most six words) for this accessibility fix.\n\
         Issue: {issue}\nFix: {suggestion}\nExplanation: {explanation}\n\
         Reply with the label only, or an empty message if none applies.\n\n\
         Examples: Missing alt text for image; Button lacks accessible name; \
         Non-descriptive link text"
    )
}

pub(crate) fn content_clarity(section: &str, guidelines: &str, max: usize) -> String {
    format!(
        "You are a professional content clarity editor. Analyze this website section:\n\
         {section}\n\n\
         Suggest improvements to the clarity of the text according to these guidelines:\n\
         {guidelines}\n\n\
         - Only include real passages where clarity clearly needs improvement \
         (vague language, long sentences, jargon).\n\
         - At most {max} suggestions.\n\
         - No explanation, reasoning, or commentary.\n\
         - Reply with a raw JSON list only, not a string and not inside a code block:\n\
         [{{\"original_content\": \"...\", \"suggestion\": \"...\"}}]\n\
         If nothing needs to change, reply with []."
    )
}

pub(crate) fn web_design(guidelines: &str) -> String {
    format!(
        "Review the layout of this webpage screenshot against these guidelines:\n\
         {guidelines}\n\n\
         For each suggestion name the specific part of the page it applies to and cite the \
         guideline it follows. Leave out anything you cannot tie to a visible element. \
         Every suggestion must be actionable and specific.\n\
         Reply with a raw JSON list only:\n\
         [{{\"key\": 1, \"area\": \"Homepage\", \"suggestion\": \"Add a clear call-to-action button\", \
         \"reason\": \"Guides users to key content\"}}]"
    )
}

pub(crate) fn persona_audit(content: &str, persona: &str) -> String {
    format!(
        "Look at the following website content:\n{content}\n\n\
         Audit this page for the following user persona: {persona}\n\
         Describe what works for this persona, what gets in their way, and what to change."
    )
}
