use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A clarity rewrite of one passage of page text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSuggestion {
    /// Text as it appears on the page
    pub original_content: String,
    /// Clearer replacement
    pub suggestion: String,
}

/// One WCAG 2.1 AA issue found in page markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilityFinding {
    #[serde(default, deserialize_with = "lenient_key")]
    pub key: u32,
    /// Short name for the issue, e.g. "Missing alt text"
    pub label: String,
    /// The offending markup, cited exactly
    pub original_content: String,
    /// Corrected markup
    pub revised_content: String,
    pub explanation: String,
}

/// A layout improvement derived from a page screenshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSuggestion {
    #[serde(default, deserialize_with = "lenient_key")]
    pub key: u32,
    /// Part of the page the suggestion applies to, e.g. "Homepage"
    pub area: String,
    pub suggestion: String,
    pub reason: String,
}

/// Records that carry a display key
pub trait Keyed {
    fn set_key(&mut self, key: u32);
}

impl Keyed for AccessibilityFinding {
    fn set_key(&mut self, key: u32) {
        self.key = key;
    }
}

impl Keyed for WebSuggestion {
    fn set_key(&mut self, key: u32) {
        self.key = key;
    }
}

/// Parse a model reply that should hold a JSON list of `T`.
///
/// Tolerates markdown fences, prose around the list, and a list that was
/// itself returned as a JSON string. Anything that still does not match the
/// schema is logged and yields an empty list.
pub fn parse_list<T: DeserializeOwned>(reply: &str) -> Vec<T> {
    match try_parse_list(reply) {
        Ok(items) => items,
        Err(reason) => {
            warn!(%reason, reply_len = reply.len(), "discarding unstructured model reply");
            Vec::new()
        }
    }
}

fn try_parse_list<T: DeserializeOwned>(reply: &str) -> Result<Vec<T>, String> {
    let trimmed = reply.trim();

    if let Ok(inner) = serde_json::from_str::<String>(trimmed) {
        return try_parse_list(&inner);
    }

    let json = json_array(trimmed).ok_or_else(|| "no JSON list in reply".to_string())?;
    serde_json::from_str(json).map_err(|e| e.to_string())
}

/// Slice from the first `[` to the last `]`
fn json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (start < end).then(|| &text[start..=end])
}

fn lenient_key<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Key {
        Number(u32),
        Text(String),
    }

    match Key::deserialize(deserializer)? {
        Key::Number(n) => Ok(n),
        Key::Text(s) => s.trim().parse().map_err(de::Error::custom),
    }
}
