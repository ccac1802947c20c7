mod blocks;
mod region;
mod splitter;

#[cfg(test)]
mod tests;

pub use splitter::{Chunk, ChunkMetadata, HtmlChunker, chunk_html};

/// Default per-chunk token budget
pub const DEFAULT_TOKEN_BUDGET: usize = 5000;

/// Tags treated as structural splitting units
pub const DEFAULT_BLOCK_TAGS: &[&str] = &["section", "div", "article", "li"];

/// Class/id values marking navigation and footer boilerplate
pub const DEFAULT_STOPLIST: &[&str] = &["nav", "navbar", "footer", "sidebar"];

/// What a chunk carries: visible text or the original markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkMode {
    /// Visible text of the main content region
    Text,
    /// Serialized HTML of the `<head>` and `<body>` children
    Markup,
}

/// Chunking policy for one call
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    pub mode: ChunkMode,
    /// Maximum tokens per emitted chunk (values below 1 are treated as 1)
    pub max_tokens: usize,
    pub block_tags: Vec<String>,
    /// Blocks whose class or id equals one of these are dropped
    pub stoplist: Vec<String>,
    /// Drop blocks whose normalized content was already seen
    pub dedupe: bool,
}

impl ChunkerConfig {
    /// Text preset: main/body region, boilerplate filtered, duplicates dropped
    pub fn text() -> Self {
        Self {
            mode: ChunkMode::Text,
            max_tokens: DEFAULT_TOKEN_BUDGET,
            block_tags: to_owned(DEFAULT_BLOCK_TAGS),
            stoplist: to_owned(DEFAULT_STOPLIST),
            dedupe: true,
        }
    }

    /// Markup preset: head/body children, nothing filtered
    pub fn markup() -> Self {
        Self {
            mode: ChunkMode::Markup,
            max_tokens: DEFAULT_TOKEN_BUDGET,
            block_tags: to_owned(DEFAULT_BLOCK_TAGS),
            stoplist: Vec::new(),
            dedupe: false,
        }
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn block_tags(mut self, tags: &[&str]) -> Self {
        self.block_tags = to_owned(tags);
        self
    }

    pub fn stoplist(mut self, keywords: &[&str]) -> Self {
        self.stoplist = to_owned(keywords);
        self
    }

    pub fn dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    pub(crate) fn budget(&self) -> usize {
        self.max_tokens.max(1)
    }

    pub(crate) fn is_block_tag(&self, name: &str) -> bool {
        self.block_tags.iter().any(|tag| tag.eq_ignore_ascii_case(name))
    }

    pub(crate) fn is_stopword(&self, value: &str) -> bool {
        self.stoplist.iter().any(|keyword| keyword == value)
    }
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self::text()
    }
}

fn to_owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
