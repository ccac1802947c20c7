use super::blocks::{self, Block};
use super::{ChunkMode, ChunkerConfig, region};
use crate::tokenizer::{self, Tokenizer, TokenizerError};
use scraper::{ElementRef, Html};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// A budget-compliant fragment of page content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Visible text or markup, depending on the chunking mode
    pub text: String,
    /// Metadata about the chunk
    pub metadata: ChunkMetadata,
}

/// Metadata for a chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkMetadata {
    /// Token count of `text` under the shared encoding
    pub token_count: usize,
    /// Tag of the block the chunk was cut from
    pub tag: String,
    /// Nesting depth below the content region (0 = direct child)
    pub depth: usize,
    /// True when the chunk came from token slicing rather than a block boundary
    pub fallback: bool,
}

/// Splits HTML documents into token-bounded chunks along structural boundaries
pub struct HtmlChunker {
    config: ChunkerConfig,
    tokenizer: Arc<Tokenizer>,
}

impl HtmlChunker {
    pub fn new(config: ChunkerConfig) -> Result<Self, TokenizerError> {
        Ok(Self::with_tokenizer(config, tokenizer::shared()?))
    }

    pub fn with_tokenizer(config: ChunkerConfig, tokenizer: Arc<Tokenizer>) -> Self {
        Self { config, tokenizer }
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Chunk one document. Never fails: a document without a content region,
    /// or whose region is empty, yields no chunks.
    pub fn chunk(&self, html: &str) -> Vec<Chunk> {
        let document = Html::parse_document(html);
        let regions = region::locate(&document, self.config.mode);
        if regions.is_empty() {
            debug!(mode = ?self.config.mode, "no content region found");
            return Vec::new();
        }

        let mut packer = Packer::new(&self.config, &self.tokenizer);
        for region in regions {
            packer.pack_region(region);
        }

        debug!(
            mode = ?self.config.mode,
            max_tokens = self.config.budget(),
            chunks = packer.chunks.len(),
            "chunked document"
        );
        packer.chunks
    }
}

/// Chunk `html` with the shared tokenizer.
pub fn chunk_html(html: &str, config: ChunkerConfig) -> Result<Vec<Chunk>, TokenizerError> {
    Ok(HtmlChunker::new(config)?.chunk(html))
}

/// One pass of the recursive packer: one block per chunk, recursing into
/// oversized blocks and slicing leaves that have no finer structure.
struct Packer<'c> {
    config: &'c ChunkerConfig,
    tokenizer: &'c Tokenizer,
    seen: HashSet<String>,
    chunks: Vec<Chunk>,
}

impl<'c> Packer<'c> {
    fn new(config: &'c ChunkerConfig, tokenizer: &'c Tokenizer) -> Self {
        Self {
            config,
            tokenizer,
            seen: HashSet::new(),
            chunks: Vec::new(),
        }
    }

    fn pack_region(&mut self, region: ElementRef<'_>) {
        if blocks::structural_children(region, self.config).next().is_some() {
            self.pack_children(region, 0);
            return;
        }

        // A region built only from inline content is treated as one block.
        if let Some(block) = Block::new(region, self.config.mode) {
            self.pack_block(block, 0);
        }
    }

    fn pack_children(&mut self, parent: ElementRef<'_>, depth: usize) {
        for block in blocks::blocks(parent, self.config) {
            self.pack_block(block, depth);
        }
    }

    fn pack_block(&mut self, block: Block<'_>, depth: usize) {
        let budget = self.config.budget();
        let token_count = self.tokenizer.count(&block.content);
        if token_count <= budget {
            // Only emitted content is recorded; an oversized wrapper must not
            // shadow the children that replace it.
            if self.config.dedupe
                && !self.seen.insert(dedupe_key(&block.content, self.config.mode))
            {
                debug!(tag = block.tag(), depth, "skipping duplicate block");
                return;
            }
            let tag = block.tag().to_string();
            self.push(block.content, token_count, tag, depth, false);
            return;
        }

        if blocks::structural_children(block.element, self.config)
            .next()
            .is_some()
        {
            debug!(tag = block.tag(), depth, token_count, "block over budget, descending");
            self.pack_children(block.element, depth + 1);
            return;
        }

        debug!(tag = block.tag(), depth, token_count, "leaf over budget, slicing tokens");
        let tag = block.tag().to_string();
        for piece in split_by_tokens(self.tokenizer, &block.content, budget) {
            let count = self.tokenizer.count(&piece);
            self.push(piece, count, tag.clone(), depth, true);
        }
    }

    fn push(&mut self, text: String, token_count: usize, tag: String, depth: usize, fallback: bool) {
        self.chunks.push(Chunk {
            text,
            metadata: ChunkMetadata {
                token_count,
                tag,
                depth,
                fallback,
            },
        });
    }
}

fn dedupe_key(content: &str, mode: ChunkMode) -> String {
    match mode {
        ChunkMode::Text => content.to_string(),
        ChunkMode::Markup => content.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

/// Slice `text` into contiguous windows of at most `max_tokens` tokens.
///
/// Windows are shrunk so that each decodes to whole characters and
/// re-tokenizes within budget, which keeps concatenation of the pieces
/// equal to `text`. Only a single character that alone needs more than
/// `max_tokens` tokens can produce an over-budget piece.
pub(crate) fn split_by_tokens(tokenizer: &Tokenizer, text: &str, max_tokens: usize) -> Vec<String> {
    let max_tokens = max_tokens.max(1);
    let tokens = tokenizer.encode(text);
    let mut pieces = Vec::with_capacity(tokens.len().div_ceil(max_tokens));
    let mut start = 0;

    while start < tokens.len() {
        let (piece, end) = next_window(tokenizer, &tokens, start, max_tokens);
        pieces.push(piece);
        start = end;
    }

    pieces
}

fn next_window(tokenizer: &Tokenizer, tokens: &[u32], start: usize, max_tokens: usize) -> (String, usize) {
    let limit = (start + max_tokens).min(tokens.len());

    for end in (start + 1..=limit).rev() {
        if let Ok(piece) = tokenizer.decode(&tokens[start..end]) {
            if tokenizer.count(&piece) <= max_tokens {
                return (piece, end);
            }
        }
    }

    for end in limit + 1..=tokens.len() {
        if let Ok(piece) = tokenizer.decode(&tokens[start..end]) {
            return (piece, end);
        }
    }

    // Only reachable if `tokens` did not come from valid UTF-8.
    (String::new(), tokens.len())
}
