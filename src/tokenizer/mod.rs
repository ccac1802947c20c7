//! BPE token accounting used to keep chunks inside a model's context budget.
//!
//! Counts and slices with `cl100k_base`, the encoding the downstream models
//! are budgeted against. Loading the encoding tables is expensive, so callers
//! normally go through [`shared`].


use once_cell::sync::Lazy;
use std::sync::Arc;
use thiserror::Error;
use tiktoken_rs::CoreBPE;

/// Name of the encoding table every count in this crate is made against.
pub const ENCODING: &str = "cl100k_base";

static SHARED: Lazy<Result<Arc<Tokenizer>, String>> =
    Lazy::new(|| Tokenizer::new().map(Arc::new).map_err(|e| e.to_string()));

#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("Failed to load {encoding} encoding: {cause}")]
    Load {
        encoding: &'static str,
        cause: String,
    },

    #[error("Failed to decode {count} tokens: {cause}")]
    Decode { count: usize, cause: String },
}

/// Process-wide tokenizer, created on first use.
pub fn shared() -> Result<Arc<Tokenizer>, TokenizerError> {
    match &*SHARED {
        Ok(tokenizer) => Ok(Arc::clone(tokenizer)),
        Err(cause) => Err(TokenizerError::Load {
            encoding: ENCODING,
            cause: cause.clone(),
        }),
    }
}

/// Deterministic encoder/decoder over a fixed encoding table.
pub struct Tokenizer {
    bpe: CoreBPE,
}

impl Tokenizer {
    /// Build a standalone instance. Prefer [`shared`] outside of tests.
    pub fn new() -> Result<Self, TokenizerError> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| TokenizerError::Load {
            encoding: ENCODING,
            cause: e.to_string(),
        })?;
        Ok(Self { bpe })
    }

    /// Number of tokens `text` occupies. Special-token text is counted as
    /// ordinary text.
    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    pub fn encode(&self, text: &str) -> Vec<u32> {
        self.bpe.encode_ordinary(text)
    }

    /// Decode a token run back to text.
    ///
    /// Fails when the run starts or ends inside a multi-byte character.
    pub fn decode(&self, tokens: &[u32]) -> Result<String, TokenizerError> {
        self.bpe
            .decode(tokens.to_vec())
            .map_err(|e| TokenizerError::Decode {
                count: tokens.len(),
                cause: e.to_string(),
            })
    }
}
