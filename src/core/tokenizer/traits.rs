use crate::core::{Result, TokenId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizerError {
    #[error("token id {0} is not in the vocabulary")]
    UnknownId(TokenId),
    #[error("tokenizer not found: {0}")]
    NotFound(String),
    #[error("failed to load tokenizer: {0}")]
    Load(String),
}

/// Id-to-token side of a tokenizer, which is all the engine adapter needs.
pub trait TokenVocab: Send + Sync {
    fn id_to_token(&self, id: TokenId) -> Option<String>;

    fn vocab_size(&self) -> usize;

    /// Maps a whole sequence, failing on the first id without a token.
    fn convert_ids_to_tokens(&self, ids: &[TokenId]) -> Result<Vec<String>> {
        ids.iter()
            .map(|&id| {
                self.id_to_token(id)
                    .ok_or_else(|| TokenizerError::UnknownId(id).into())
            })
            .collect()
    }
}
