pub mod traits;
pub mod huggingface;

pub use traits::{TokenVocab, TokenizerError};
pub use huggingface::{HfTokenizer, TokenizerOptions};
