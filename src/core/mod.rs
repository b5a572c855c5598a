pub mod engine;
pub mod tokenizer;
pub mod tensor;

pub use engine::{EngineRegistry, EngineUnavailable, Generator, NestedLogits};
pub use tokenizer::{HfTokenizer, TokenVocab, TokenizerError, TokenizerOptions};
pub use tensor::{Device, DeviceParseError, LogitsArray, LogitsError};

pub type TokenId = u32;

pub type Result<T> = anyhow::Result<T>;
