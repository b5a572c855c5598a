//! Next-token logits over a pre-compiled CTranslate2-style generation engine.
//!
//! The engine and tokenizer are opaque collaborators: [`core::engine::Generator`]
//! scores batches of token strings and [`core::tokenizer::TokenVocab`] maps ids
//! back to tokens. [`app::Ct2Model`] glues them into a [`app::LogitsModel`].

pub mod core;
pub mod app;
pub mod envconfig;

pub use crate::core::{
    Device, EngineRegistry, EngineUnavailable, Generator, HfTokenizer, LogitsArray, LogitsError,
    NestedLogits, Result, TokenId, TokenVocab, TokenizerError, TokenizerOptions,
};

pub use crate::app::{ctranslate2, ctranslate2_with, Ct2Model, LogitsModel};
