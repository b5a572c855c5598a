use super::runner::Ct2Model;
use crate::core::engine::{EngineRegistry, REGISTRY};
use crate::core::tensor::Device;
use crate::core::tokenizer::{HfTokenizer, TokenizerOptions};
use crate::core::Result;
use std::path::Path;
use tracing::info;

pub const CTRANSLATE2: &str = "ctranslate2";

/// Builds a [`Ct2Model`] from a converted model directory and a tokenizer
/// identifier, using engines registered in the process-wide registry.
pub fn ctranslate2(
    model_path: impl AsRef<Path>,
    tokenizer_name: &str,
    device: Option<Device>,
    tokenizer_options: TokenizerOptions,
) -> Result<Ct2Model> {
    ctranslate2_with(&REGISTRY, model_path, tokenizer_name, device, tokenizer_options)
}

pub fn ctranslate2_with(
    registry: &EngineRegistry,
    model_path: impl AsRef<Path>,
    tokenizer_name: &str,
    device: Option<Device>,
    tokenizer_options: TokenizerOptions,
) -> Result<Ct2Model> {
    let loader = registry.require(CTRANSLATE2)?;

    let model_path = model_path.as_ref();
    let device = device.unwrap_or_default();

    let model = loader(model_path, &device)?;
    let tokenizer = HfTokenizer::load(tokenizer_name, &tokenizer_options)?;

    info!(
        "Built {} model from {} with tokenizer {} on {}",
        CTRANSLATE2,
        model_path.display(),
        tokenizer_name,
        device
    );
    Ok(Ct2Model::new(model, Box::new(tokenizer), Some(device)))
}
