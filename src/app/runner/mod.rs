use crate::core::engine::{Generator, NestedLogits};
use crate::core::tensor::{self, Device};
use crate::core::tokenizer::TokenVocab;
use crate::core::Result;
use candle_core::{DType, Tensor};
use tracing::{debug, trace};

/// Token ids plus attention mask in, next-token logits `(batch, vocab)` out.
pub trait LogitsModel {
    fn forward(&self, input_ids: &Tensor, attention_mask: &Tensor) -> Result<Tensor>;
}

/// Next-token logits from a CTranslate2-style engine that speaks token
/// strings rather than ids.
pub struct Ct2Model {
    model: Box<dyn Generator>,
    tokenizer: Box<dyn TokenVocab>,
    device: Device,
}

impl Ct2Model {
    pub fn new(model: Box<dyn Generator>, tokenizer: Box<dyn TokenVocab>, device: Option<Device>) -> Self {
        Self {
            model,
            tokenizer,
            device: device.unwrap_or_default(),
        }
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn tokenizer(&self) -> &dyn TokenVocab {
        self.tokenizer.as_ref()
    }

    pub fn model(&self) -> &dyn Generator {
        self.model.as_ref()
    }

    /// `input_ids` is `(batch, seq)` of any integer dtype. `attention_mask` is
    /// accepted for call compatibility and not read.
    pub fn forward(&self, input_ids: &Tensor, _attention_mask: &Tensor) -> Result<Tensor> {
        let ids = input_ids.to_dtype(DType::U32)?.to_vec2::<u32>()?;

        let tokens = ids
            .iter()
            .map(|seq| self.tokenizer.convert_ids_to_tokens(seq))
            .collect::<Result<Vec<_>>>()?;
        trace!("Converted {} sequences to tokens", tokens.len());

        let raw = self.model.forward_batch(&tokens, true)?;
        let raw = densify_for_cpu(&self.device, raw)?;
        let logits = raw.to_tensor()?;
        debug!(
            "Engine returned logits {:?} for batch {} on {}",
            logits.dims(),
            ids.len(),
            self.device
        );

        tensor::last_position(&logits)
    }
}

impl LogitsModel for Ct2Model {
    fn forward(&self, input_ids: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        Ct2Model::forward(self, input_ids, attention_mask)
    }
}

/// On CPU the engine's nested output must be copied into a dense array before
/// tensor conversion, otherwise the values come out wrong
/// (OpenNMT/CTranslate2#1386). Other devices pass through.
fn densify_for_cpu(device: &Device, raw: Box<dyn NestedLogits>) -> Result<Box<dyn NestedLogits>> {
    if !device.is_cpu() {
        return Ok(raw);
    }
    trace!("Densifying engine logits on cpu");
    Ok(Box::new(raw.to_dense()?))
}
