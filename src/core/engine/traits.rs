use crate::core::tensor::{self, LogitsArray, LogitsError};
use crate::core::Result;

/// Raw per-position scores as an engine hands them back, shaped
/// `[batch][position][vocab]`.
pub trait NestedLogits {
    /// Copies the scores into one contiguous buffer.
    fn to_dense(&self) -> Result<LogitsArray>;

    /// Converts to a host `f32` tensor without an intermediate dense copy.
    fn to_tensor(&self) -> Result<candle_core::Tensor>;
}

impl NestedLogits for Vec<Vec<Vec<f32>>> {
    fn to_dense(&self) -> Result<LogitsArray> {
        Ok(LogitsArray::from_nested(self)?)
    }

    fn to_tensor(&self) -> Result<candle_core::Tensor> {
        let (batch, positions, _) = tensor::nested_dims(self)?;
        if batch == 0 || positions == 0 {
            return Err(LogitsError::Empty.into());
        }

        let device = candle_core::Device::Cpu;
        let items = self
            .iter()
            .map(|seq| {
                let rows = seq
                    .iter()
                    .map(|row| candle_core::Tensor::new(row.as_slice(), &device))
                    .collect::<candle_core::Result<Vec<_>>>()?;
                candle_core::Tensor::stack(&rows, 0)
            })
            .collect::<candle_core::Result<Vec<_>>>()?;
        Ok(candle_core::Tensor::stack(&items, 0)?)
    }
}

impl NestedLogits for LogitsArray {
    fn to_dense(&self) -> Result<LogitsArray> {
        Ok(self.clone())
    }

    fn to_tensor(&self) -> Result<candle_core::Tensor> {
        LogitsArray::to_tensor(self)
    }
}

/// A batched causal-LM forward pass over token strings, e.g. a CTranslate2
/// `Generator`.
pub trait Generator: Send + Sync {
    fn forward_batch(
        &self,
        tokens: &[Vec<String>],
        return_log_probs: bool,
    ) -> Result<Box<dyn NestedLogits>>;
}
