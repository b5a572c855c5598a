use crate::core::Result;
use std::fmt;
use std::str::FromStr;

/// Execution device an engine runs on, parsed from labels like `cpu` or `cuda:1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Device {
    #[default]
    Cpu,
    Cuda(usize),
    Metal,
    /// Let the engine pick.
    Auto,
}

impl Device {
    pub fn is_cpu(&self) -> bool {
        matches!(self, Device::Cpu)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown device label: {0:?} (expected cpu, cuda, cuda:N, metal or auto)")]
pub struct DeviceParseError(pub String);

impl FromStr for Device {
    type Err = DeviceParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase();
        match label.as_str() {
            "cpu" => Ok(Device::Cpu),
            "cuda" => Ok(Device::Cuda(0)),
            "metal" => Ok(Device::Metal),
            "auto" => Ok(Device::Auto),
            _ => label
                .strip_prefix("cuda:")
                .and_then(|idx| idx.parse().ok())
                .map(Device::Cuda)
                .ok_or_else(|| DeviceParseError(s.to_string())),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => f.write_str("cpu"),
            Device::Cuda(0) => f.write_str("cuda"),
            Device::Cuda(idx) => write!(f, "cuda:{}", idx),
            Device::Metal => f.write_str("metal"),
            Device::Auto => f.write_str("auto"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogitsError {
    #[error("ragged logits: {axis} {index} has length {found}, expected {expected}")]
    Ragged {
        axis: &'static str,
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("logits have no sequence positions")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }
}

/// Contiguous `(batch, positions, vocab)` block of engine scores.
#[derive(Debug, Clone, PartialEq)]
pub struct LogitsArray {
    data: Vec<f32>,
    shape: Shape,
}

impl LogitsArray {
    pub fn new(data: Vec<f32>, batch: usize, positions: usize, vocab: usize) -> Result<Self> {
        let shape = Shape::new(vec![batch, positions, vocab]);
        if shape.numel() != data.len() {
            anyhow::bail!(
                "logits buffer holds {} values, shape {:?} needs {}",
                data.len(),
                shape.dims(),
                shape.numel()
            );
        }
        Ok(Self { data, shape })
    }

    /// Copies a nested `[batch][position][vocab]` structure into one buffer.
    pub fn from_nested(nested: &[Vec<Vec<f32>>]) -> std::result::Result<Self, LogitsError> {
        let (batch, positions, vocab) = nested_dims(nested)?;

        let mut data = Vec::with_capacity(batch * positions * vocab);
        for row in nested.iter().flatten() {
            data.extend_from_slice(row);
        }

        Ok(Self {
            data,
            shape: Shape::new(vec![batch, positions, vocab]),
        })
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// `(batch, positions, vocab)`
    pub fn dims3(&self) -> (usize, usize, usize) {
        let d = self.shape.dims();
        (d[0], d[1], d[2])
    }

    pub fn to_tensor(&self) -> Result<candle_core::Tensor> {
        let t = candle_core::Tensor::from_vec(
            self.data.clone(),
            self.dims3(),
            &candle_core::Device::Cpu,
        )?;
        Ok(t)
    }
}

/// `(batch, positions, vocab)` of a nested structure. Every item and row must
/// match the first one's length.
pub fn nested_dims(nested: &[Vec<Vec<f32>>]) -> std::result::Result<(usize, usize, usize), LogitsError> {
    let positions = nested.first().map(|seq| seq.len()).unwrap_or(0);
    let vocab = nested
        .first()
        .and_then(|seq| seq.first())
        .map(|row| row.len())
        .unwrap_or(0);

    for (b, seq) in nested.iter().enumerate() {
        if seq.len() != positions {
            return Err(LogitsError::Ragged {
                axis: "batch item",
                index: b,
                expected: positions,
                found: seq.len(),
            });
        }
        for (p, row) in seq.iter().enumerate() {
            if row.len() != vocab {
                return Err(LogitsError::Ragged {
                    axis: "position",
                    index: b * positions + p,
                    expected: vocab,
                    found: row.len(),
                });
            }
        }
    }

    Ok((nested.len(), positions, vocab))
}

/// Picks `logits[:, -1, :]` from a `(batch, positions, vocab)` tensor.
pub fn last_position(logits: &candle_core::Tensor) -> Result<candle_core::Tensor> {
    let (_, positions, _) = logits.dims3()?;
    if positions == 0 {
        return Err(LogitsError::Empty.into());
    }
    Ok(logits.narrow(1, positions - 1, 1)?.squeeze(1)?.contiguous()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_labels() {
        assert_eq!("cpu".parse::<Device>().unwrap(), Device::Cpu);
        assert_eq!(" CUDA ".parse::<Device>().unwrap(), Device::Cuda(0));
        assert_eq!("cuda:3".parse::<Device>().unwrap(), Device::Cuda(3));
        assert_eq!("auto".parse::<Device>().unwrap(), Device::Auto);
        assert!("tpu".parse::<Device>().is_err());
        assert!("cuda:x".parse::<Device>().is_err());

        assert_eq!(Device::Cuda(2).to_string(), "cuda:2");
        assert_eq!(Device::Cuda(0).to_string(), "cuda");
        assert!(Device::default().is_cpu());
        assert!(!Device::Auto.is_cpu());
    }

    #[test]
    fn test_from_nested() {
        let nested = vec![
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            vec![vec![5.0, 6.0], vec![7.0, 8.0]],
        ];
        let arr = LogitsArray::from_nested(&nested).unwrap();
        assert_eq!(arr.dims3(), (2, 2, 2));
        assert_eq!(arr.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_from_nested_ragged() {
        let nested = vec![vec![vec![1.0, 2.0]], vec![vec![3.0]]];
        let err = LogitsArray::from_nested(&nested).unwrap_err();
        assert_eq!(
            err,
            LogitsError::Ragged {
                axis: "position",
                index: 1,
                expected: 2,
                found: 1,
            }
        );

        let nested = vec![vec![vec![1.0]], vec![]];
        assert!(matches!(
            LogitsArray::from_nested(&nested),
            Err(LogitsError::Ragged { axis: "batch item", .. })
        ));
    }

    #[test]
    fn test_new_checks_len() {
        assert!(LogitsArray::new(vec![0.0; 6], 1, 2, 3).is_ok());
        assert!(LogitsArray::new(vec![0.0; 5], 1, 2, 3).is_err());
    }

    #[test]
    fn test_last_position() {
        let arr = LogitsArray::new((0..12).map(|v| v as f32).collect(), 2, 3, 2).unwrap();
        let last = last_position(&arr.to_tensor().unwrap()).unwrap();
        assert_eq!(last.dims(), &[2, 2]);
        assert_eq!(
            last.to_vec2::<f32>().unwrap(),
            vec![vec![4.0, 5.0], vec![10.0, 11.0]]
        );
    }

    #[test]
    fn test_last_position_empty() {
        let arr = LogitsArray::new(Vec::new(), 2, 0, 4).unwrap();
        let err = last_position(&arr.to_tensor().unwrap()).unwrap_err();
        assert_eq!(err.downcast_ref::<LogitsError>(), Some(&LogitsError::Empty));
    }
}
