use {
    crate::error::{InferError, Result},
    serde::{Deserialize, Serialize},
    std::path::Path,
};

/// JSON description of a sequential network.
///
/// ```json
/// {
///   "input_height": 224,
///   "input_width": 224,
///   "layers": [
///     { "type": "conv2d", "in_channels": 3, "out_channels": 16, "kernel_size": 3, "padding": 1 },
///     { "type": "relu" },
///     { "type": "global_avg_pool" },
///     { "type": "linear", "in_features": 16, "out_features": 1 },
///     { "type": "sigmoid" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Architecture {
    #[serde(default)]
    pub input_height: Option<usize>,
    #[serde(default)]
    pub input_width: Option<usize>,
    pub layers: Vec<LayerSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerSpec {
    Conv2d {
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        #[serde(default = "default_stride")]
        stride: usize,
        #[serde(default)]
        padding: usize,
    },
    BatchNorm {
        channels: usize,
        #[serde(default = "default_eps")]
        eps: f64,
    },
    Relu,
    MaxPool2d {
        size: usize,
    },
    AvgPool2d {
        size: usize,
    },
    GlobalAvgPool,
    Flatten,
    Linear {
        in_features: usize,
        out_features: usize,
    },
    Dropout,
    Sigmoid,
    Softmax,
}

fn default_stride() -> usize {
    1
}

fn default_eps() -> f64 {
    1e-3
}

impl LayerSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            LayerSpec::Conv2d { .. } => "conv2d",
            LayerSpec::BatchNorm { .. } => "batch_norm",
            LayerSpec::Relu => "relu",
            LayerSpec::MaxPool2d { .. } => "max_pool2d",
            LayerSpec::AvgPool2d { .. } => "avg_pool2d",
            LayerSpec::GlobalAvgPool => "global_avg_pool",
            LayerSpec::Flatten => "flatten",
            LayerSpec::Linear { .. } => "linear",
            LayerSpec::Dropout => "dropout",
            LayerSpec::Sigmoid => "sigmoid",
            LayerSpec::Softmax => "softmax",
        }
    }

    /// Output rank given the input rank, or an error if the layer cannot
    /// consume a tensor of that rank.
    pub fn output_rank(&self, input_rank: usize) -> Result<usize> {
        let spatial = matches!(
            self,
            LayerSpec::Conv2d { .. }
                | LayerSpec::MaxPool2d { .. }
                | LayerSpec::AvgPool2d { .. }
                | LayerSpec::GlobalAvgPool
        );
        if spatial && input_rank != 4 {
            return Err(InferError::Config(format!(
                "{} needs a rank-4 input, got rank {input_rank}",
                self.kind()
            )));
        }
        match self {
            LayerSpec::GlobalAvgPool | LayerSpec::Flatten => Ok(2),
            LayerSpec::Linear { .. } if input_rank != 2 => Err(InferError::Config(format!(
                "linear needs a rank-2 input, got rank {input_rank}"
            ))),
            LayerSpec::BatchNorm { .. } if input_rank != 2 && input_rank != 4 => {
                Err(InferError::Config(format!(
                    "batch_norm needs a rank-2 or rank-4 input, got rank {input_rank}"
                )))
            }
            _ => Ok(input_rank),
        }
    }
}

impl Architecture {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Output rank of every layer, in order.
    ///
    /// The last layer must produce a `[1, n]` score vector.
    pub fn output_ranks(&self) -> Result<Vec<usize>> {
        let mut rank = 4;
        let ranks = self
            .layers
            .iter()
            .map(|layer| {
                rank = layer.output_rank(rank)?;
                Ok(rank)
            })
            .collect::<Result<Vec<_>>>()?;
        match ranks.last() {
            None => Err(InferError::Config("architecture has no layers".to_string())),
            Some(&2) => Ok(ranks),
            Some(&last) => Err(InferError::Config(format!(
                "last layer {} outputs rank {last}, expected rank-2 scores",
                self.layers.len() - 1
            ))),
        }
    }
}
