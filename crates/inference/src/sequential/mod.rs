mod architecture;
pub use architecture::{Architecture, LayerSpec};

use {
    crate::{
        classifier::{Activations, Classifier, LayerDescriptor, Subgraph},
        error::{InferError, Result},
    },
    candle_core::{D, Device, Tensor, Var},
    candle_nn::{Conv2dConfig, Module, ModuleT, VarBuilder},
};

#[derive(Debug)]
enum Layer {
    Conv2d(candle_nn::Conv2d),
    BatchNorm(candle_nn::BatchNorm),
    Relu,
    MaxPool2d(usize),
    AvgPool2d(usize),
    GlobalAvgPool,
    Flatten,
    Linear(candle_nn::Linear),
    Dropout,
    Sigmoid,
    Softmax,
}

impl Layer {
    fn load(spec: &LayerSpec, vb: VarBuilder) -> candle_core::Result<Self> {
        Ok(match *spec {
            LayerSpec::Conv2d {
                in_channels,
                out_channels,
                kernel_size,
                stride,
                padding,
            } => Layer::Conv2d(candle_nn::conv2d(
                in_channels,
                out_channels,
                kernel_size,
                Conv2dConfig {
                    stride,
                    padding,
                    groups: 1,
                    dilation: 1,
                    ..Default::default()
                },
                vb,
            )?),
            LayerSpec::BatchNorm { channels, eps } => {
                Layer::BatchNorm(candle_nn::batch_norm(channels, eps, vb)?)
            }
            LayerSpec::Relu => Layer::Relu,
            LayerSpec::MaxPool2d { size } => Layer::MaxPool2d(size),
            LayerSpec::AvgPool2d { size } => Layer::AvgPool2d(size),
            LayerSpec::GlobalAvgPool => Layer::GlobalAvgPool,
            LayerSpec::Flatten => Layer::Flatten,
            LayerSpec::Linear {
                in_features,
                out_features,
            } => Layer::Linear(candle_nn::linear(in_features, out_features, vb)?),
            LayerSpec::Dropout => Layer::Dropout,
            LayerSpec::Sigmoid => Layer::Sigmoid,
            LayerSpec::Softmax => Layer::Softmax,
        })
    }

    /// Applies the layer in inference mode. Feature maps are NCHW here.
    fn apply(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        match self {
            Layer::Conv2d(conv) => conv.forward(xs),
            Layer::BatchNorm(bn) => bn.forward_t(xs, false),
            Layer::Relu => xs.relu(),
            Layer::MaxPool2d(size) => xs.max_pool2d(*size),
            Layer::AvgPool2d(size) => xs.avg_pool2d(*size),
            Layer::GlobalAvgPool => xs.mean((2, 3)),
            Layer::Flatten => xs.flatten_from(1),
            Layer::Linear(linear) => linear.forward(xs),
            Layer::Dropout => Ok(xs.clone()),
            // composed from differentiable primitives so gradients flow through it
            Layer::Sigmoid => (xs.neg()?.exp()? + 1.0)?.recip(),
            Layer::Softmax => candle_nn::ops::softmax(xs, D::Minus1),
        }
    }
}

#[derive(Debug)]
struct Block {
    name: String,
    layer: Layer,
    output_rank: usize,
}

/// Feed-forward classifier described by an [`Architecture`].
///
/// Weights are read from `layers.{index}.weight` / `layers.{index}.bias`
/// (plus `running_mean` / `running_var` for batch norm).
#[derive(Debug)]
pub struct Sequential {
    blocks: Vec<Block>,
    input_height: Option<usize>,
    input_width: Option<usize>,
    device: Device,
}

impl Sequential {
    pub fn load(architecture: &Architecture, vb: VarBuilder) -> Result<Self> {
        let ranks = architecture.output_ranks()?;
        let device = vb.device().clone();
        let vb = vb.pp("layers");
        let blocks = architecture
            .layers
            .iter()
            .zip(ranks)
            .enumerate()
            .map(|(index, (spec, output_rank))| {
                Ok(Block {
                    name: format!("{}_{}", spec.kind(), index),
                    layer: Layer::load(spec, vb.pp(index))?,
                    output_rank,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            blocks,
            input_height: architecture.input_height,
            input_width: architecture.input_width,
            device,
        })
    }

    fn to_nchw(&self, input: &Tensor) -> Result<Tensor> {
        let dims = input.dims();
        if dims.len() != 4 || dims[0] != 1 || dims[3] != 3 {
            return Err(InferError::Shape(format!(
                "expected input [1, H, W, 3], got {dims:?}"
            )));
        }
        Ok(input.permute((0, 3, 1, 2))?.contiguous()?)
    }

    fn run(blocks: &[Block], xs: Tensor) -> Result<Tensor> {
        blocks
            .iter()
            .try_fold(xs, |xs, block| block.layer.apply(&xs))
            .map_err(InferError::from)
    }
}

impl Classifier for Sequential {
    fn input_shape(&self) -> (Option<usize>, Option<usize>) {
        (self.input_height, self.input_width)
    }

    fn device(&self) -> &Device {
        &self.device
    }

    fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let xs = self.to_nchw(input)?;
        Self::run(&self.blocks, xs)
    }

    fn layers(&self) -> Box<dyn Iterator<Item = LayerDescriptor> + '_> {
        Box::new(
            self.blocks
                .iter()
                .enumerate()
                .map(|(index, block)| LayerDescriptor {
                    index,
                    name: block.name.clone(),
                    output_rank: block.output_rank,
                }),
        )
    }

    fn subgraph<'a>(&'a self, layer: &LayerDescriptor) -> Result<Box<dyn Subgraph + 'a>> {
        match self.blocks.get(layer.index) {
            Some(block) if block.name == layer.name => Ok(Box::new(SequentialSubgraph {
                model: self,
                split: layer.index,
            })),
            _ => Err(InferError::Shape(format!(
                "layer {} ({}) is not part of this classifier",
                layer.index, layer.name
            ))),
        }
    }
}

struct SequentialSubgraph<'a> {
    model: &'a Sequential,
    split: usize,
}

impl Subgraph for SequentialSubgraph<'_> {
    fn forward(&self, input: &Tensor) -> Result<Activations> {
        let (head, tail) = self.model.blocks.split_at(self.split + 1);
        let spatial = head[self.split].output_rank == 4;

        let xs = self.model.to_nchw(input)?;
        let features = Sequential::run(head, xs)?;
        let features = if spatial {
            features.permute((0, 2, 3, 1))?
        } else {
            features
        };

        // gradients are recorded from here on
        let layer_output = Var::from_tensor(&features.contiguous()?.detach())?;

        let xs = if spatial {
            layer_output.as_tensor().permute((0, 3, 1, 2))?.contiguous()?
        } else {
            layer_output.as_tensor().clone()
        };
        let scores = Sequential::run(tail, xs)?;

        Ok(Activations {
            layer_output,
            scores,
        })
    }
}
