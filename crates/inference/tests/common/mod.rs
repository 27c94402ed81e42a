#![allow(dead_code)]

use {
    base::Vec2,
    candle_core::{DType, Device, Tensor},
    candle_nn::VarBuilder,
    image::{Image, PixelFormat},
    inference::{Architecture, Classifier, InferError, LayerDescriptor, Sequential, Subgraph},
    std::collections::HashMap,
};

/// Classifier that ignores its input and always returns the same scores.
/// Every layer is dense, so no explanation can be produced.
pub struct FixedScores {
    pub scores: Vec<f32>,
    pub device: Device,
}

impl FixedScores {
    pub fn new(scores: &[f32]) -> Self {
        Self {
            scores: scores.to_vec(),
            device: Device::Cpu,
        }
    }
}

impl Classifier for FixedScores {
    fn input_shape(&self) -> (Option<usize>, Option<usize>) {
        (Some(8), None)
    }

    fn device(&self) -> &Device {
        &self.device
    }

    fn forward(&self, input: &Tensor) -> Result<Tensor, InferError> {
        if input.dims() != [1, 8, 224, 3] {
            return Err(InferError::Shape(format!("unexpected input {:?}", input.dims())));
        }
        Ok(Tensor::new(self.scores.as_slice(), &self.device)?.unsqueeze(0)?)
    }

    fn layers(&self) -> Box<dyn Iterator<Item = LayerDescriptor> + '_> {
        Box::new((0..2).map(|index| LayerDescriptor {
            index,
            name: format!("dense_{index}"),
            output_rank: 2,
        }))
    }

    fn subgraph<'a>(&'a self, _layer: &LayerDescriptor) -> Result<Box<dyn Subgraph + 'a>, InferError> {
        Err(InferError::Runtime("dense layers only".to_string()))
    }
}

/// Classifier that hands back its input feature map instead of scores.
pub struct RawFeatures {
    pub device: Device,
}

impl Classifier for RawFeatures {
    fn input_shape(&self) -> (Option<usize>, Option<usize>) {
        (Some(4), Some(4))
    }

    fn device(&self) -> &Device {
        &self.device
    }

    fn forward(&self, input: &Tensor) -> Result<Tensor, InferError> {
        Ok(input.clone())
    }

    fn layers(&self) -> Box<dyn Iterator<Item = LayerDescriptor> + '_> {
        Box::new(std::iter::empty())
    }

    fn subgraph<'a>(&'a self, _layer: &LayerDescriptor) -> Result<Box<dyn Subgraph + 'a>, InferError> {
        Err(InferError::Runtime("no layers".to_string()))
    }
}

/// 1x1 conv that copies R into channel 0 and G into channel 1, global
/// average pooling, then a linear head with the given weights.
pub fn weighted_cnn_architecture(classes: usize, head: &str) -> Architecture {
    Architecture::from_json(&format!(
        r#"{{
            "input_height": 2,
            "input_width": 2,
            "layers": [
                {{ "type": "conv2d", "in_channels": 3, "out_channels": 2, "kernel_size": 1 }},
                {{ "type": "global_avg_pool" }},
                {{ "type": "linear", "in_features": 2, "out_features": {classes} }},
                {{ "type": "{head}" }}
            ]
        }}"#
    ))
    .unwrap()
}

pub fn weighted_cnn_tensors(linear: &[f32]) -> HashMap<String, Tensor> {
    let device = Device::Cpu;
    let classes = linear.len() / 2;
    let mut tensors = HashMap::new();
    tensors.insert(
        "layers.0.weight".to_string(),
        Tensor::from_vec(vec![1f32, 0., 0., 0., 1., 0.], (2, 3, 1, 1), &device).unwrap(),
    );
    tensors.insert(
        "layers.0.bias".to_string(),
        Tensor::zeros(2, DType::F32, &device).unwrap(),
    );
    tensors.insert(
        "layers.2.weight".to_string(),
        Tensor::from_vec(linear.to_vec(), (classes, 2), &device).unwrap(),
    );
    tensors.insert(
        "layers.2.bias".to_string(),
        Tensor::zeros(classes, DType::F32, &device).unwrap(),
    );
    tensors
}

/// `linear` holds the head weights row by row: one row of two per class.
pub fn weighted_cnn(linear: &[f32]) -> Sequential {
    let classes = linear.len() / 2;
    let head = if classes == 1 { "sigmoid" } else { "softmax" };
    let vb = VarBuilder::from_tensors(weighted_cnn_tensors(linear), DType::F32, &Device::Cpu);
    Sequential::load(&weighted_cnn_architecture(classes, head), vb).unwrap()
}

/// NHWC `[1, 2, 2, 3]` input with the given red and green planes.
pub fn planes(red: [f32; 4], green: [f32; 4]) -> Tensor {
    let data: Vec<f32> = red
        .iter()
        .zip(green)
        .flat_map(|(&r, g)| [r, g, 0.0])
        .collect();
    Tensor::from_vec(data, (1, 2, 2, 3), &Device::Cpu).unwrap()
}

pub fn scan(width: usize, height: usize) -> Image {
    let data = (0..width * height * 3).map(|i| (i * 7 % 256) as u8).collect();
    Image::new(Vec2::new(width, height), data, PixelFormat::Rgb8)
}

pub fn scan_png(width: usize, height: usize) -> Vec<u8> {
    image::encode_png(&scan(width, height)).unwrap()
}

pub fn assert_close(actual: &[f32], expected: &[f32]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-5, "{actual:?} != {expected:?}");
    }
}
