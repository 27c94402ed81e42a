//! Gradient-weighted class activation maps.
//!
//! The explained layer is the last one whose output has rank 4 (batch,
//! height, width, channels). Its activations are weighted per channel by the
//! spatially averaged gradient of the decision score, summed over channels,
//! rectified and scaled so the strongest position is 1.

use {
    crate::{classifier::Classifier, error::InferError},
    base::Tensor,
    candle_core::Tensor as CanTensor,
    std::fmt,
};

/// Single-channel `[h, w]` map with values in `[0, 1]`.
pub type ImportanceMap = Tensor<f32>;

#[derive(Debug)]
pub enum GradCamError {
    /// The classifier has no rank-4 layer output.
    NoSpatialLayer,
    /// No position supports the decision; the map would be all zeros or NaN.
    DegenerateImportance,
    Infer(InferError),
}

impl fmt::Display for GradCamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradCamError::NoSpatialLayer => write!(f, "classifier has no spatial layer"),
            GradCamError::DegenerateImportance => {
                write!(f, "importance map has no positive activation")
            }
            GradCamError::Infer(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for GradCamError {}

impl From<InferError> for GradCamError {
    fn from(err: InferError) -> Self {
        GradCamError::Infer(err)
    }
}

impl From<candle_core::Error> for GradCamError {
    fn from(err: candle_core::Error) -> Self {
        GradCamError::Infer(err.into())
    }
}

impl From<base::TensorError> for GradCamError {
    fn from(err: base::TensorError) -> Self {
        GradCamError::Infer(InferError::Shape(err.to_string()))
    }
}

/// Computes the Grad-CAM map of `input` for the score at `class_index`.
///
/// Single-score classifiers always attribute score 0.
pub fn grad_cam(
    classifier: &dyn Classifier,
    input: &CanTensor,
    class_index: usize,
) -> Result<ImportanceMap, GradCamError> {
    let layer = classifier
        .layers()
        .filter(|layer| layer.output_rank == 4)
        .last()
        .ok_or(GradCamError::NoSpatialLayer)?;

    let activations = classifier.subgraph(&layer)?.forward(input)?;

    let scores = activations.scores.flatten_all()?;
    let count = scores.dim(0)?;
    let target = if count == 1 { 0 } else { class_index };
    if target >= count {
        return Err(InferError::Shape(format!(
            "class index {target} out of range for {count} scores"
        ))
        .into());
    }
    let loss = scores.get(target)?;

    let grads = loss.backward()?;
    let features = activations.layer_output.as_tensor();
    let grad = grads.get(features).ok_or_else(|| {
        InferError::Runtime(format!("no gradient reached layer {}", layer.name))
    })?;

    let (_, height, width, _) = grad.dims4()?;
    let pooled = grad.mean((0, 1, 2))?;
    let cam = features
        .detach()
        .get(0)?
        .broadcast_mul(&pooled)?
        .sum(2)?
        .relu()?;

    let data = cam.flatten_all()?.to_dtype(candle_core::DType::F32)?.to_vec1::<f32>()?;
    let mut map = Tensor::new(vec![height, width], data)?;
    // NaN anywhere means the gradients were unusable
    let max = match map.max() {
        Some(max) if max > 0.0 && max.is_finite() && map.data.iter().all(|v| !v.is_nan()) => max,
        _ => return Err(GradCamError::DegenerateImportance),
    };
    for value in &mut map.data {
        *value /= max;
    }

    Ok(map)
}

/// [`grad_cam`] with every failure logged and turned into `None`, so a
/// missing explanation never blocks the decision.
pub fn compute_importance(
    classifier: &dyn Classifier,
    input: &CanTensor,
    class_index: usize,
) -> Option<ImportanceMap> {
    match grad_cam(classifier, input, class_index) {
        Ok(map) => Some(map),
        Err(GradCamError::NoSpatialLayer) => {
            base::log_debug!("Grad-CAM skipped: classifier has no spatial layer");
            None
        }
        Err(GradCamError::DegenerateImportance) => {
            base::log_info!("Grad-CAM skipped: no region supports the prediction");
            None
        }
        Err(error) => {
            base::log_warn!("Grad-CAM error: {}", error);
            None
        }
    }
}
