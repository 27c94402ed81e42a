use {
    crate::error::Result,
    candle_core::{Device, Tensor, Var},
};

/// Input side length used when a classifier leaves an axis undeclared.
pub const DEFAULT_INPUT_SIZE: usize = 224;

/// One entry of a classifier's layer graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerDescriptor {
    /// Position in definition order; 0 is closest to the input.
    pub index: usize,
    pub name: String,
    /// Number of dimensions of the layer output, batch included.
    pub output_rank: usize,
}

/// Result of running a [`Subgraph`].
pub struct Activations {
    /// Output of the chosen layer, tracked for gradients. Rank-4 outputs are
    /// laid out NHWC: `[1, h, w, c]`.
    pub layer_output: Var,
    /// Final scores computed from `layer_output`, `[1, n]`.
    pub scores: Tensor,
}

/// Forward pass that exposes an intermediate layer next to the final scores.
pub trait Subgraph {
    fn forward(&self, input: &Tensor) -> Result<Activations>;
}

/// A loaded, frozen image classifier.
///
/// Inputs are NHWC tensors `[1, height, width, 3]` with values in `[0, 1]`.
/// Implementations run in inference mode and must be deterministic.
pub trait Classifier: Send + Sync {
    /// Declared `(height, width)`; `None` for an axis that accepts any size.
    fn input_shape(&self) -> (Option<usize>, Option<usize>);

    fn device(&self) -> &Device;

    /// Runs inference and returns the score vector, `[1, n]`.
    fn forward(&self, input: &Tensor) -> Result<Tensor>;

    /// Layers in definition order. Every call starts a fresh iteration.
    fn layers(&self) -> Box<dyn Iterator<Item = LayerDescriptor> + '_>;

    fn subgraph<'a>(&'a self, layer: &LayerDescriptor) -> Result<Box<dyn Subgraph + 'a>>;

    /// Input size to resize images to, falling back to [`DEFAULT_INPUT_SIZE`].
    fn input_hw(&self) -> (usize, usize) {
        let (height, width) = self.input_shape();
        (
            height.unwrap_or(DEFAULT_INPUT_SIZE),
            width.unwrap_or(DEFAULT_INPUT_SIZE),
        )
    }
}
