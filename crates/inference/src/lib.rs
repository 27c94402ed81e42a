pub mod classifier;
pub mod config;
pub mod decision;
pub mod error;
pub mod gradcam;
pub mod inference;
pub mod registry;
pub mod sequential;
pub mod tracer;

pub use classifier::{Activations, Classifier, DEFAULT_INPUT_SIZE, LayerDescriptor, Subgraph};
pub use config::{DeviceConfig, ModelEntry, TracerConfig};
pub use decision::{Decision, Label, interpret};
pub use error::InferError;
pub use gradcam::{GradCamError, ImportanceMap, compute_importance, grad_cam};
pub use inference::Inference;
pub use registry::Registry;
pub use sequential::{Architecture, LayerSpec, Sequential};
pub use tracer::{AnalysisResponse, ErrorResponse, HealthReport, Prediction, Tracer};
