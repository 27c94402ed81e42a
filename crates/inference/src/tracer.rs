use {
    crate::{
        decision::{Label, interpret},
        error::{InferError, Result},
        gradcam::compute_importance,
        registry::Registry,
    },
    candle_core::{DType, Tensor},
    image::Image,
    serde::{Deserialize, Serialize},
    std::sync::Arc,
};

/// Outcome of one prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: Label,
    pub confidence: f32,
    pub class_index: usize,
    /// Grad-CAM overlay as a PNG data URI, when one could be produced.
    pub overlay: Option<String>,
}

/// Success payload returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub prediction: Label,
    pub confidence: f32,
    pub model: String,
    pub gradcam_url: Option<String>,
    pub timestamp: String,
}

/// Failure payload returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip)]
    client_error: bool,
}

impl ErrorResponse {
    /// True for bad requests (unknown model, unreadable image), false for
    /// failures inside the service.
    pub fn is_client_error(&self) -> bool {
        self.client_error
    }
}

impl From<&InferError> for ErrorResponse {
    fn from(err: &InferError) -> Self {
        Self {
            error: err.to_string(),
            client_error: err.is_client_error(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub models_loaded: Vec<String>,
    pub timestamp: String,
}

/// Runs the classify-and-explain pipeline against a shared registry.
#[derive(Debug, Clone)]
pub struct Tracer {
    registry: Arc<Registry>,
}

impl Tracer {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn not_found(&self, model_id: &str) -> InferError {
        InferError::ModelNotFound {
            requested: model_id.to_string(),
            available: self.registry.list().into_iter().map(String::from).collect(),
        }
    }

    /// Classifies `image` with the model registered as `model_id` and
    /// explains the decision.
    ///
    /// Only lookup, normalization and inference failures are errors; a
    /// missing explanation leaves `overlay` empty.
    pub fn predict(&self, model_id: &str, image: &Image) -> Result<Prediction> {
        let classifier = self
            .registry
            .get(model_id)
            .ok_or_else(|| self.not_found(model_id))?;

        let (height, width) = classifier.input_hw();
        let input = image::normalize(image, height, width)?;
        let input = Tensor::from_vec(input.data, input.shape, classifier.device())?;

        let output = classifier.forward(&input)?;
        if output.rank() != 2 || output.dim(0)? != 1 {
            return Err(InferError::Shape(format!(
                "{model_id} returned {:?}, expected [1, n] scores",
                output.dims()
            )));
        }
        let scores = output
            .flatten_all()?
            .to_dtype(DType::F32)?
            .to_vec1::<f32>()?;
        let decision = interpret(&scores)?;
        base::log_debug!(
            "{}: {} ({:.4}) from scores {:?}",
            model_id,
            decision.label.as_str(),
            decision.confidence,
            scores
        );

        let importance = compute_importance(classifier.as_ref(), &input, decision.class_index);
        let overlay = image::overlay_data_uri(image, importance.as_ref());

        Ok(Prediction {
            label: decision.label,
            confidence: decision.confidence,
            class_index: decision.class_index,
            overlay,
        })
    }

    /// Like [`Tracer::predict`] but starting from encoded image bytes. The
    /// model id is checked before decoding.
    pub fn predict_bytes(&self, model_id: &str, bytes: &[u8]) -> Result<Prediction> {
        if self.registry.get(model_id).is_none() {
            return Err(self.not_found(model_id));
        }
        let image = image::decode_image(bytes)?;
        self.predict(model_id, &image)
    }

    /// Builds the client payload for one request.
    pub fn respond(
        &self,
        model_id: &str,
        bytes: &[u8],
    ) -> std::result::Result<AnalysisResponse, ErrorResponse> {
        match self.predict_bytes(model_id, bytes) {
            Ok(prediction) => Ok(AnalysisResponse {
                prediction: prediction.label,
                confidence: prediction.confidence,
                model: model_id.to_string(),
                gradcam_url: prediction.overlay,
                timestamp: base::format_timestamp(),
            }),
            Err(error) => {
                if error.is_client_error() {
                    base::log_info!("Rejected request: {}", error);
                } else {
                    base::log_error!("Analysis error: {}", error);
                }
                Err(ErrorResponse::from(&error))
            }
        }
    }

    /// [`Tracer::respond`] on tokio's blocking pool.
    pub async fn analyze(
        &self,
        model_id: String,
        bytes: Vec<u8>,
    ) -> std::result::Result<AnalysisResponse, ErrorResponse> {
        let tracer = self.clone();
        tokio::task::spawn_blocking(move || tracer.respond(&model_id, &bytes))
            .await
            .unwrap_or_else(|e| {
                let error = InferError::Runtime(format!("analysis task failed: {e}"));
                base::log_error!("Analysis error: {}", error);
                Err(ErrorResponse::from(&error))
            })
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: "healthy".to_string(),
            models_loaded: self.registry.list().into_iter().map(String::from).collect(),
            timestamp: base::format_timestamp(),
        }
    }
}
