use {
    crate::{
        classifier::Classifier,
        config::{DeviceConfig, ModelEntry, TracerConfig},
        error::{InferError, Result},
        registry::Registry,
        sequential::{Architecture, Sequential},
    },
    candle_core::{DType, Device, Tensor},
    std::{path::Path, sync::Arc},
};

/// Owns the compute device and loads classifiers onto it.
#[derive(Debug)]
pub struct Inference {
    device: Device,
}

impl Inference {
    pub fn cpu() -> Self {
        base::log_info!("Inference device: CPU");
        Self {
            device: Device::Cpu,
        }
    }

    #[cfg(feature = "cuda")]
    pub fn cuda(ordinal: usize) -> Result<Self> {
        let device = Device::new_cuda(ordinal)?;
        if device.is_cuda() {
            base::log_info!("Inference device: CUDA (ordinal {})", ordinal);
        } else {
            base::log_warn!(
                "Inference device: requested CUDA ordinal {} but device reports non-CUDA",
                ordinal
            );
        }
        Ok(Self { device })
    }

    pub fn from_config(device: DeviceConfig) -> Result<Self> {
        match device {
            DeviceConfig::Cpu => Ok(Self::cpu()),
            #[cfg(feature = "cuda")]
            DeviceConfig::Cuda(ordinal) => Self::cuda(ordinal),
            #[cfg(not(feature = "cuda"))]
            DeviceConfig::Cuda(_) => Err(InferError::Runtime(
                "CUDA feature not enabled".to_string(),
            )),
        }
    }

    /// Loads a sequential classifier from safetensors weights and its JSON
    /// architecture.
    pub fn use_sequential(
        &self,
        weights_path: impl AsRef<Path>,
        architecture_path: impl AsRef<Path>,
    ) -> Result<Sequential> {
        let architecture = Architecture::from_file(architecture_path)?;
        let weights_path = weights_path.as_ref();
        if !weights_path.exists() {
            return Err(InferError::Io(format!(
                "weights not found: {}",
                weights_path.display()
            )));
        }
        let weights = unsafe {
            candle_nn::VarBuilder::from_mmaped_safetensors(
                &[weights_path],
                DType::F32,
                &self.device,
            )?
        };
        Sequential::load(&architecture, weights)
    }

    /// Loads every model listed in `config`.
    ///
    /// Models whose files are missing or fail to load are logged and left
    /// out; the registry holds whatever loaded successfully.
    pub fn load_registry(&self, config: &TracerConfig) -> Registry {
        let mut registry = Registry::new();
        for entry in &config.models {
            match self.load_entry(config, entry) {
                Ok(Some(classifier)) => registry.register(entry.id.clone(), classifier),
                Ok(None) => {}
                Err(error) => base::log_error!("Error loading {}: {}", entry.id, error),
            }
        }
        base::log_info!("Models loaded: {:?}", registry.list());
        registry
    }

    fn load_entry(
        &self,
        config: &TracerConfig,
        entry: &ModelEntry,
    ) -> Result<Option<Arc<dyn Classifier>>> {
        let weights = config.resolve(&entry.weights);
        if !weights.exists() {
            base::log_warn!("{} not found at: {}", entry.id, weights.display());
            return Ok(None);
        }
        base::log_info!("Loading {} from: {}", entry.id, weights.display());
        let classifier = self.use_sequential(&weights, config.resolve(&entry.architecture))?;

        // dry run validates the layer stack against the weights
        let (height, width) = classifier.input_hw();
        let probe = Tensor::zeros((1, height, width, 3), DType::F32, &self.device)?;
        let output = classifier.forward(&probe)?;
        base::log_info!(
            "{} loaded: input shape {:?}, output shape {:?}",
            entry.id,
            classifier.input_shape(),
            output.dims()
        );
        Ok(Some(Arc::new(classifier)))
    }
}
