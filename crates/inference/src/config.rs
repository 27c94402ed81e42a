use {
    crate::error::Result,
    serde::{Deserialize, Serialize},
    std::path::{Path, PathBuf},
};

pub const DEFAULT_MODEL: &str = "mobilenet";

/// Where a classifier's files live. Relative paths resolve against
/// [`TracerConfig::models_dir`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelEntry {
    pub id: String,
    pub weights: PathBuf,
    pub architecture: PathBuf,
}

impl ModelEntry {
    pub fn new(id: &str, stem: &str) -> Self {
        Self {
            id: id.to_string(),
            weights: PathBuf::from(format!("{stem}.safetensors")),
            architecture: PathBuf::from(format!("{stem}.json")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceConfig {
    #[default]
    Cpu,
    Cuda(usize),
}

/// Service configuration, usually read from a JSON file.
///
/// Every field is optional; missing fields take the defaults of
/// [`TracerConfig::default`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TracerConfig {
    pub models_dir: PathBuf,
    pub models: Vec<ModelEntry>,
    pub default_model: String,
    pub device: DeviceConfig,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            models: vec![
                ModelEntry::new("mobilenet", "lung_cancer_mobilenetv2_model"),
                ModelEntry::new("inception", "inception_lung_cancer_model"),
            ],
            default_model: DEFAULT_MODEL.to_string(),
            device: DeviceConfig::Cpu,
        }
    }
}

impl TracerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.models_dir.join(path)
        }
    }
}
