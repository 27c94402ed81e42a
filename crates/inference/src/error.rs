use std::fmt;

pub type Result<T> = std::result::Result<T, InferError>;

#[derive(Debug)]
pub enum InferError {
    Candle(String),
    Shape(String),
    Io(String),
    Runtime(String),
    Config(String),
    Decode(String),
    ModelNotFound {
        requested: String,
        available: Vec<String>,
    },
}

impl InferError {
    /// Whether the failure was caused by the request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, InferError::ModelNotFound { .. } | InferError::Decode(_))
    }
}

impl fmt::Display for InferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferError::Candle(msg) => write!(f, "candle error: {msg}"),
            InferError::Shape(msg) => write!(f, "shape error: {msg}"),
            InferError::Io(msg) => write!(f, "io error: {msg}"),
            InferError::Runtime(msg) => write!(f, "runtime error: {msg}"),
            InferError::Config(msg) => write!(f, "config error: {msg}"),
            InferError::Decode(msg) => write!(f, "cannot read image: {msg}"),
            InferError::ModelNotFound {
                requested,
                available,
            } => write!(f, "Model '{requested}' not loaded. Available: {available:?}"),
        }
    }
}

impl std::error::Error for InferError {}

impl From<candle_core::Error> for InferError {
    fn from(err: candle_core::Error) -> Self {
        InferError::Candle(err.to_string())
    }
}

impl From<std::io::Error> for InferError {
    fn from(err: std::io::Error) -> Self {
        InferError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for InferError {
    fn from(err: serde_json::Error) -> Self {
        InferError::Config(err.to_string())
    }
}

impl From<image::ImageError> for InferError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Decode(msg) => InferError::Decode(msg),
            image::ImageError::Shape(msg) => InferError::Shape(msg),
            other => InferError::Runtime(other.to_string()),
        }
    }
}
