use thiserror::Error;

#[derive(Error, Debug)]
pub enum SamplerError {
    #[error("logit vector must not be empty")]
    EmptyLogits,
    #[error("logit at index {index} is NaN")]
    NanLogit { index: usize },
    #[error("temperature must be finite and > 0, got {0}")]
    InvalidTemperature(f64),
    #[error("top-p threshold must be within [0, 1], got {0}")]
    InvalidTopP(f64),
    #[error("invalid probability distribution: {0}")]
    InvalidDistribution(String),
    #[error("length mismatch: {logits} logits but {counts} occurrence counts")]
    LengthMismatch { logits: usize, counts: usize },
    #[error("{name} must be finite, got {value}")]
    NonFinitePenalty { name: &'static str, value: f64 },
    #[error("config error: {0}")]
    Config(String),
}

impl SamplerError {
    /// Every argument-checking failure belongs to the invalid-argument class.
    /// Only config (de)serialization failures fall outside it.
    pub fn is_invalid_argument(&self) -> bool {
        !matches!(self, SamplerError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, SamplerError>;
