use thiserror::Error;

/// Configuration rejected at load or validation time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("detection point count {count} outside supported range [{min}, {max}]")]
    DetectionPointCount { count: usize, min: usize, max: usize },
    #[error("grace period enabled with non-positive duration {0}s")]
    NonPositiveGraceDuration(f64),
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("query radius {radius} spans more than {max} cells of size {cell_size}")]
    QueryReach { radius: f32, cell_size: f32, max: i32 },
    #[error("forward axis must be non-zero")]
    ZeroForwardAxis,
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
