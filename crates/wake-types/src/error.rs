use thiserror::Error;

#[derive(Error, Debug)]
pub enum WakeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Layout constraint violated: {0}")]
    LayoutViolation(String),

    #[error("History index out of range: {axis}={index}, limit {limit}")]
    IndexOutOfRange {
        axis: &'static str,
        index: usize,
        limit: usize,
    },

    #[error("Unknown moment '{0}'")]
    UnknownMoment(String),

    #[error("Physics constraint violated: {0}")]
    PhysicsViolation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type WakeResult<T> = Result<T, WakeError>;
