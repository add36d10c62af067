use thiserror::Error;

/// Errors raised by any stage of the binarization pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Buffer sizes or dimensions disagree with the declared width/height
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// Window side or sensitivity outside its valid domain
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The background worker thread could not be started
    #[error("Worker error: {0}")]
    Worker(#[from] std::io::Error),
}

impl PipelineError {
    pub(crate) fn plane_size(name: &str, expected: usize, actual: usize) -> Self {
        PipelineError::InvalidFrame(format!(
            "{} plane has {} bytes, expected {}",
            name, actual, expected
        ))
    }

    pub(crate) fn buffer_size(name: &str, width: usize, height: usize, actual: usize) -> Self {
        PipelineError::InvalidFrame(format!(
            "{} buffer of {} bytes does not match {}x{}",
            name, actual, width, height
        ))
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, PipelineError>;
