use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Bad, oversized or undecodable image, or a malformed query.
    /// Rejected before any model call and never retried.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The encoder failed to load or an inference call faulted.
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// A similarity query targets a garment without a stored embedding.
    #[error("Garment has no stored embedding: {0}")]
    NoEmbedding(String),

    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// HTTP-style status class for collaborators that relay errors over the wire
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidInput(_) | Error::InvalidDimension { .. } => 400,
            Error::NoEmbedding(_) => 422,
            Error::ModelUnavailable(_) => 503,
            Error::InvalidConfig(_) | Error::Io(_) | Error::Serialization(_) => 500,
        }
    }

    /// Only infrastructure faults are worth retrying, and only by the caller
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::ModelUnavailable(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
