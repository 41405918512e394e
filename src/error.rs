use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SeriesError {
    #[error("index {index} is out of bounds for series of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("unsupported transfer flavor: {0}")]
    UnsupportedFlavor(String),

    #[error("UI executor queue is closed")]
    ExecutorClosed,
}

pub type Result<T, E = SeriesError> = std::result::Result<T, E>;
