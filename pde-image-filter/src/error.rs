use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FilterError {
    #[error("Invalid shape {shape:?}: {reason}")]
    InvalidShape { shape: Vec<usize>, reason: String },
    #[error("Stencil size must be positive, got n={0}")]
    InvalidDimension(usize),
    #[error("Dimension mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("Invalid integration parameters: {0}")]
    InvalidParameters(String),
}

pub type Result<T> = std::result::Result<T, FilterError>;
