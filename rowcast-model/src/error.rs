use std::fmt::{self, Display};

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A geometry value was negative or not a finite number.
    InvalidDimension {
        /// Field that failed validation.
        field: &'static str,
        /// Offending value.
        value: f32,
    },
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidDimension { field, value } => {
                write!(f, "invalid dimension {field}: {value}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

/// Result alias for model validation.
pub type Result<T> = std::result::Result<T, ModelError>;
