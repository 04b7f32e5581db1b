use thiserror::Error;

/// Category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    RankMismatch,
    TypeMismatch,
    IncompatibleShape,
    InvalidAttribute,
    OutOfBounds,
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("rank mismatch: {reason}")]
    RankMismatch { reason: String },
    #[error("type mismatch: {reason}")]
    TypeMismatch { reason: String },
    #[error("incompatible shape: {reason}")]
    IncompatibleShape { reason: String },
    #[error("invalid attribute: {reason}")]
    InvalidAttribute { reason: String },
    #[error("out of bounds: {reason}")]
    OutOfBounds { reason: String },
    #[error("arithmetic overflow: {reason}")]
    Overflow { reason: String },
}

impl ValidationError {
    pub(crate) fn rank(reason: impl Into<String>) -> Self {
        ValidationError::RankMismatch {
            reason: reason.into(),
        }
    }

    pub(crate) fn data_type(reason: impl Into<String>) -> Self {
        ValidationError::TypeMismatch {
            reason: reason.into(),
        }
    }

    pub(crate) fn shape(reason: impl Into<String>) -> Self {
        ValidationError::IncompatibleShape {
            reason: reason.into(),
        }
    }

    pub(crate) fn attribute(reason: impl Into<String>) -> Self {
        ValidationError::InvalidAttribute {
            reason: reason.into(),
        }
    }

    pub(crate) fn bounds(reason: impl Into<String>) -> Self {
        ValidationError::OutOfBounds {
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(reason: impl Into<String>) -> Self {
        ValidationError::Overflow {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::RankMismatch { .. } => ErrorKind::RankMismatch,
            ValidationError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            ValidationError::IncompatibleShape { .. } => ErrorKind::IncompatibleShape,
            ValidationError::InvalidAttribute { .. } => ErrorKind::InvalidAttribute,
            ValidationError::OutOfBounds { .. } => ErrorKind::OutOfBounds,
            ValidationError::Overflow { .. } => ErrorKind::Overflow,
        }
    }

    /// The diagnostic without the category prefix.
    pub fn reason(&self) -> &str {
        match self {
            ValidationError::RankMismatch { reason }
            | ValidationError::TypeMismatch { reason }
            | ValidationError::IncompatibleShape { reason }
            | ValidationError::InvalidAttribute { reason }
            | ValidationError::OutOfBounds { reason }
            | ValidationError::Overflow { reason } => reason,
        }
    }
}
