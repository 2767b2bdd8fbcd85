/// Error type produced by user converters and field-map value functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error returned by every fallible operation of the crate.
///
/// Converter errors are carried through untouched.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("type mismatch: cannot map {found} into {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("insufficient capacity: destination holds {capacity} elements, source has {len}")]
    InsufficientCapacity { capacity: usize, len: usize },

    #[error("destination is not addressable")]
    NotAddressable,

    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Converter(BoxError),
}

impl MapError {
    pub fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch { expected, found }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap a converter failure without altering its message.
    pub fn converter(e: impl Into<BoxError>) -> Self {
        Self::Converter(e.into())
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    /// Add context to the error.
    ///
    /// Only `FieldNotFound` and `Config` carry a free-form message; every other
    /// variant is returned unchanged so converter errors stay verbatim.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            MapError::FieldNotFound(msg) => MapError::FieldNotFound(format!("{ctx}: {msg}")),
            MapError::Config(msg) => MapError::Config(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}
