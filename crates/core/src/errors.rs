use crate::report::{FailureOrigin, SuppressedFailure};

/// Result type alias for tidyup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for tidyup operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The deleter could not be bound after the resource was acquired.
    /// The resource has already been released when this is returned.
    #[error("failed to bind deleter: {message}")]
    DeleterBinding {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A cleanup action panicked while the thread was already unwinding
    #[error("{origin} cleanup panicked during unwinding: {message}")]
    Suppressed {
        origin: FailureOrigin,
        message: String,
    },
}

// Helper methods for creating errors with context
impl Error {
    /// Create a deleter binding error from the binding step's failure
    #[must_use]
    pub fn deleter_binding(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        let source = source.into();
        Error::DeleterBinding {
            message: source.to_string(),
            source,
        }
    }

    /// Create an error describing a contained cleanup panic
    #[must_use]
    pub fn suppressed(failure: &SuppressedFailure) -> Self {
        Error::Suppressed {
            origin: failure.origin,
            message: failure.message.clone(),
        }
    }

    pub fn is_deleter_binding(&self) -> bool {
        matches!(self, Error::DeleterBinding { .. })
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, Error::Suppressed { .. })
    }
}
