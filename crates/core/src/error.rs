//! Error types for benchmark operations.

/// Errors that can occur while loading data or running the benchmark.
#[derive(Debug, thiserror::Error)]
pub enum DpError {
    /// Invalid parameter provided.
    #[error("invalid parameter: {msg}")]
    InvalidParameters {
        /// Human-readable error description.
        msg: String,
    },

    /// Numerical computation error.
    #[error("numerical error: {msg}")]
    NumericalError {
        /// Human-readable error description.
        msg: String,
    },

    /// Malformed or inconsistent dataset input.
    #[error("dataset error: {msg}")]
    Dataset {
        /// Human-readable error description.
        msg: String,
    },

    /// Unsupported feature or configuration.
    #[error("unsupported feature: {msg}")]
    UnsupportedFeature {
        /// Human-readable error description.
        msg: String,
    },

    /// Underlying I/O failure.
    #[error("i/o error: {source}")]
    Io {
        /// The propagated I/O error.
        #[from]
        source: std::io::Error,
    },
}

/// Result type for benchmark operations.
pub type Result<T> = std::result::Result<T, DpError>;

impl DpError {
    /// Create an invalid parameter error.
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameters { msg: msg.into() }
    }

    /// Create a numerical error.
    pub fn numerical<S: Into<String>>(msg: S) -> Self {
        Self::NumericalError { msg: msg.into() }
    }

    /// Create a dataset error.
    pub fn dataset<S: Into<String>>(msg: S) -> Self {
        Self::Dataset { msg: msg.into() }
    }

    /// Create an unsupported feature error.
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        Self::UnsupportedFeature { msg: msg.into() }
    }
}
