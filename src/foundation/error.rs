use std::path::PathBuf;

/// Convenience result type used across spindle.
pub type SpindleResult<T> = Result<T, SpindleError>;

/// Top-level error taxonomy used by library APIs.
#[derive(thiserror::Error, Debug)]
pub enum SpindleError {
    /// Invalid user-provided configuration or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// One of the three scene assets could not be read or decoded.
    #[error("asset {index} ('{}') failed to load: {reason}", path.display())]
    AssetLoad {
        /// Slot index (0-based) of the failing asset.
        index: usize,
        /// Resolved path of the asset source.
        path: PathBuf,
        /// Human-readable cause.
        reason: String,
    },

    /// The asset barrier did not resolve within the configured bound.
    #[error("asset loading timed out after {waited_ms} ms ({pending} still pending)")]
    AssetTimeout {
        /// Milliseconds spent waiting.
        waited_ms: u64,
        /// Number of slots that never completed.
        pending: usize,
    },

    /// Errors while rasterizing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Errors while writing frames to a sink.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SpindleError {
    /// Build a [`SpindleError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SpindleError::AssetLoad`] value.
    pub fn asset_load(index: usize, path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::AssetLoad {
            index,
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`SpindleError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SpindleError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
