//! Error types for notecast-media

use std::time::Duration;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Everything that can go wrong while probing or converting a file
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("no video stream found in input file")]
    NoVideoStream,

    #[error("transcoder failed: {stderr}")]
    Failed { stderr: String },

    #[error("output file was not created")]
    MissingOutput,

    #[error("output file is empty")]
    EmptyOutput,

    #[error("transcoder timed out after {0:?}")]
    TimedOut(Duration),

    #[error("failed to launch transcoder: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("could not read probe output: {0}")]
    Probe(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// True when the transcoder ran but the result is unusable.
    pub fn is_postcondition(&self) -> bool {
        matches!(self, Self::MissingOutput | Self::EmptyOutput)
    }
}
