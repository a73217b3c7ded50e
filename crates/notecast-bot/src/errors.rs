//! Error types for the bot
//!
//! `PlatformError` wraps teloxide failures and classifies them for logging;
//! `HandlerError` is everything a single upload can fail with, and is what
//! the router matches on to pick a reply.

use std::time::Duration;

use notecast_media::ConvertError;
use teloxide::{ApiError, DownloadError, RequestError};
use thiserror::Error;
use tracing::{debug, warn};

/// A failed call to the chat platform
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Telegram request failed: {0}")]
    Request(#[from] RequestError),

    #[error("file download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a platform failure means for the current upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorOutcome {
    /// Flood control; the chat can be written to again after this long
    RetryAfter(Duration),
    /// The chat is gone or the bot lost access; further replies are pointless
    Permanent(String),
    /// Anything else
    Transient(String),
}

impl PlatformError {
    pub fn outcome(&self) -> ErrorOutcome {
        match self {
            Self::Request(err) => classify(err),
            other => ErrorOutcome::Transient(other.to_string()),
        }
    }
}

/// Classify a `RequestError`.
pub fn classify(err: &RequestError) -> ErrorOutcome {
    match err {
        RequestError::RetryAfter(secs) => {
            let wait = Duration::from_secs(secs.duration().as_secs().max(1));
            warn!("Flood control: retry after {:?}", wait);
            ErrorOutcome::RetryAfter(wait)
        }
        RequestError::MigrateToChatId(new_id) => {
            ErrorOutcome::Permanent(format!("chat migrated to {}", new_id.0))
        }
        RequestError::Network(_) | RequestError::Io(_) | RequestError::InvalidJson { .. } => {
            debug!("Transient Telegram failure: {}", err);
            ErrorOutcome::Transient(err.to_string())
        }
        RequestError::Api(api_err) => classify_api(api_err),
    }
}

fn classify_api(api_err: &ApiError) -> ErrorOutcome {
    match api_err {
        ApiError::BotBlocked
        | ApiError::BotKicked
        | ApiError::BotKickedFromSupergroup
        | ApiError::ChatNotFound
        | ApiError::UserDeactivated
        | ApiError::CantInitiateConversation
        | ApiError::InvalidToken => ErrorOutcome::Permanent(api_err.to_string()),
        other => ErrorOutcome::Transient(other.to_string()),
    }
}

/// Failure of one upload, as seen by the router
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("unsupported file extension {extension:?}")]
    UnsupportedFormat { extension: Option<String> },

    #[error("input is too large ({size} bytes)")]
    OversizeInput { size: u64 },

    #[error("converted file is too large ({size} bytes)")]
    OversizeOutput { size: u64 },

    #[error("conversion failed: {0}")]
    Conversion(#[from] ConvertError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Flat tag for a `HandlerError`, used for reply selection and log fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedFormat,
    OversizeInput,
    OversizeOutput,
    ConversionFailed,
    TimedOut,
    EmptyOutput,
    MissingOutput,
    NoVideoStream,
    Other,
}

impl HandlerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::OversizeInput { .. } => ErrorKind::OversizeInput,
            Self::OversizeOutput { .. } => ErrorKind::OversizeOutput,
            Self::Conversion(err) => match err {
                ConvertError::Failed { .. } => ErrorKind::ConversionFailed,
                ConvertError::TimedOut(_) => ErrorKind::TimedOut,
                ConvertError::EmptyOutput => ErrorKind::EmptyOutput,
                ConvertError::MissingOutput => ErrorKind::MissingOutput,
                ConvertError::NoVideoStream => ErrorKind::NoVideoStream,
                ConvertError::Spawn(_) | ConvertError::Probe(_) | ConvertError::Io(_) => {
                    ErrorKind::Other
                }
            },
            Self::Platform(_) | Self::Io(_) => ErrorKind::Other,
        }
    }

    /// Expected rejections are logged at `warn`, the rest at `error`.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::UnsupportedFormat | ErrorKind::OversizeInput | ErrorKind::OversizeOutput
        )
    }
}
