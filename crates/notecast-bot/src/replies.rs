//! User-facing texts

use notecast_media::MediaKind;
use notecast_media::policy::format_megabytes;

use crate::errors::{ErrorKind, HandlerError};

pub const WELCOME: &str = "Welcome to the Audio/Video to Voice/Video Note Converter Bot!\n\n\
Send me an audio file (MP3, WAV, etc.) to convert it to a Telegram voice note.\n\
Send me a video file (MP4, AVI, etc.) to convert it to a Telegram video note.";

pub fn processing_notice(kind: MediaKind) -> String {
    format!("Processing your {} file...", kind)
}

/// The single reply sent when an upload cannot be converted.
pub fn error_reply(kind: MediaKind, err: &HandlerError) -> String {
    match (err, kind) {
        (HandlerError::OversizeInput { size }, _) => format!(
            "File is too large ({} MB). Telegram supports files up to 20 MB.",
            format_megabytes(*size)
        ),
        (HandlerError::OversizeOutput { size }, MediaKind::Audio) => format!(
            "Converted audio is too large ({} MB). Telegram supports voice notes up to 20 MB.",
            format_megabytes(*size)
        ),
        (HandlerError::OversizeOutput { size }, MediaKind::Video) => format!(
            "Converted video is too large ({} MB). Telegram video notes must be under 8 MB.",
            format_megabytes(*size)
        ),
        _ => canned_reply(kind, err.kind()).to_string(),
    }
}

fn canned_reply(kind: MediaKind, error: ErrorKind) -> &'static str {
    use ErrorKind::*;

    match (kind, error) {
        (MediaKind::Audio, UnsupportedFormat) => {
            "Unsupported file format. Please send an audio file (MP3, WAV, FLAC, etc.)."
        }
        (MediaKind::Video, UnsupportedFormat) => {
            "Unsupported video format. Please send a video file (MP4, AVI, MOV, etc.)."
        }
        (MediaKind::Audio, ConversionFailed | TimedOut) => {
            "Failed to convert the audio file. Please ensure it's in a valid audio format."
        }
        (MediaKind::Video, ConversionFailed | TimedOut) => {
            "Failed to convert the video file. Please ensure it's in a valid video format."
        }
        (MediaKind::Audio, EmptyOutput | MissingOutput) => {
            "Conversion failed. The audio file may be corrupted or in an unsupported format."
        }
        (MediaKind::Video, EmptyOutput | MissingOutput) => {
            "Video conversion failed. The video file may be corrupted or in an unsupported format."
        }
        (MediaKind::Video, NoVideoStream) => "The file does not contain a valid video stream.",
        (MediaKind::Audio, _) => {
            "An error occurred while processing your audio file. Please ensure it's a valid audio file."
        }
        (MediaKind::Video, _) => {
            "An error occurred while processing your video file. Please ensure it's a valid video file."
        }
    }
}
