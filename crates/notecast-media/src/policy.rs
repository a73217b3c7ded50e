//! Telegram size and shape limits

use std::time::Duration;

use crate::format::MediaKind;

const MIB: u64 = 1024 * 1024;

/// Largest file a bot may download or upload as a voice note.
pub const GENERAL_LIMIT_BYTES: u64 = 20 * MIB;

/// Largest video note Telegram accepts.
pub const VIDEO_NOTE_LIMIT_BYTES: u64 = 8 * MIB;

/// Video notes are cut to this length.
pub const VIDEO_NOTE_MAX_DURATION: Duration = Duration::from_secs(60);

/// Upper bound on the side of the square video note frame, in pixels.
pub const VIDEO_NOTE_MAX_SIDE: u32 = 1280;

pub fn exceeds_general_limit(bytes: u64) -> bool {
    bytes > GENERAL_LIMIT_BYTES
}

pub fn exceeds_video_note_limit(bytes: u64) -> bool {
    bytes > VIDEO_NOTE_LIMIT_BYTES
}

/// Limit a converted file of the given kind is checked against.
pub fn output_limit(kind: MediaKind) -> u64 {
    match kind {
        MediaKind::Audio => GENERAL_LIMIT_BYTES,
        MediaKind::Video => VIDEO_NOTE_LIMIT_BYTES,
    }
}

/// Post-conversion check for a converted file of the given kind.
pub fn exceeds_output_limit(kind: MediaKind, bytes: u64) -> bool {
    match kind {
        MediaKind::Audio => exceeds_general_limit(bytes),
        MediaKind::Video => exceeds_video_note_limit(bytes),
    }
}

/// Size in MB with two decimals, as shown to users.
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / MIB as f64)
}
