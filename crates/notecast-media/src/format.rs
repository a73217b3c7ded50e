//! File-extension allow-lists for convertible media

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Audio extensions ffmpeg is trusted to turn into a voice note.
pub const AUDIO_EXTENSIONS: &[&str] = &[
    ".mp3", ".wav", ".flac", ".aac", ".m4a", ".wma", ".ogg", ".opus",
];

/// Video extensions ffmpeg is trusted to turn into a video note.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    ".mp4", ".avi", ".mov", ".mkv", ".wmv", ".flv", ".webm", ".m4v", ".3gp",
];

/// Broad media family of an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// Classify a file name by extension. `None` means unsupported.
    pub fn classify(name: &str) -> Option<Self> {
        if is_supported_audio(name) {
            Some(Self::Audio)
        } else if is_supported_video(name) {
            Some(Self::Video)
        } else {
            None
        }
    }

    /// Whether `name` carries an extension accepted for this kind.
    pub fn is_supported(&self, name: &str) -> bool {
        match self {
            Self::Audio => is_supported_audio(name),
            Self::Video => is_supported_video(name),
        }
    }

    /// Extension assumed when the platform gives no file name.
    pub fn default_extension(&self) -> &'static str {
        match self {
            Self::Audio => ".mp3",
            Self::Video => ".mp4",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercased extension of `name` including the leading dot.
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext.to_lowercase()))
}

pub fn is_supported_audio(name: &str) -> bool {
    extension_of(name).is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.as_str()))
}

pub fn is_supported_video(name: &str) -> bool {
    extension_of(name).is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

/// Either an audio or a video extension.
pub fn is_supported(name: &str) -> bool {
    is_supported_audio(name) || is_supported_video(name)
}
