//! Media conversion core for the notecast bot
//!
//! This crate owns everything the bot knows about media: which file
//! extensions are accepted, the size limits Telegram enforces, the fixed
//! ffmpeg parameter sets for voice notes and video notes, and the converter
//! that drives the external transcoder and hands back a temporary output file.

pub mod converter;
pub mod error;
pub mod ffmpeg;
pub mod format;
pub mod params;
pub mod policy;
pub mod transcoder;

// Re-export commonly used types
pub use converter::{ConvertedMedia, MediaConverter};
pub use error::{ConvertError, Result};
pub use ffmpeg::FfmpegTranscoder;
pub use format::{is_supported, is_supported_audio, is_supported_video, MediaKind};
pub use params::{TranscodeParams, VideoNoteParams, VoiceNoteParams};
pub use policy::{exceeds_general_limit, exceeds_video_note_limit};
pub use transcoder::{ProbeReport, StreamInfo, StreamKind, Transcoder};
