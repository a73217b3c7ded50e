//! Fixed transcoder parameter sets
//!
//! Telegram rejects voice notes and video notes that do not match its
//! format rules, so none of these values are caller-tunable. The only
//! inputs are facts about the source file (frame size and duration).

use std::time::Duration;

use crate::policy::{VIDEO_NOTE_LIMIT_BYTES, VIDEO_NOTE_MAX_DURATION, VIDEO_NOTE_MAX_SIDE};

/// Share of the video note size budget the encoder may spend; the rest is
/// container overhead and rate-control slack.
const SIZE_BUDGET_FILL: u64 = 95;
const MIN_VIDEO_BITRATE_KBPS: u32 = 100;
const MAX_VIDEO_BITRATE_KBPS: u32 = 8_000;

/// Opus voice note settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceNoteParams {
    pub codec: &'static str,
    pub sample_rate: u32,
    pub channels: u8,
    pub bitrate_kbps: u32,
    pub application: &'static str,
}

impl Default for VoiceNoteParams {
    fn default() -> Self {
        Self {
            codec: "libopus",
            sample_rate: 48_000,
            channels: 1,
            bitrate_kbps: 64,
            application: "voip",
        }
    }
}

impl VoiceNoteParams {
    fn output_args(&self) -> Vec<String> {
        vec![
            "-vn".into(),
            "-c:a".into(),
            self.codec.into(),
            "-ar".into(),
            self.sample_rate.to_string(),
            "-ac".into(),
            self.channels.to_string(),
            "-b:a".into(),
            format!("{}k", self.bitrate_kbps),
            "-application".into(),
            self.application.into(),
        ]
    }
}

/// Square H.264 video note settings derived from the source frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoNoteParams {
    /// Side of the centered square cut out of the source frame.
    pub crop_side: u32,
    /// Side of the encoded square frame.
    pub target_side: u32,
    pub max_duration: Duration,
    pub video_bitrate_kbps: u32,
    pub audio_bitrate_kbps: u32,
}

impl VideoNoteParams {
    pub const AUDIO_BITRATE_KBPS: u32 = 64;

    /// Build the parameter set for a source of `width`×`height`.
    ///
    /// `duration` is the probed source length; when unknown the full
    /// 60 second budget is assumed, which yields the most conservative
    /// bitrate.
    pub fn for_source(width: u32, height: u32, duration: Option<Duration>) -> Self {
        let crop_side = width.min(height);
        Self {
            crop_side,
            target_side: square_side(width, height),
            max_duration: VIDEO_NOTE_MAX_DURATION,
            video_bitrate_kbps: fit_video_bitrate(duration, Self::AUDIO_BITRATE_KBPS),
            audio_bitrate_kbps: Self::AUDIO_BITRATE_KBPS,
        }
    }

    fn input_args(&self) -> Vec<String> {
        vec!["-t".into(), self.max_duration.as_secs().to_string()]
    }

    fn output_args(&self) -> Vec<String> {
        let filter = format!(
            "crop={c}:{c},scale={t}:{t}",
            c = self.crop_side,
            t = self.target_side
        );
        let rate = format!("{}k", self.video_bitrate_kbps);
        vec![
            "-vf".into(),
            filter,
            "-c:v".into(),
            "libx264".into(),
            "-pix_fmt".into(),
            "yuv420p".into(),
            "-movflags".into(),
            "+faststart".into(),
            "-preset".into(),
            "fast".into(),
            "-t".into(),
            self.max_duration.as_secs().to_string(),
            "-b:v".into(),
            rate.clone(),
            "-maxrate".into(),
            rate,
            "-bufsize".into(),
            format!("{}k", self.video_bitrate_kbps * 2),
            "-c:a".into(),
            "aac".into(),
            "-b:a".into(),
            format!("{}k", self.audio_bitrate_kbps),
        ]
    }
}

/// min(width, height, 1280), rounded down to an even number for yuv420p.
pub fn square_side(width: u32, height: u32) -> u32 {
    let side = width.min(height).min(VIDEO_NOTE_MAX_SIDE);
    (side & !1).max(2)
}

/// Video bitrate that keeps a note of `duration` under the size limit.
pub fn fit_video_bitrate(duration: Option<Duration>, audio_kbps: u32) -> u32 {
    let budget_kbit = VIDEO_NOTE_LIMIT_BYTES * 8 * SIZE_BUDGET_FILL / 100 / 1000;
    let seconds = duration
        .unwrap_or(VIDEO_NOTE_MAX_DURATION)
        .min(VIDEO_NOTE_MAX_DURATION)
        .as_secs_f64()
        .max(1.0);
    let total_kbps = (budget_kbit as f64 / seconds) as u32;
    total_kbps
        .saturating_sub(audio_kbps)
        .clamp(MIN_VIDEO_BITRATE_KBPS, MAX_VIDEO_BITRATE_KBPS)
}

/// One of the two fixed conversions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscodeParams {
    VoiceNote(VoiceNoteParams),
    VideoNote(VideoNoteParams),
}

impl TranscodeParams {
    /// Arguments placed before `-i <input>`.
    pub fn input_args(&self) -> Vec<String> {
        match self {
            Self::VoiceNote(_) => Vec::new(),
            Self::VideoNote(p) => p.input_args(),
        }
    }

    /// Arguments placed between the input and the output path.
    pub fn output_args(&self) -> Vec<String> {
        match self {
            Self::VoiceNote(p) => p.output_args(),
            Self::VideoNote(p) => p.output_args(),
        }
    }

    /// Extension of the file this conversion produces.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::VoiceNote(_) => ".ogg",
            Self::VideoNote(_) => ".mp4",
        }
    }
}
