//! Boundary to the external transcoder

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};
use crate::params::TranscodeParams;

/// Stream type as reported by the prober
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Data,
    Attachment,
    #[serde(other)]
    Unknown,
}

/// One stream of a probed container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfo {
    #[serde(rename = "codec_type")]
    pub kind: StreamKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default)]
    pub disposition: Disposition,
}

/// Stream flags; only the ones the converter cares about
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disposition {
    /// Embedded cover art shows up as a single-frame video stream.
    #[serde(default)]
    pub attached_pic: u8,
}

/// What the prober learned about an input file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeReport {
    pub streams: Vec<StreamInfo>,
    pub duration: Option<Duration>,
}

impl ProbeReport {
    /// Width and height of the first video stream that reports both.
    pub fn first_video_dimensions(&self) -> Option<(u32, u32)> {
        self.streams
            .iter()
            .filter(|s| s.kind == StreamKind::Video && s.disposition.attached_pic == 0)
            .find_map(|s| match (s.width, s.height) {
                (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
                _ => None,
            })
    }

    /// Parse the JSON printed by `ffprobe -print_format json -show_streams -show_format`.
    pub fn from_ffprobe_json(raw: &[u8]) -> Result<Self> {
        #[derive(Deserialize)]
        struct Format {
            #[serde(default)]
            duration: Option<String>,
        }

        #[derive(Deserialize)]
        struct Output {
            #[serde(default)]
            streams: Vec<StreamInfo>,
            #[serde(default)]
            format: Option<Format>,
        }

        let output: Output =
            serde_json::from_slice(raw).map_err(|e| ConvertError::Probe(e.to_string()))?;

        let duration = output
            .format
            .and_then(|f| f.duration)
            .and_then(|d| d.trim().parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64);

        Ok(Self {
            streams: output.streams,
            duration,
        })
    }
}

/// Anything that can inspect and convert media files.
///
/// The production implementation shells out to ffmpeg; tests script the
/// results instead.
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn probe(&self, input: &Path) -> Result<ProbeReport>;

    /// Convert `input` into `output`, overwriting whatever is there.
    async fn transcode(&self, input: &Path, output: &Path, params: &TranscodeParams) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_HD_PROBE: &str = r#"{
        "streams": [
            {"index": 0, "codec_name": "aac", "codec_type": "audio", "sample_rate": "44100"},
            {"index": 1, "codec_name": "h264", "codec_type": "video", "width": 1920, "height": 1080}
        ],
        "format": {"filename": "in.mp4", "duration": "30.016000"}
    }"#;

    #[test]
    fn test_parse_ffprobe_output() {
        let report = ProbeReport::from_ffprobe_json(FULL_HD_PROBE.as_bytes()).unwrap();
        assert_eq!(report.streams.len(), 2);
        assert_eq!(report.streams[0].kind, StreamKind::Audio);
        assert_eq!(report.first_video_dimensions(), Some((1920, 1080)));
        let secs = report.duration.unwrap().as_secs_f64();
        assert!((secs - 30.016).abs() < 1e-6);
    }

    #[test]
    fn test_audio_only_has_no_video_dimensions() {
        let raw = r#"{"streams":[{"codec_type":"audio","codec_name":"mp3"}],"format":{}}"#;
        let report = ProbeReport::from_ffprobe_json(raw.as_bytes()).unwrap();
        assert_eq!(report.first_video_dimensions(), None);
        assert_eq!(report.duration, None);
    }

    #[test]
    fn test_unknown_stream_type_is_tolerated() {
        let raw = r#"{"streams":[{"codec_type":"something_new"},{"codec_type":"video","width":640,"height":480}]}"#;
        let report = ProbeReport::from_ffprobe_json(raw.as_bytes()).unwrap();
        assert_eq!(report.streams[0].kind, StreamKind::Unknown);
        assert_eq!(report.first_video_dimensions(), Some((640, 480)));
    }

    #[test]
    fn test_video_stream_without_size_is_skipped() {
        let raw = r#"{"streams":[{"codec_type":"video"},{"codec_type":"video","width":0,"height":10}]}"#;
        let report = ProbeReport::from_ffprobe_json(raw.as_bytes()).unwrap();
        assert_eq!(report.first_video_dimensions(), None);
    }

    #[test]
    fn test_cover_art_is_not_a_video_stream() {
        let raw = r#"{"streams":[
            {"codec_type":"audio","codec_name":"mp3"},
            {"codec_type":"video","codec_name":"mjpeg","width":500,"height":500,"disposition":{"default":0,"attached_pic":1}}
        ]}"#;
        let report = ProbeReport::from_ffprobe_json(raw.as_bytes()).unwrap();
        assert_eq!(report.first_video_dimensions(), None);
    }

    #[test]
    fn test_garbage_probe_output() {
        let err = ProbeReport::from_ffprobe_json(b"not json").unwrap_err();
        assert!(matches!(err, ConvertError::Probe(_)));
    }
}
