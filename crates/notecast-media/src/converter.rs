//! Voice note and video note conversion
//!
//! Every conversion writes into a fresh temporary file inside the
//! converter's work directory. The file is owned by a [`TempPath`], so it is
//! removed as soon as the conversion fails or the caller drops the returned
//! [`ConvertedMedia`].

use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::{debug, info};

use crate::error::{ConvertError, Result};
use crate::format::MediaKind;
use crate::params::{TranscodeParams, VideoNoteParams, VoiceNoteParams};
use crate::transcoder::Transcoder;

/// Prefix of every temporary file notecast creates.
pub const TEMP_PREFIX: &str = "notecast-";

/// A converted file that is deleted when dropped
#[derive(Debug)]
pub struct ConvertedMedia {
    path: TempPath,
    size: u64,
    kind: MediaKind,
}

impl ConvertedMedia {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }
}

/// Drives a [`Transcoder`] through the two fixed conversions.
pub struct MediaConverter<T> {
    transcoder: T,
    work_dir: PathBuf,
}

impl<T: Transcoder> MediaConverter<T> {
    pub fn new(transcoder: T, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            transcoder,
            work_dir: work_dir.into(),
        }
    }

    pub fn transcoder(&self) -> &T {
        &self.transcoder
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Convert to whichever note matches `kind`.
    pub async fn convert(&self, kind: MediaKind, input: &Path) -> Result<ConvertedMedia> {
        match kind {
            MediaKind::Audio => self.convert_audio_to_voice_note(input).await,
            MediaKind::Video => self.convert_video_to_video_note(input).await,
        }
    }

    /// Mono 48 kHz Opus at 64 kbit/s in an Ogg container.
    pub async fn convert_audio_to_voice_note(&self, input: &Path) -> Result<ConvertedMedia> {
        let params = TranscodeParams::VoiceNote(VoiceNoteParams::default());
        self.run(input, &params, MediaKind::Audio).await
    }

    /// Square H.264 MP4, at most 60 seconds, sized for the 8 MiB limit.
    pub async fn convert_video_to_video_note(&self, input: &Path) -> Result<ConvertedMedia> {
        let report = self.transcoder.probe(input).await?;
        let (width, height) = report
            .first_video_dimensions()
            .ok_or(ConvertError::NoVideoStream)?;

        let params = VideoNoteParams::for_source(width, height, report.duration);
        debug!(
            "Video note for {}x{} source: side {} at {}k",
            width, height, params.target_side, params.video_bitrate_kbps
        );

        self.run(input, &TranscodeParams::VideoNote(params), MediaKind::Video)
            .await
    }

    async fn run(
        &self,
        input: &Path,
        params: &TranscodeParams,
        kind: MediaKind,
    ) -> Result<ConvertedMedia> {
        let output = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(params.extension())
            .tempfile_in(&self.work_dir)?
            .into_temp_path();

        // `output` is dropped, and the file removed, on every early return below
        self.transcoder.transcode(input, &output, params).await?;

        let size = match tokio::fs::metadata(&output).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConvertError::MissingOutput);
            }
            Err(e) => return Err(e.into()),
        };

        if size == 0 {
            return Err(ConvertError::EmptyOutput);
        }

        info!("Converted {} to {} note ({} bytes)", input.display(), kind, size);

        Ok(ConvertedMedia {
            path: output,
            size,
            kind,
        })
    }
}
