//! Shared application state handed to every handler

use std::sync::Arc;

use notecast_media::{FfmpegTranscoder, MediaConverter};

use crate::config::MediaConfig;

/// Built once at startup and injected into the dispatcher.
#[derive(Clone)]
pub struct AppContext {
    pub converter: Arc<MediaConverter<FfmpegTranscoder>>,
}

impl AppContext {
    pub fn new(media: &MediaConfig) -> Self {
        let transcoder = FfmpegTranscoder::new(&media.ffmpeg_path, &media.ffprobe_path)
            .with_timeout(media.transcode_timeout());

        Self {
            converter: Arc::new(MediaConverter::new(transcoder, media.work_dir())),
        }
    }
}
