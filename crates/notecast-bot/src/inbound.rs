//! Attachment extraction from inbound Telegram messages

use notecast_media::format::{is_supported_audio, is_supported_video, MediaKind};
use teloxide::types::Message;

/// How the platform delivered the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// Generic document that looks like audio
    AudioDocument,
    /// Native audio message
    Audio,
    /// Generic document that looks like video
    VideoDocument,
    /// Native video message
    Video,
}

impl AttachmentKind {
    pub fn media_kind(&self) -> MediaKind {
        match self {
            Self::AudioDocument | Self::Audio => MediaKind::Audio,
            Self::VideoDocument | Self::Video => MediaKind::Video,
        }
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Self::AudioDocument | Self::VideoDocument)
    }
}

/// File information needed to process an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub file_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    /// Size reported by Telegram; zero is treated as unknown.
    pub file_size: Option<u64>,
}

impl Attachment {
    pub fn media_kind(&self) -> MediaKind {
        self.kind.media_kind()
    }

    /// Name used for the temporary input file and the extension check.
    ///
    /// Falls back to `upload.mp3` / `upload.mp4` when Telegram sends no name.
    pub fn effective_name(&self) -> String {
        match self.file_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("upload{}", self.media_kind().default_extension()),
        }
    }
}

/// Decide whether a document is audio, video or neither.
///
/// MIME type and extension are independent hints; either one is enough.
/// Audio wins when both families match.
pub fn route_document(file_name: Option<&str>, mime_type: Option<&str>) -> Option<AttachmentKind> {
    let name = file_name.unwrap_or_default();
    let mime = mime_type.unwrap_or_default().to_ascii_lowercase();

    if mime.starts_with("audio/") || is_supported_audio(name) {
        Some(AttachmentKind::AudioDocument)
    } else if mime.starts_with("video/") || is_supported_video(name) {
        Some(AttachmentKind::VideoDocument)
    } else {
        None
    }
}

fn known_size(size: u32) -> Option<u64> {
    (size > 0).then_some(size as u64)
}

/// Pull the convertible attachment out of a message, if there is one.
pub fn extract_attachment(msg: &Message) -> Option<Attachment> {
    if let Some(audio) = msg.audio() {
        return Some(Attachment {
            kind: AttachmentKind::Audio,
            file_id: audio.file.id.clone(),
            file_name: audio.file_name.clone(),
            mime_type: audio.mime_type.as_ref().map(|m| m.to_string()),
            file_size: known_size(audio.file.size),
        });
    }

    if let Some(video) = msg.video() {
        return Some(Attachment {
            kind: AttachmentKind::Video,
            file_id: video.file.id.clone(),
            file_name: video.file_name.clone(),
            mime_type: video.mime_type.as_ref().map(|m| m.to_string()),
            file_size: known_size(video.file.size),
        });
    }

    let document = msg.document()?;
    let mime_type = document.mime_type.as_ref().map(|m| m.to_string());
    let kind = route_document(document.file_name.as_deref(), mime_type.as_deref())?;

    Some(Attachment {
        kind,
        file_id: document.file.id.clone(),
        file_name: document.file_name.clone(),
        mime_type,
        file_size: known_size(document.file.size),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(kind: AttachmentKind, file_name: Option<&str>) -> Attachment {
        Attachment {
            kind,
            file_id: "file-1".into(),
            file_name: file_name.map(str::to_string),
            mime_type: None,
            file_size: None,
        }
    }

    #[test]
    fn test_route_by_mime() {
        assert_eq!(
            route_document(Some("x.bin"), Some("audio/mpeg")),
            Some(AttachmentKind::AudioDocument)
        );
        assert_eq!(
            route_document(Some("x.bin"), Some("Video/MP4")),
            Some(AttachmentKind::VideoDocument)
        );
        assert_eq!(
            route_document(None, Some("audio/x-unknown")),
            Some(AttachmentKind::AudioDocument)
        );
    }

    #[test]
    fn test_route_by_extension() {
        assert_eq!(route_document(Some("song.FLAC"), None), Some(AttachmentKind::AudioDocument));
        assert_eq!(
            route_document(Some("clip.mkv"), Some("application/octet-stream")),
            Some(AttachmentKind::VideoDocument)
        );
    }

    #[test]
    fn test_video_extension_is_not_routed_as_audio() {
        assert_eq!(route_document(Some("movie.mp4"), None), Some(AttachmentKind::VideoDocument));
    }

    #[test]
    fn test_unrelated_documents_are_ignored() {
        assert_eq!(route_document(Some("report.pdf"), Some("application/pdf")), None);
        assert_eq!(route_document(None, None), None);
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(AttachmentKind::AudioDocument.media_kind(), MediaKind::Audio);
        assert_eq!(AttachmentKind::Audio.media_kind(), MediaKind::Audio);
        assert_eq!(AttachmentKind::VideoDocument.media_kind(), MediaKind::Video);
        assert_eq!(AttachmentKind::Video.media_kind(), MediaKind::Video);
        assert!(AttachmentKind::VideoDocument.is_document());
        assert!(!AttachmentKind::Audio.is_document());
    }

    #[test]
    fn test_effective_name_defaults_per_kind() {
        assert_eq!(attachment(AttachmentKind::Audio, None).effective_name(), "upload.mp3");
        assert_eq!(attachment(AttachmentKind::Video, Some("  ")).effective_name(), "upload.mp4");
        assert_eq!(
            attachment(AttachmentKind::VideoDocument, Some("Holiday.MOV")).effective_name(),
            "Holiday.MOV"
        );
    }

    #[test]
    fn test_known_size() {
        assert_eq!(known_size(0), None);
        assert_eq!(known_size(42), Some(42));
    }
}
