//! Message handlers for Telegram updates
//!
//! Every upload goes through the same pipeline: post a processing notice,
//! check the reported size, download, check a document's extension, convert,
//! check the converted size, reply with the note, and remove the notice. Both
//! temporary files are `TempPath` guards, so they are gone by the time
//! [`process_attachment`] returns, whichever way it returns.


use notecast_media::converter::TEMP_PREFIX;
use notecast_media::format::extension_of;
use notecast_media::policy::{exceeds_general_limit, exceeds_output_limit};
use notecast_media::{MediaConverter, MediaKind, Transcoder};
use teloxide::prelude::*;
use teloxide::types::{Message, MessageId};
use tracing::{debug, error, info, warn};

use crate::context::AppContext;
use crate::errors::{ErrorOutcome, HandlerError};
use crate::inbound::Attachment;
use crate::platform::{ChatPlatform, TelegramPlatform};
use crate::replies;

/// Commands the bot answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
}

/// Parse `/start`, `/help` and their `@botname` forms.
pub fn parse_command(text: &str) -> Option<BotCommand> {
    let first = text.split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or_default().to_lowercase();

    match name.as_str() {
        "start" => Some(BotCommand::Start),
        "help" => Some(BotCommand::Help),
        _ => None,
    }
}

/// Handle /start and /help
pub async fn handle_command(bot: Bot, msg: Message, command: BotCommand) -> ResponseResult<()> {
    info!("Received command {:?} in chat {}", command, msg.chat.id);

    if let Err(e) = bot.send_message(msg.chat.id, replies::WELCOME).await {
        error!("Failed to send welcome message: {}", e);
    }

    Ok(())
}

/// Handle audio, video and media documents
pub async fn handle_attachment(
    bot: Bot,
    msg: Message,
    attachment: Attachment,
    ctx: AppContext,
) -> ResponseResult<()> {
    debug!(
        document = attachment.kind.is_document(),
        mime = ?attachment.mime_type,
        "Received {:?} {:?} ({:?} bytes) in chat {}",
        attachment.kind,
        attachment.file_name,
        attachment.file_size,
        msg.chat.id
    );

    let platform = TelegramPlatform::new(bot);
    // Failures have already been reported to the user and logged
    let _ = process_attachment(&platform, &ctx.converter, msg.chat.id, msg.id, &attachment).await;

    Ok(())
}

/// Run one upload through the pipeline and report the result in the chat.
///
/// Always leaves the chat in a finished state: either the note was sent or a
/// single error reply was. The returned error is informational.
pub async fn process_attachment<P, T>(
    platform: &P,
    converter: &MediaConverter<T>,
    chat: ChatId,
    origin: MessageId,
    attachment: &Attachment,
) -> Result<(), HandlerError>
where
    P: ChatPlatform + ?Sized,
    T: Transcoder,
{
    let kind = attachment.media_kind();

    let notice = match platform
        .send_text(chat, None, &replies::processing_notice(kind))
        .await
    {
        Ok(id) => Some(id),
        Err(e) => {
            warn!("Failed to post processing notice in chat {}: {}", chat, e);
            None
        }
    };

    let result = convert_and_reply(platform, converter, chat, origin, attachment).await;

    if let Err(err) = &result {
        report_failure(platform, chat, origin, kind, err).await;
    } else {
        info!(chat_id = chat.0, %kind, "Delivered {} note", kind);
    }

    if let Some(notice) = notice
        && let Err(e) = platform.delete_message(chat, notice).await
    {
        debug!("Could not delete processing notice in chat {}: {}", chat, e);
    }

    result
}

async fn convert_and_reply<P, T>(
    platform: &P,
    converter: &MediaConverter<T>,
    chat: ChatId,
    origin: MessageId,
    attachment: &Attachment,
) -> Result<(), HandlerError>
where
    P: ChatPlatform + ?Sized,
    T: Transcoder,
{
    let kind = attachment.media_kind();

    if let Some(size) = attachment.file_size.filter(|size| exceeds_general_limit(*size)) {
        return Err(HandlerError::OversizeInput { size });
    }

    let name = attachment.effective_name();
    let extension = extension_of(&name);
    let suffix = extension
        .clone()
        .unwrap_or_else(|| kind.default_extension().to_string());

    let input = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(&suffix)
        .tempfile_in(converter.work_dir())?
        .into_temp_path();

    let downloaded = platform.download(&attachment.file_id, &input).await?;
    debug!("Downloaded {} bytes into {}", downloaded, input.display());

    // Native audio and video are converted as sent; only documents are gated
    if attachment.kind.is_document() && !kind.is_supported(&name) {
        return Err(HandlerError::UnsupportedFormat { extension });
    }

    let converted = converter.convert(kind, &input).await?;

    if exceeds_output_limit(kind, converted.size()) {
        return Err(HandlerError::OversizeOutput {
            size: converted.size(),
        });
    }

    match kind {
        MediaKind::Audio => platform.send_voice(chat, origin, converted.path()).await?,
        MediaKind::Video => {
            platform
                .send_video_note(chat, origin, converted.path())
                .await?
        }
    }

    Ok(())
}

async fn report_failure<P>(
    platform: &P,
    chat: ChatId,
    origin: MessageId,
    kind: MediaKind,
    err: &HandlerError,
) where
    P: ChatPlatform + ?Sized,
{
    if err.is_rejection() {
        warn!(chat_id = chat.0, %kind, error_kind = ?err.kind(), "Rejected upload: {}", err);
    } else {
        error!(
            chat_id = chat.0,
            %kind,
            error_kind = ?err.kind(),
            "Error processing {} file: {}",
            kind,
            err
        );
    }

    // No point replying into a chat the bot can no longer write to
    if let HandlerError::Platform(platform_err) = err
        && let ErrorOutcome::Permanent(reason) = platform_err.outcome()
    {
        warn!("Skipping error reply in chat {}: {}", chat, reason);
        return;
    }

    let text = replies::error_reply(kind, err);
    if let Err(e) = platform.send_text(chat, Some(origin), &text).await {
        error!("Failed to send error reply in chat {}: {}", chat, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("/start"), Some(BotCommand::Start));
        assert_eq!(parse_command("/START now"), Some(BotCommand::Start));
        assert_eq!(parse_command("/help@notecast_bot"), Some(BotCommand::Help));
        assert_eq!(parse_command("/stop"), None);
        assert_eq!(parse_command("start"), None);
        assert_eq!(parse_command(""), None);
    }
}
