//! Chat platform boundary
//!
//! The router only needs a handful of operations from the messenger. They
//! live behind [`ChatPlatform`] so the pipeline can run against an in-memory
//! fake in tests; [`TelegramPlatform`] is the real implementation.

use std::path::Path;

use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, MessageId, ReplyParameters};
use tracing::debug;

use crate::errors::PlatformError;

#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Send a text message, optionally as a reply, and return its id.
    async fn send_text(
        &self,
        chat: ChatId,
        reply_to: Option<MessageId>,
        text: &str,
    ) -> Result<MessageId, PlatformError>;

    /// Fetch an attachment into `destination` and return the bytes written.
    async fn download(&self, file_id: &str, destination: &Path) -> Result<u64, PlatformError>;

    async fn send_voice(
        &self,
        chat: ChatId,
        reply_to: MessageId,
        file: &Path,
    ) -> Result<(), PlatformError>;

    async fn send_video_note(
        &self,
        chat: ChatId,
        reply_to: MessageId,
        file: &Path,
    ) -> Result<(), PlatformError>;

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<(), PlatformError>;
}

/// [`ChatPlatform`] on top of a teloxide [`Bot`]
#[derive(Clone)]
pub struct TelegramPlatform {
    bot: Bot,
}

impl TelegramPlatform {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatPlatform for TelegramPlatform {
    async fn send_text(
        &self,
        chat: ChatId,
        reply_to: Option<MessageId>,
        text: &str,
    ) -> Result<MessageId, PlatformError> {
        let mut req = self.bot.send_message(chat, text);

        if let Some(reply_to) = reply_to {
            req.reply_parameters = Some(ReplyParameters::new(reply_to));
        }

        let sent = req.await?;
        Ok(sent.id)
    }

    async fn download(&self, file_id: &str, destination: &Path) -> Result<u64, PlatformError> {
        let file = self.bot.get_file(file_id).await?;
        debug!("Downloading {} ({} bytes) to {}", file.path, file.size, destination.display());

        let mut dst = tokio::fs::File::create(destination).await?;
        self.bot.download_file(&file.path, &mut dst).await?;
        dst.sync_all().await?;

        Ok(tokio::fs::metadata(destination).await?.len())
    }

    async fn send_voice(
        &self,
        chat: ChatId,
        reply_to: MessageId,
        file: &Path,
    ) -> Result<(), PlatformError> {
        let mut req = self.bot.send_voice(chat, InputFile::file(file.to_path_buf()));
        req.reply_parameters = Some(ReplyParameters::new(reply_to));
        req.await?;
        Ok(())
    }

    async fn send_video_note(
        &self,
        chat: ChatId,
        reply_to: MessageId,
        file: &Path,
    ) -> Result<(), PlatformError> {
        let mut req = self
            .bot
            .send_video_note(chat, InputFile::file(file.to_path_buf()));
        req.reply_parameters = Some(ReplyParameters::new(reply_to));
        req.await?;
        Ok(())
    }

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<(), PlatformError> {
        self.bot.delete_message(chat, message).await?;
        Ok(())
    }
}
