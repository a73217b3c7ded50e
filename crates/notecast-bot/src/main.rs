//! notecast-bot
//!
//! Telegram bot that converts uploaded audio into voice notes and uploaded
//! video into round video notes, using ffmpeg for the actual work.

mod config;
mod context;
mod errors;
mod handlers;
mod inbound;
mod platform;
mod replies;

use anyhow::{Context as _, Result};
use clap::Parser;
use teloxide::prelude::*;
use teloxide::types::Message;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Args, Config, SystemEnv};
use crate::context::AppContext;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notecast_bot=debug,notecast_media=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting notecast bot");

    let args = Args::parse();
    let config = Config::load(args, &SystemEnv)?;

    info!("Configuration loaded successfully");
    info!(
        "ffmpeg: {}, ffprobe: {}, timeout: {}s",
        config.media.ffmpeg_path.display(),
        config.media.ffprobe_path.display(),
        config.media.transcode_timeout_secs
    );

    let work_dir = config.media.work_dir();
    tokio::fs::create_dir_all(&work_dir)
        .await
        .with_context(|| format!("Failed to create work directory {}", work_dir.display()))?;
    info!("Work directory: {}", work_dir.display());

    let ctx = AppContext::new(&config.media);
    if !ctx.converter.transcoder().check_available().await {
        warn!("ffmpeg is not available; every conversion will fail until it is installed");
    }

    let bot = Bot::new(&config.telegram.bot_token);

    match bot.get_me().await {
        Ok(me) => info!("Bot authenticated as: @{}", me.username()),
        Err(e) => {
            error!("Failed to authenticate bot: {}", e);
            return Err(e.into());
        }
    }

    let handler = Update::filter_message()
        .branch(
            dptree::filter_map(|msg: Message| msg.text().and_then(handlers::parse_command))
                .endpoint(handlers::handle_command),
        )
        .branch(
            dptree::filter_map(|msg: Message| inbound::extract_attachment(&msg))
                .endpoint(handlers::handle_attachment),
        );

    info!("Bot initialized, starting message dispatcher...");

    // Uploads are independent, so every update runs concurrently
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![ctx])
        .distribution_function(|_| None::<std::convert::Infallible>)
        .default_handler(|_| async {})
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("notecast bot stopped");
    Ok(())
}
