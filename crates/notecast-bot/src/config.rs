//! Configuration management for notecast-bot
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables, then command-line flags. Only the bot token is
//! required.

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "config/notecast.toml";

const ENV_BOT_TOKEN: &str = "BOT_TOKEN";
const ENV_FFMPEG_PATH: &str = "FFMPEG_PATH";
const ENV_FFPROBE_PATH: &str = "FFPROBE_PATH";
const ENV_TRANSCODE_TIMEOUT_SECS: &str = "TRANSCODE_TIMEOUT_SECS";
const ENV_WORK_DIR: &str = "NOTECAST_WORK_DIR";

const MIN_TIMEOUT_SECS: u64 = 1;

/// Source of environment variables
pub trait ReadEnv {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment.
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// notecast-bot CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Telegram bot token (overrides BOT_TOKEN and the config file)
    #[arg(long)]
    pub bot_token: Option<String>,

    /// ffmpeg executable
    #[arg(long)]
    pub ffmpeg: Option<PathBuf>,

    /// ffprobe executable
    #[arg(long)]
    pub ffprobe: Option<PathBuf>,

    /// Upper bound on a single transcoder run, in seconds
    #[arg(long)]
    pub transcode_timeout_secs: Option<u64>,

    /// Directory for temporary input and output files
    #[arg(long)]
    pub work_dir: Option<PathBuf>,
}

/// Complete bot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from BotFather
    #[serde(default)]
    pub bot_token: String,
}

/// Transcoder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub transcode_timeout_secs: u64,
    /// Defaults to the OS temp directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,
}

impl MediaConfig {
    pub fn transcode_timeout(&self) -> Duration {
        Duration::from_secs(self.transcode_timeout_secs)
    }

    pub fn work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(config)
    }

    /// Build the effective configuration from CLI args and the environment.
    pub fn load<E: ReadEnv>(args: Args, env: &E) -> Result<Self> {
        let mut config = if Path::new(&args.config).exists() {
            info!("Loading config from file: {}", args.config);
            Config::from_file(&args.config)?
        } else {
            info!("Config file {} not found, using environment variables", args.config);
            Config::default()
        };

        config.apply_env(env);
        config.apply_args(args);
        config.validate()?;

        Ok(config)
    }

    fn apply_env<E: ReadEnv>(&mut self, env: &E) {
        if let Some(token) = env.var(ENV_BOT_TOKEN) {
            self.telegram.bot_token = token;
        }
        if let Some(path) = env.var(ENV_FFMPEG_PATH) {
            self.media.ffmpeg_path = path.into();
        }
        if let Some(path) = env.var(ENV_FFPROBE_PATH) {
            self.media.ffprobe_path = path.into();
        }
        if let Some(raw) = env.var(ENV_TRANSCODE_TIMEOUT_SECS) {
            match raw.parse::<u64>() {
                Ok(secs) if secs >= MIN_TIMEOUT_SECS => self.media.transcode_timeout_secs = secs,
                Ok(secs) => warn!(
                    "{ENV_TRANSCODE_TIMEOUT_SECS}={secs} is below minimum ({MIN_TIMEOUT_SECS}), using {}",
                    self.media.transcode_timeout_secs
                ),
                Err(_) => warn!(
                    "{ENV_TRANSCODE_TIMEOUT_SECS}={raw:?} is not a valid integer, using {}",
                    self.media.transcode_timeout_secs
                ),
            }
        }
        if let Some(dir) = env.var(ENV_WORK_DIR) {
            self.media.work_dir = Some(dir.into());
        }
    }

    fn apply_args(&mut self, args: Args) {
        if let Some(token) = args.bot_token {
            self.telegram.bot_token = token;
        }
        if let Some(path) = args.ffmpeg {
            self.media.ffmpeg_path = path;
        }
        if let Some(path) = args.ffprobe {
            self.media.ffprobe_path = path;
        }
        match args.transcode_timeout_secs {
            Some(secs) if secs >= MIN_TIMEOUT_SECS => self.media.transcode_timeout_secs = secs,
            Some(secs) => warn!(
                "--transcode-timeout-secs {secs} is below minimum ({MIN_TIMEOUT_SECS}), ignoring"
            ),
            None => {}
        }
        if let Some(dir) = args.work_dir {
            self.media.work_dir = Some(dir);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            bail!("{ENV_BOT_TOKEN} environment variable is not set");
        }
        if self.media.transcode_timeout_secs < MIN_TIMEOUT_SECS {
            bail!(
                "transcode_timeout_secs must be at least {MIN_TIMEOUT_SECS}, got {}",
                self.media.transcode_timeout_secs
            );
        }
        Ok(())
    }
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            transcode_timeout_secs: default_timeout_secs(),
            work_dir: None,
        }
    }
}
