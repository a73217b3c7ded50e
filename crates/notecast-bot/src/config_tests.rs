#[cfg(test)]
mod tests {
    use crate::config::{Args, Config, MediaConfig, ReadEnv, DEFAULT_CONFIG_PATH};
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    struct InMemoryEnv(HashMap<&'static str, &'static str>);

    impl InMemoryEnv {
        fn new(pairs: &[(&'static str, &'static str)]) -> Self {
            Self(pairs.iter().cloned().collect())
        }
    }

    impl ReadEnv for InMemoryEnv {
        fn var(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| v.to_string())
        }
    }

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn args(config: &str) -> Args {
        Args {
            config: config.to_string(),
            bot_token: None,
            ffmpeg: None,
            ffprobe: None,
            transcode_timeout_secs: None,
            work_dir: None,
        }
    }

    fn no_file() -> Args {
        args("/nonexistent/notecast-config-12345.toml")
    }

    // ── defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_default_media_config() {
        let media = MediaConfig::default();
        assert_eq!(media.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(media.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(media.transcode_timeout(), Duration::from_secs(300));
        assert_eq!(media.work_dir(), std::env::temp_dir());
    }

    #[test]
    fn test_default_config_path() {
        assert_eq!(DEFAULT_CONFIG_PATH, "config/notecast.toml");
    }

    // ── from_file ─────────────────────────────────────────────────────────────

    #[test]
    fn test_from_file_full() {
        let toml = r#"
[telegram]
bot_token = "FILE-TOKEN"

[media]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
ffprobe_path = "/opt/ffmpeg/bin/ffprobe"
transcode_timeout_secs = 90
work_dir = "/var/tmp/notecast"
"#;
        let f = write_toml(toml);
        let cfg = Config::from_file(f.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.telegram.bot_token, "FILE-TOKEN");
        assert_eq!(cfg.media.ffmpeg_path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(cfg.media.transcode_timeout_secs, 90);
        assert_eq!(cfg.media.work_dir(), PathBuf::from("/var/tmp/notecast"));
    }

    #[test]
    fn test_from_file_partial_uses_defaults() {
        let f = write_toml("[media]\ntranscode_timeout_secs = 45\n");
        let cfg = Config::from_file(f.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.telegram.bot_token, "");
        assert_eq!(cfg.media.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(cfg.media.transcode_timeout_secs, 45);
    }

    #[test]
    fn test_from_file_invalid_toml() {
        let f = write_toml("[media\nffmpeg_path = ");
        let err = Config::from_file(f.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    // ── load ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_missing_token_is_fatal() {
        let env = InMemoryEnv::new(&[]);
        let err = Config::load(no_file(), &env).unwrap_err();
        assert!(err.to_string().contains("BOT_TOKEN"));
    }

    #[test]
    fn test_blank_token_is_fatal() {
        let env = InMemoryEnv::new(&[("BOT_TOKEN", "   ")]);
        assert!(Config::load(no_file(), &env).is_err());
    }

    #[test]
    fn test_load_from_env_only() {
        let env = InMemoryEnv::new(&[
            ("BOT_TOKEN", "123:ABC"),
            ("FFMPEG_PATH", "/usr/local/bin/ffmpeg"),
            ("TRANSCODE_TIMEOUT_SECS", "120"),
            ("NOTECAST_WORK_DIR", "/scratch"),
        ]);
        let cfg = Config::load(no_file(), &env).unwrap();
        assert_eq!(cfg.telegram.bot_token, "123:ABC");
        assert_eq!(cfg.media.ffmpeg_path, PathBuf::from("/usr/local/bin/ffmpeg"));
        assert_eq!(cfg.media.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(cfg.media.transcode_timeout(), Duration::from_secs(120));
        assert_eq!(cfg.media.work_dir(), PathBuf::from("/scratch"));
    }

    #[test]
    fn test_invalid_timeout_keeps_default() {
        let env = InMemoryEnv::new(&[("BOT_TOKEN", "t"), ("TRANSCODE_TIMEOUT_SECS", "soon")]);
        let cfg = Config::load(no_file(), &env).unwrap();
        assert_eq!(cfg.media.transcode_timeout_secs, 300);

        let env = InMemoryEnv::new(&[("BOT_TOKEN", "t"), ("TRANSCODE_TIMEOUT_SECS", "0")]);
        let cfg = Config::load(no_file(), &env).unwrap();
        assert_eq!(cfg.media.transcode_timeout_secs, 300);
    }

    #[test]
    fn test_env_overrides_file_and_args_override_env() {
        let f = write_toml(
            r#"
[telegram]
bot_token = "FILE-TOKEN"

[media]
ffprobe_path = "/file/ffprobe"
transcode_timeout_secs = 30
"#,
        );
        let env = InMemoryEnv::new(&[("BOT_TOKEN", "ENV-TOKEN"), ("TRANSCODE_TIMEOUT_SECS", "60")]);

        let mut cli = args(f.path().to_str().unwrap());
        cli.transcode_timeout_secs = Some(10);

        let cfg = Config::load(cli, &env).unwrap();
        assert_eq!(cfg.telegram.bot_token, "ENV-TOKEN");
        assert_eq!(cfg.media.ffprobe_path, PathBuf::from("/file/ffprobe"));
        assert_eq!(cfg.media.transcode_timeout_secs, 10);
    }

    #[test]
    fn test_cli_token_satisfies_requirement() {
        let env = InMemoryEnv::new(&[]);
        let mut cli = no_file();
        cli.bot_token = Some("CLI-TOKEN".into());
        cli.work_dir = Some(PathBuf::from("/cli/work"));

        let cfg = Config::load(cli, &env).unwrap();
        assert_eq!(cfg.telegram.bot_token, "CLI-TOKEN");
        assert_eq!(cfg.media.work_dir(), PathBuf::from("/cli/work"));
    }
}
