//! ffmpeg / ffprobe subprocess transcoder

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{ConvertError, Result};
use crate::params::TranscodeParams;
use crate::transcoder::{ProbeReport, Transcoder};

/// Default ceiling on a single ffmpeg or ffprobe run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Transcoder backed by the ffmpeg command-line tools.
///
/// Children are awaited asynchronously, so a long conversion never holds up
/// other handlers, and are killed if the wait is abandoned.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    timeout: Duration,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `ffmpeg -version` and report whether it worked.
    pub async fn check_available(&self) -> bool {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.arg("-version");
        match self.run(cmd).await {
            Ok(output) if output.status.success() => {
                let banner = String::from_utf8_lossy(&output.stdout);
                debug!("Found {}", banner.lines().next().unwrap_or("ffmpeg"));
                true
            }
            Ok(output) => {
                warn!("{} -version exited with {}", self.ffmpeg.display(), output.status);
                false
            }
            Err(e) => {
                warn!("ffmpeg is not usable: {}", e);
                false
            }
        }
    }

    /// Full argument list for one conversion.
    pub fn transcode_args(input: &Path, output: &Path, params: &TranscodeParams) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-nostdin".into(),
            "-y".into(),
        ];
        args.extend(params.input_args());
        args.push("-i".into());
        args.push(input.to_string_lossy().into_owned());
        args.extend(params.output_args());
        args.push(output.to_string_lossy().into_owned());
        args
    }

    async fn run(&self, mut cmd: Command) -> Result<Output> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(ConvertError::Spawn)?;

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => Ok(output?),
            Err(_) => Err(ConvertError::TimedOut(self.timeout)),
        }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn probe(&self, input: &Path) -> Result<ProbeReport> {
        let mut cmd = Command::new(&self.ffprobe);
        cmd.args(["-v", "error", "-print_format", "json", "-show_streams", "-show_format"])
            .arg(input);

        let output = self.run(cmd).await?;
        if !output.status.success() {
            return Err(ConvertError::Failed {
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let report = ProbeReport::from_ffprobe_json(&output.stdout)?;
        debug!(
            "Probed {}: {} stream(s), duration {:?}",
            input.display(),
            report.streams.len(),
            report.duration
        );
        Ok(report)
    }

    async fn transcode(&self, input: &Path, output: &Path, params: &TranscodeParams) -> Result<()> {
        let args = Self::transcode_args(input, output, params);
        debug!("Running {} {}", self.ffmpeg.display(), args.join(" "));

        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(&args);

        let result = self.run(cmd).await?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            warn!("ffmpeg exited with {}: {}", result.status, stderr);
            return Err(ConvertError::Failed { stderr });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{VideoNoteParams, VoiceNoteParams};

    #[test]
    fn test_transcode_args_layout() {
        let params = TranscodeParams::VideoNote(VideoNoteParams::for_source(1280, 720, None));
        let args =
            FfmpegTranscoder::transcode_args(Path::new("/in.mov"), Path::new("/out.mp4"), &params);

        assert_eq!(&args[..5], &["-hide_banner", "-loglevel", "error", "-nostdin", "-y"]);

        // The input-side duration cap must come before -i
        let t = args.iter().position(|a| a == "-t").unwrap();
        let i = args.iter().position(|a| a == "-i").unwrap();
        assert!(t < i);
        assert_eq!(args[i + 1], "/in.mov");
        assert_eq!(args.last().unwrap(), "/out.mp4");
    }

    #[test]
    fn test_voice_args_end_with_output() {
        let params = TranscodeParams::VoiceNote(VoiceNoteParams::default());
        let args =
            FfmpegTranscoder::transcode_args(Path::new("a.wav"), Path::new("b.ogg"), &params);
        let i = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[i + 1], "a.wav");
        assert_eq!(args.last().unwrap(), "b.ogg");
    }

    #[tokio::test]
    async fn test_missing_binary_is_a_spawn_error() {
        let transcoder = FfmpegTranscoder::new(
            "/nonexistent/notecast-ffmpeg-12345",
            "/nonexistent/notecast-ffprobe-12345",
        );
        let err = transcoder.probe(Path::new("whatever.mp4")).await.unwrap_err();
        assert!(matches!(err, ConvertError::Spawn(_)));
        assert!(!transcoder.check_available().await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_child_times_out() {
        let transcoder = FfmpegTranscoder::new("sh", "sh").with_timeout(Duration::from_millis(100));
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "sleep 5"]);
        let err = transcoder.run(cmd).await.unwrap_err();
        assert!(matches!(err, ConvertError::TimedOut(d) if d == Duration::from_millis(100)));
    }
}
