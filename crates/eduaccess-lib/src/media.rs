//! Audio-track extraction from uploaded videos via an ffmpeg subprocess.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;

use eduaccess_core::filename::video_audio_filename;
use eduaccess_core::wav::RECOGNITION_SAMPLE_RATE;

/// Longest stderr excerpt carried into an error.
const STDERR_EXCERPT_LEN: usize = 2_000;

#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Extract the audio track of `video` into a new WAV file under
    /// `out_dir` and return its path.
    async fn extract_audio(&self, video: &Path, out_dir: &Path) -> Result<PathBuf, MediaError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        source: std::io::Error,
    },
    #[error("audio extraction failed ({status}): {stderr}")]
    Failed { status: String, stderr: String },
    #[error("Audio file was not generated.")]
    NoAudio,
}

/// Runs `ffmpeg` to produce 16 kHz mono 16-bit PCM WAV, the format speech
/// recognition expects.
pub struct FfmpegAudioExtractor {
    binary: PathBuf,
}

impl FfmpegAudioExtractor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn args(video: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".into(),
            "-nostdin".into(),
            "-loglevel".into(),
            "error".into(),
            "-i".into(),
            video.to_string_lossy().into_owned(),
            "-vn".into(),
            "-acodec".into(),
            "pcm_s16le".into(),
            "-ar".into(),
            RECOGNITION_SAMPLE_RATE.to_string(),
            "-ac".into(),
            "1".into(),
            output.to_string_lossy().into_owned(),
        ]
    }
}

#[async_trait]
impl AudioExtractor for FfmpegAudioExtractor {
    async fn extract_audio(&self, video: &Path, out_dir: &Path) -> Result<PathBuf, MediaError> {
        let output = out_dir.join(video_audio_filename());

        tracing::debug!(
            video = %video.display(),
            output = %output.display(),
            "extracting audio track"
        );

        let result = tokio::process::Command::new(&self.binary)
            .args(Self::args(video, &output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| MediaError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        if !result.status.success() {
            let _ = tokio::fs::remove_file(&output).await;
            let stderr = String::from_utf8_lossy(&result.stderr);
            let stderr: String = stderr.trim().chars().take(STDERR_EXCERPT_LEN).collect();
            return Err(MediaError::Failed {
                status: result.status.to_string(),
                stderr,
            });
        }

        if !output.is_file() {
            return Err(MediaError::NoAudio);
        }

        tracing::info!(output = %output.display(), "audio track extracted");
        Ok(output)
    }
}
