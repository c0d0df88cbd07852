//! Azure Speech REST client — synthesis to WAV files and short-audio
//! recognition.
//!
//! Synthesized audio is streamed to `<name>.partial` and renamed once the
//! body is complete and looks like a WAV file, so the audio directory only
//! ever holds finished artifacts.

use std::path::Path;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use eduaccess_core::filename::tts_filename;
use eduaccess_core::ssml::build_ssml;
use eduaccess_core::wav::{RECOGNITION_SAMPLE_RATE, WavHeader, parse_wav_header};

use crate::config::{ConfigError, Settings, SpeechCredentials};

const OUTPUT_FORMAT: &str = "riff-24khz-16bit-mono-pcm";
const CLIENT_NAME: &str = "eduaccess";

/// Bytes kept from the start of a synthesis response for header validation.
const HEADER_PROBE_LEN: usize = 256;

/// The short-audio recognition endpoint only accepts about a minute of audio.
const SHORT_AUDIO_LIMIT_MS: u64 = 60_000;

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` into a new file under `audio_dir` and return its
    /// filename (not the full path).
    async fn synthesize(&self, text: &str, audio_dir: &Path) -> Result<String, SpeechError>;
}

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Transcribe 16 kHz mono PCM WAV bytes.
    async fn transcribe(&self, wav: &[u8]) -> Result<String, SpeechError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("speech request failed: {0}")]
    Request(String),
    #[error("speech service returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("speech recognition failed: {0}")]
    Recognition(String),
    #[error("synthesized audio is not a WAV file: {0}")]
    InvalidAudio(&'static str),
    #[error("failed to write audio file: {0}")]
    Io(#[from] std::io::Error),
}

pub struct AzureSpeechClient {
    client: reqwest::Client,
    credentials: Option<SpeechCredentials>,
    voice: String,
    language: String,
    tts_url: Option<String>,
    stt_url: Option<String>,
}

impl AzureSpeechClient {
    pub fn new(settings: &Settings) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials: settings.speech.clone(),
            voice: settings.voice.clone(),
            language: settings.language.clone(),
            tts_url: None,
            stt_url: None,
        }
    }

    /// Point the client at explicit synthesis and recognition URLs instead of
    /// the regional defaults.
    pub fn with_endpoints(mut self, tts_url: impl Into<String>, stt_url: impl Into<String>) -> Self {
        self.tts_url = Some(tts_url.into());
        self.stt_url = Some(stt_url.into());
        self
    }

    fn credentials(&self) -> Result<&SpeechCredentials, ConfigError> {
        self.credentials
            .as_ref()
            .ok_or(ConfigError::Missing("Azure Speech key or region"))
    }

    fn synthesis_url(&self, creds: &SpeechCredentials) -> String {
        self.tts_url.clone().unwrap_or_else(|| {
            format!(
                "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
                creds.region
            )
        })
    }

    fn recognition_url(&self, creds: &SpeechCredentials) -> String {
        self.stt_url.clone().unwrap_or_else(|| {
            format!(
                "https://{}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1",
                creds.region
            )
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for AzureSpeechClient {
    async fn synthesize(&self, text: &str, audio_dir: &Path) -> Result<String, SpeechError> {
        let creds = self.credentials()?;
        let url = self.synthesis_url(creds);
        let ssml = build_ssml(text, &self.voice);

        debug!(chars = text.len(), voice = %self.voice, "requesting speech synthesis");

        let resp = self
            .client
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", &creds.key)
            .header(CONTENT_TYPE, "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", OUTPUT_FORMAT)
            .header(USER_AGENT, CLIENT_NAME)
            .body(ssml)
            .send()
            .await
            .map_err(|e| SpeechError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SpeechError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let filename = tts_filename();
        let dest = audio_dir.join(&filename);
        let partial = audio_dir.join(format!("{filename}.partial"));

        let header = match stream_to_file(resp, &partial).await {
            Ok(header) => header,
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(e);
            }
        };

        if let Err(e) = tokio::fs::rename(&partial, &dest).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }

        info!(
            file = %filename,
            duration_ms = header.duration_ms(),
            "speech synthesis completed"
        );
        Ok(filename)
    }
}

/// Write the response body to `path`, then check that it starts with a WAV
/// header.
async fn stream_to_file(resp: reqwest::Response, path: &Path) -> Result<WavHeader, SpeechError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut head: Vec<u8> = Vec::with_capacity(HEADER_PROBE_LEN);
    let mut stream = resp.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| SpeechError::Request(format!("audio stream error: {e}")))?;
        if head.len() < HEADER_PROBE_LEN {
            let take = (HEADER_PROBE_LEN - head.len()).min(chunk.len());
            head.extend_from_slice(&chunk[..take]);
        }
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    drop(file);

    parse_wav_header(&head).map_err(SpeechError::InvalidAudio)
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RecognitionResponse {
    recognition_status: String,
    #[serde(default)]
    display_text: String,
}

#[async_trait]
impl SpeechRecognizer for AzureSpeechClient {
    async fn transcribe(&self, wav: &[u8]) -> Result<String, SpeechError> {
        let creds = self.credentials()?;
        let url = self.recognition_url(creds);

        if let Ok(header) = parse_wav_header(wav) {
            let duration_ms = header.duration_ms();
            if duration_ms > SHORT_AUDIO_LIMIT_MS {
                warn!(duration_ms, "audio exceeds short-audio limit, transcript may be cut");
            }
        }

        let resp = self
            .client
            .post(&url)
            .query(&[("language", self.language.as_str()), ("format", "simple")])
            .header("Ocp-Apim-Subscription-Key", &creds.key)
            .header(
                CONTENT_TYPE,
                format!("audio/wav; codecs=audio/pcm; samplerate={RECOGNITION_SAMPLE_RATE}"),
            )
            .header(ACCEPT, "application/json")
            .body(wav.to_vec())
            .send()
            .await
            .map_err(|e| SpeechError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SpeechError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let result: RecognitionResponse = resp
            .json()
            .await
            .map_err(|e| SpeechError::Request(format!("invalid recognition response: {e}")))?;

        match result.recognition_status.as_str() {
            "Success" => {
                info!(chars = result.display_text.len(), "speech recognition completed");
                Ok(result.display_text.trim().to_string())
            }
            "NoMatch" | "InitialSilenceTimeout" | "BabbleTimeout" => {
                debug!(status = %result.recognition_status, "no speech recognized");
                Ok(String::new())
            }
            other => Err(SpeechError::Recognition(other.to_string())),
        }
    }
}
