//! Process configuration, loaded once at startup.
//!
//! Credentials are optional at load time: a missing key only fails the
//! feature that needs it, on first use, with [`ConfigError::Missing`].

use std::path::PathBuf;

use eduaccess_core::ssml::{DEFAULT_LANGUAGE, DEFAULT_VOICE};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_AUDIO_DIR: &str = "static/audio";
const DEFAULT_FFMPEG: &str = "ffmpeg";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not found in environment variables")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Azure Speech subscription.
#[derive(Debug, Clone)]
pub struct SpeechCredentials {
    pub key: String,
    pub region: String,
}

/// Azure Computer Vision subscription.
#[derive(Debug, Clone)]
pub struct VisionCredentials {
    pub key: String,
    pub endpoint: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub audio_dir: PathBuf,
    pub ffmpeg_path: PathBuf,
    pub max_upload_bytes: usize,
    pub speech: Option<SpeechCredentials>,
    pub voice: String,
    pub language: String,
    pub vision: Option<VisionCredentials>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            upload_dir: DEFAULT_UPLOAD_DIR.into(),
            audio_dir: DEFAULT_AUDIO_DIR.into(),
            ffmpeg_path: DEFAULT_FFMPEG.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            speech: None,
            voice: DEFAULT_VOICE.into(),
            language: DEFAULT_LANGUAGE.into(),
            vision: None,
        }
    }
}

impl Settings {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup. Empty values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: v,
            })?,
            None => defaults.port,
        };

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "MAX_UPLOAD_BYTES",
                value: v,
            })?,
            None => defaults.max_upload_bytes,
        };

        let speech = match (get("AZURE_SPEECH_KEY"), get("AZURE_SPEECH_REGION")) {
            (Some(key), Some(region)) => Some(SpeechCredentials { key, region }),
            _ => None,
        };

        let vision = match (get("AZURE_IMAGE_API_KEY"), get("AZURE_IMAGE_ENDPOINT")) {
            (Some(key), Some(endpoint)) => Some(VisionCredentials {
                key,
                endpoint: endpoint.trim_end_matches('/').to_string(),
            }),
            _ => None,
        };

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            upload_dir: get("UPLOAD_DIR").map(PathBuf::from).unwrap_or(defaults.upload_dir),
            audio_dir: get("AUDIO_DIR").map(PathBuf::from).unwrap_or(defaults.audio_dir),
            ffmpeg_path: get("FFMPEG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.ffmpeg_path),
            max_upload_bytes,
            speech,
            voice: get("AZURE_SPEECH_VOICE").unwrap_or(defaults.voice),
            language: get("AZURE_SPEECH_LANGUAGE").unwrap_or(defaults.language),
            vision,
        })
    }

    /// Create the upload and audio directories.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.upload_dir)?;
        std::fs::create_dir_all(&self.audio_dir)
    }
}
