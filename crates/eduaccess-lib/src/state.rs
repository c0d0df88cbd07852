use std::path::Path;
use std::sync::Arc;

use crate::config::Settings;
use crate::extract::{DocumentExtractor, TextExtractor};
use crate::media::{AudioExtractor, FfmpegAudioExtractor};
use crate::speech::{AzureSpeechClient, SpeechRecognizer, SpeechSynthesizer};
use crate::upload::UploadStore;
use crate::vision::{AzureVisionClient, ImageAnalyzer};

/// Shared handler state. Components sit behind trait objects so tests can
/// swap in fakes.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub uploads: UploadStore,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub recognizer: Arc<dyn SpeechRecognizer>,
    pub analyzer: Arc<dyn ImageAnalyzer>,
    pub extractor: Arc<dyn TextExtractor>,
    pub media: Arc<dyn AudioExtractor>,
}

impl AppState {
    /// Wire the Azure clients, document extractor and ffmpeg from settings.
    pub fn from_settings(settings: Settings) -> Self {
        let speech = Arc::new(AzureSpeechClient::new(&settings));
        Self {
            uploads: UploadStore::new(&settings.upload_dir),
            synthesizer: speech.clone(),
            recognizer: speech,
            analyzer: Arc::new(AzureVisionClient::new(&settings)),
            extractor: Arc::new(DocumentExtractor::standard()),
            media: Arc::new(FfmpegAudioExtractor::new(&settings.ffmpeg_path)),
            settings: Arc::new(settings),
        }
    }

    pub fn audio_dir(&self) -> &Path {
        &self.settings.audio_dir
    }
}
