//! Composite operations that chain the service clients.
//!
//! Each operation either returns a complete result or fails as a whole;
//! artifacts created along the way are removed on failure.

use std::path::{Path, PathBuf};

use eduaccess_core::braille::to_braille;
use eduaccess_core::types::{AnalysisResult, VideoConversion};

use crate::error::ApiError;
use crate::media::AudioExtractor;
use crate::speech::{SpeechRecognizer, SpeechSynthesizer};
use crate::vision::{ImageAnalyzer, ImageSource};

/// Describe an image, then render the caption as Braille and speech.
pub async fn process_image(
    analyzer: &dyn ImageAnalyzer,
    synthesizer: &dyn SpeechSynthesizer,
    source: ImageSource,
    audio_dir: &Path,
) -> Result<AnalysisResult, ApiError> {
    let analysis = analyzer.analyze(source).await?;
    let text = analysis.caption().to_string();
    tracing::debug!(caption = %text, tags = ?analysis.tag_names(), "image described");

    let braille = to_braille(&text);
    let audio = synthesizer.synthesize(&text, audio_dir).await?;

    Ok(AnalysisResult {
        text,
        braille,
        audio,
    })
}

/// Extract the audio track of a stored video into `audio_dir`.
pub async fn video_to_audio(
    extractor: &dyn AudioExtractor,
    video: &Path,
    audio_dir: &Path,
) -> Result<PathBuf, ApiError> {
    Ok(extractor.extract_audio(video, audio_dir).await?)
}

/// Extract a video's audio, transcribe it and Braille-encode the transcript.
pub async fn video_to_text_and_braille(
    extractor: &dyn AudioExtractor,
    recognizer: &dyn SpeechRecognizer,
    video: &Path,
    audio_dir: &Path,
) -> Result<VideoConversion, ApiError> {
    let audio_path = extractor.extract_audio(video, audio_dir).await?;

    match transcribe_file(recognizer, &audio_path).await {
        Ok(text) => {
            let audio_file = audio_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(VideoConversion {
                braille: to_braille(&text),
                text,
                audio_file,
            })
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&audio_path).await;
            Err(e)
        }
    }
}

async fn transcribe_file(recognizer: &dyn SpeechRecognizer, path: &Path) -> Result<String, ApiError> {
    let wav = tokio::fs::read(path).await?;
    Ok(recognizer.transcribe(&wav).await?)
}
