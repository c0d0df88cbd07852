//! HTTP API for the EduAccess backend.
//!
//! CORS-permissive so the web frontend can call from any origin. Every
//! failure renders as `{ "error": ... }` through [`ApiError`].

use std::path::Path as FsPath;

use axum::body::{Body, Bytes};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio_util::io::ReaderStream;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use eduaccess_core::braille::to_braille;
use eduaccess_core::filename::is_safe_filename;
use eduaccess_core::types::{
    AnalysisResult, AudioFileResponse, BrailleResponse, ExtractedTextResponse, ImageUrlRequest,
    TextRequest, VideoConversion,
};

use crate::error::ApiError;
use crate::pipeline;
use crate::state::AppState;
use crate::vision::ImageSource;

const LIVENESS: &str = "EduAccess Backend is Running!";

/// Messages for a missing `file` field and for one with an empty filename.
struct UploadMessages {
    missing: &'static str,
    empty: &'static str,
}

const VIDEO_UPLOAD: UploadMessages = UploadMessages {
    missing: "No video file uploaded",
    empty: "No video filename provided",
};

const TEXT_UPLOAD: UploadMessages = UploadMessages {
    missing: "No file uploaded",
    empty: "No file selected",
};

const IMAGE_UPLOAD: UploadMessages = UploadMessages {
    missing: "No image file uploaded",
    empty: "No image file selected",
};

/// Build the axum router with shared [`AppState`].
pub fn router(state: AppState) -> Router {
    let body_limit = state.settings.max_upload_bytes;

    Router::new()
        .route("/", get(index))
        .route("/api/text-to-audio", post(text_to_audio))
        .route("/api/video-to-audio", post(video_to_audio))
        .route("/api/text-to-braille", post(text_to_braille))
        .route("/api/audio/{*filename}", get(download_audio))
        .route("/api/upload-text-file", post(upload_text_file))
        .route("/api/analyze-image", post(analyze_image))
        .route("/api/analyze-image-url", post(analyze_image_url))
        .route(
            "/api/video-to-text-and-braille",
            post(video_to_text_and_braille),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index() -> &'static str {
    LIVENESS
}

// ─── Text routes ───────────────────────────────────────────────────────────

/// Non-empty `text` from a JSON body. Absent, unparseable and empty bodies
/// are all "no text".
fn required_text(body: &[u8]) -> Result<String, ApiError> {
    let req: TextRequest = serde_json::from_slice(body).unwrap_or_default();
    match req.text {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(ApiError::invalid_input("No text provided")),
    }
}

async fn text_to_audio(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AudioFileResponse>, ApiError> {
    let text = required_text(&body)?;
    let audio_file = state.synthesizer.synthesize(&text, state.audio_dir()).await?;
    Ok(Json(AudioFileResponse { audio_file }))
}

async fn text_to_braille(body: Bytes) -> Result<Json<BrailleResponse>, ApiError> {
    let text = required_text(&body)?;
    Ok(Json(BrailleResponse {
        braille: to_braille(&text),
    }))
}

// ─── Audio download ────────────────────────────────────────────────────────

async fn download_audio(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    if !is_safe_filename(&filename) {
        return Err(ApiError::AudioNotFound(filename));
    }

    let path = state.audio_dir().join(&filename);
    stream_audio(&path, &filename, "inline").await
}

fn audio_content_type(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "wav" => "audio/wav",
        Some(ext) if ext == "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

/// Stream a file from disk as an audio response. A missing path, or one that
/// is not a regular file, is [`ApiError::AudioNotFound`].
async fn stream_audio(
    path: &FsPath,
    filename: &str,
    disposition: &str,
) -> Result<Response, ApiError> {
    let file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::AudioNotFound(filename.to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    let meta = file.metadata().await?;
    if !meta.is_file() {
        return Err(ApiError::AudioNotFound(filename.to_string()));
    }

    tracing::debug!(file = %filename, bytes = meta.len(), "streaming audio");

    Ok((
        [
            (CONTENT_TYPE, audio_content_type(filename).to_string()),
            (CONTENT_LENGTH, meta.len().to_string()),
            (
                CONTENT_DISPOSITION,
                format!("{disposition}; filename=\"{filename}\""),
            ),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}

// ─── Upload routes ─────────────────────────────────────────────────────────

struct FileField {
    filename: String,
    data: Bytes,
}

/// Pull the `file` field out of a multipart body.
async fn read_file_field(
    multipart: Result<Multipart, MultipartRejection>,
    messages: &UploadMessages,
) -> Result<FileField, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!(error = %e, "request is not multipart");
        ApiError::invalid_input(messages.missing)
    })?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::invalid_input(format!("Failed to read multipart: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(ApiError::invalid_input(messages.empty));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::invalid_input(format!("Failed to read file: {e}")))?;

        tracing::debug!(filename = %filename, bytes = data.len(), "file received");
        return Ok(FileField { filename, data });
    }

    Err(ApiError::invalid_input(messages.missing))
}

async fn upload_text_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractedTextResponse>, ApiError> {
    let file = read_file_field(multipart, &TEXT_UPLOAD).await?;
    let upload = state.uploads.save(&file.filename, &file.data).await?;
    let text = state.extractor.extract_text(upload.path()).await?;
    Ok(Json(ExtractedTextResponse { text }))
}

async fn analyze_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let file = read_file_field(multipart, &IMAGE_UPLOAD).await?;
    let result = pipeline::process_image(
        state.analyzer.as_ref(),
        state.synthesizer.as_ref(),
        ImageSource::Bytes(file.data.to_vec()),
        state.audio_dir(),
    )
    .await?;
    Ok(Json(result))
}

async fn analyze_image_url(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AnalysisResult>, ApiError> {
    let req: ImageUrlRequest = serde_json::from_slice(&body).unwrap_or_default();
    let url = match req.url {
        Some(url) if !url.is_empty() => url,
        _ => return Err(ApiError::invalid_input("No image url provided")),
    };

    let result = pipeline::process_image(
        state.analyzer.as_ref(),
        state.synthesizer.as_ref(),
        ImageSource::Url(url),
        state.audio_dir(),
    )
    .await?;
    Ok(Json(result))
}

async fn video_to_audio(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let file = read_file_field(multipart, &VIDEO_UPLOAD).await?;
    let upload = state.uploads.save(&file.filename, &file.data).await?;

    let audio_path =
        pipeline::video_to_audio(state.media.as_ref(), upload.path(), state.audio_dir()).await?;
    let filename = audio_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    stream_audio(&audio_path, &filename, "attachment").await
}

async fn video_to_text_and_braille(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VideoConversion>, ApiError> {
    let file = read_file_field(multipart, &VIDEO_UPLOAD).await?;
    let upload = state.uploads.save(&file.filename, &file.data).await?;

    let result = pipeline::video_to_text_and_braille(
        state.media.as_ref(),
        state.recognizer.as_ref(),
        upload.path(),
        state.audio_dir(),
    )
    .await?;
    Ok(Json(result))
}
