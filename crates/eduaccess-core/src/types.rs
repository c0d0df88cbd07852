//! Shared types for the EduAccess backend.
//!
//! Request and response bodies of the HTTP API plus the subset of the Azure
//! image-analysis response the service reads. Keeping them here lets clients
//! depend on the wire types without pulling in tokio or axum.

use serde::{Deserialize, Serialize};

/// Caption used when image analysis returns no description.
pub const NO_DESCRIPTION: &str = "No description available";

// ─── Request bodies ────────────────────────────────────────────────────────

/// `{ "text": ... }` body of the text endpoints. Missing and empty are both
/// rejected by the handler, so the field is optional here.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TextRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// `{ "url": ... }` body of the image-URL endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImageUrlRequest {
    #[serde(default)]
    pub url: Option<String>,
}

// ─── Response bodies ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFileResponse {
    pub audio_file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrailleResponse {
    pub braille: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedTextResponse {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Image description rendered three ways.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub text: String,
    pub braille: String,
    /// Filename of the spoken description under the audio directory.
    pub audio: String,
}

/// Result of converting an uploaded video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoConversion {
    /// Transcript of the video's audio track.
    pub text: String,
    pub braille: String,
    /// Filename of the extracted audio track under the audio directory.
    pub audio_file: String,
}

// ─── Image analysis model ──────────────────────────────────────────────────

/// Subset of the Azure Computer Vision `analyze` response.
///
/// Every field defaults so partial or unexpected payloads still parse.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VisionAnalysis {
    #[serde(default)]
    pub description: ImageDescription,
    #[serde(default)]
    pub tags: Vec<ImageTag>,
    #[serde(default, rename = "requestId")]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImageDescription {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub captions: Vec<Caption>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Caption {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub confidence: f32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageTag {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub confidence: f32,
}

impl VisionAnalysis {
    /// First caption, or [`NO_DESCRIPTION`] when there is none.
    pub fn caption(&self) -> &str {
        self.description
            .captions
            .first()
            .map(|c| c.text.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or(NO_DESCRIPTION)
    }

    /// Tag names, preferring the scored `tags` list over description tags.
    pub fn tag_names(&self) -> Vec<&str> {
        if self.tags.is_empty() {
            self.description.tags.iter().map(String::as_str).collect()
        } else {
            self.tags.iter().map(|t| t.name.as_str()).collect()
        }
    }
}
