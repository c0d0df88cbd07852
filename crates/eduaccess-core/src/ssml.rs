//! Text preparation for speech synthesis — whitespace cleanup and SSML.
//!
//! Pure functions, no I/O.

use regex::Regex;
use std::sync::LazyLock;

static RE_MULTI_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// Default neural voice used for synthesis.
pub const DEFAULT_VOICE: &str = "en-US-AriaNeural";

/// Default locale for synthesis and recognition.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Collapse whitespace runs and trim, so extracted documents with hard
/// line wraps read as continuous prose.
pub fn normalize_whitespace(text: &str) -> String {
    RE_MULTI_SPACE.replace_all(text, " ").trim().to_string()
}

/// Escape the five XML special characters.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Build a single-voice SSML document for `text`.
///
/// The language tag is taken from the voice name prefix (`en-US-AriaNeural`
/// → `en-US`) and falls back to [`DEFAULT_LANGUAGE`].
pub fn build_ssml(text: &str, voice: &str) -> String {
    let lang = voice_locale(voice).unwrap_or(DEFAULT_LANGUAGE);
    format!(
        "<speak version='1.0' xml:lang='{lang}'><voice xml:lang='{lang}' name='{voice}'>{}</voice></speak>",
        escape_xml(&normalize_whitespace(text)),
        voice = escape_xml(voice),
    )
}

/// `xx-YY` prefix of an Azure voice name.
fn voice_locale(voice: &str) -> Option<&str> {
    let mut parts = voice.splitn(3, '-');
    let lang = parts.next()?;
    let region = parts.next()?;
    parts.next()?;
    let len = lang.len() + 1 + region.len();
    Some(&voice[..len])
}
