//! Filename handling for uploads and generated audio.
//!
//! Pure functions. Randomness comes from UUID v4, rendered as 32 lowercase hex
//! chars, so concurrent requests never pick the same name.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

static RE_UNSAFE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").unwrap());
static RE_TTS_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^tts_output_[0-9a-f]{32}\.wav$").unwrap());

/// Prefix of synthesized speech files.
pub const TTS_PREFIX: &str = "tts_output_";
/// Prefix of audio tracks extracted from uploaded videos.
pub const VIDEO_AUDIO_PREFIX: &str = "video_audio_";

/// Fallback used when sanitizing leaves nothing behind.
const EMPTY_FALLBACK: &str = "upload";

/// Make a client-supplied filename safe to join onto a directory.
///
/// The name is NFKD-decomposed and whatever is still non-ASCII afterwards is
/// dropped (`résumé` keeps its letters as `resume`). Path separators become
/// spaces, whitespace runs collapse to `_`, anything outside
/// `[A-Za-z0-9_.-]` is removed and leading/trailing `.` and `_` are stripped.
pub fn sanitize_filename(name: &str) -> String {
    let ascii: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let stripped = RE_UNSAFE.replace_all(&joined, "");
    let trimmed = stripped.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        EMPTY_FALLBACK.to_string()
    } else {
        trimmed.to_string()
    }
}

/// True when `name` is already in sanitized form, i.e. safe to look up
/// directly under a served directory.
pub fn is_safe_filename(name: &str) -> bool {
    !name.is_empty() && sanitize_filename(name) == name
}

/// 32-char lowercase hex identifier.
pub fn unique_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// `tts_output_<hex>.wav`
pub fn tts_filename() -> String {
    format!("{TTS_PREFIX}{}.wav", unique_id())
}

/// `video_audio_<hex>.wav`
pub fn video_audio_filename() -> String {
    format!("{VIDEO_AUDIO_PREFIX}{}.wav", unique_id())
}

/// Lowercase extension of the last path component of a client filename,
/// reduced to ASCII alphanumerics. `None` for dotfiles and extensionless names.
pub fn client_extension(client_name: &str) -> Option<String> {
    let base = client_name.rsplit(['/', '\\']).next().unwrap_or(client_name);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    let ext: String = ext
        .nfkd()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    (!ext.is_empty()).then_some(ext)
}

/// `<hex>_<sanitized>` — per-request name for a temporary upload.
///
/// The client's extension survives even when sanitizing eats the stem, so
/// `日本語.txt` is stored as `<hex>_txt.txt`.
pub fn upload_filename(client_name: &str) -> String {
    let safe = sanitize_filename(client_name);
    match client_extension(client_name) {
        Some(ext) if !safe.to_ascii_lowercase().ends_with(&format!(".{ext}")) => {
            format!("{}_{safe}.{ext}", unique_id())
        }
        _ => format!("{}_{safe}", unique_id()),
    }
}

/// Whether `name` has the shape produced by [`tts_filename`].
pub fn is_tts_filename(name: &str) -> bool {
    RE_TTS_NAME.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename("..\\..\\boot.ini"), "boot.ini");
    }

    #[test]
    fn sanitize_joins_whitespace() {
        assert_eq!(sanitize_filename("My cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(sanitize_filename("  notes \t final.txt "), "notes_final.txt");
    }

    #[test]
    fn sanitize_folds_accents_and_drops_unsafe() {
        assert_eq!(sanitize_filename("résumé (1).txt"), "resume_1.txt");
        assert_eq!(sanitize_filename("Ｆｕｌｌｗｉｄｔｈ.pdf"), "Fullwidth.pdf");
        assert_eq!(sanitize_filename("a;b|c.md"), "abc.md");
        assert_eq!(sanitize_filename("日本語.txt"), "txt");
    }

    #[test]
    fn sanitize_empty_falls_back() {
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename("../.."), "upload");
        assert_eq!(sanitize_filename("日本語"), "upload");
    }

    #[test]
    fn safe_filename_check() {
        assert!(is_safe_filename("tts_output_abc.wav"));
        assert!(!is_safe_filename("../secret.wav"));
        assert!(!is_safe_filename("sub/dir.wav"));
        assert!(!is_safe_filename(""));
    }

    #[test]
    fn tts_names_match_pattern() {
        let name = tts_filename();
        assert!(is_tts_filename(&name), "{name}");
        assert_eq!(name.len(), TTS_PREFIX.len() + 32 + ".wav".len());
    }

    #[test]
    fn generated_names_are_distinct() {
        let a = tts_filename();
        let b = tts_filename();
        assert_ne!(a, b);

        let u1 = upload_filename("same.txt");
        let u2 = upload_filename("same.txt");
        assert_ne!(u1, u2);
        assert!(u1.ends_with("_same.txt"));
    }

    #[test]
    fn client_extension_from_last_component() {
        assert_eq!(client_extension("日本語.txt").as_deref(), Some("txt"));
        assert_eq!(client_extension("Notes.final.MD").as_deref(), Some("md"));
        assert_eq!(client_extension("dir.v2/README").as_deref(), None);
        assert_eq!(client_extension(".bashrc").as_deref(), None);
        assert_eq!(client_extension("trailing.").as_deref(), None);
    }

    #[test]
    fn upload_name_keeps_extension_of_non_ascii_stem() {
        let name = upload_filename("日本語.txt");
        assert!(name.ends_with("_txt.txt"), "{name}");
        assert!(is_safe_filename(&name));

        let name = upload_filename("lecture.TXT");
        assert!(name.ends_with("_lecture.TXT"), "{name}");
        assert!(!name.ends_with(".txt"));
    }

    #[test]
    fn video_audio_name_shape() {
        let name = video_audio_filename();
        assert!(name.starts_with(VIDEO_AUDIO_PREFIX));
        assert!(name.ends_with(".wav"));
        assert!(is_safe_filename(&name));
    }
}
