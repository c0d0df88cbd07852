//! Grade-1 Braille transcoding for Latin letters.
//!
//! The whole input is lowercased before mapping, so case is not recoverable.
//! Characters outside `a-z` and space are echoed unchanged. This is a one-way
//! transform: a second pass sees the glyphs as "other" characters and leaves
//! them alone, so it never reproduces the original text.

/// Letter → six-dot cell, indexed by `c - 'a'`.
const LETTERS: [char; 26] = [
    '⠁', '⠃', '⠉', '⠙', '⠑', '⠋', '⠛', '⠓', '⠊', '⠚', // a-j
    '⠅', '⠇', '⠍', '⠝', '⠕', '⠏', '⠟', '⠗', '⠎', '⠞', // k-t
    '⠥', '⠧', '⠺', '⠭', '⠽', '⠵', // u-z
];

/// Look up the glyph for a single already-lowercased character.
///
/// Returns `None` for anything outside `a-z` and space.
pub fn braille_glyph(c: char) -> Option<char> {
    match c {
        'a'..='z' => Some(LETTERS[(c as u8 - b'a') as usize]),
        ' ' => Some(' '),
        _ => None,
    }
}

/// Transcode `text` to Braille Unicode glyphs.
///
/// Never fails. Output has one char per char of the lowercased input.
pub fn to_braille(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| braille_glyph(c).unwrap_or(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_word() {
        assert_eq!(to_braille("cat"), "⠉⠁⠞");
    }

    #[test]
    fn hello_world() {
        assert_eq!(to_braille("hello world"), "⠓⠑⠇⠇⠕ ⠺⠕⠗⠇⠙");
    }

    #[test]
    fn uppercase_is_lowered_and_others_pass_through() {
        assert_eq!(to_braille("Cat 9!"), "⠉⠁⠞ 9!");
    }

    #[test]
    fn full_alphabet_is_char_for_char() {
        let alphabet = "abcdefghijklmnopqrstuvwxyz";
        let out = to_braille(alphabet);
        assert_eq!(out.chars().count(), 26);
        assert_eq!(out, "⠁⠃⠉⠙⠑⠋⠛⠓⠊⠚⠅⠇⠍⠝⠕⠏⠟⠗⠎⠞⠥⠧⠺⠭⠽⠵");
    }

    #[test]
    fn empty_input() {
        assert_eq!(to_braille(""), "");
    }

    #[test]
    fn non_latin_is_echoed() {
        assert_eq!(to_braille("é-ü, 42."), "é-ü, 42.");
    }

    #[test]
    fn second_pass_does_not_round_trip() {
        let once = to_braille("read me");
        let twice = to_braille(&once);
        assert_eq!(twice, once);
        assert_ne!(twice, "read me");
    }

    #[test]
    fn glyph_lookup() {
        assert_eq!(braille_glyph('a'), Some('⠁'));
        assert_eq!(braille_glyph('z'), Some('⠵'));
        assert_eq!(braille_glyph(' '), Some(' '));
        assert_eq!(braille_glyph('A'), None);
        assert_eq!(braille_glyph('7'), None);
    }
}
