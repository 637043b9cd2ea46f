//! Text canonicalization for cue matching.
//!
//! Both cue phrases and transcript turns pass through [`normalize`] before
//! they ever meet the automaton, so the normalized form *is* the alphabet the
//! matcher operates over. The pipeline, in order:
//!
//! 1. Unicode canonical composition (NFC)
//! 2. Full Unicode case folding (not a simple lowercase)
//! 3. Punctuation look-alikes mapped to ASCII (curly quotes, long dashes)
//! 4. Accent stripping: NFD, drop combining marks, re-compose
//! 5. Whitespace runs collapsed to a single space, ends trimmed
//!
//! The function is pure and idempotent: `normalize(normalize(x)) == normalize(x)`.

use unicode_casefold::UnicodeCaseFold;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Map curly quotes and long-dash variants to their ASCII equivalents.
///
/// Deliberately small: this is not general punctuation folding, just the
/// glyphs that show up in real transcripts as look-alikes of `'`, `"` and `-`.
fn fold_punctuation(ch: char) -> char {
    match ch {
        '\u{2018}' | '\u{2019}' => '\'',
        '\u{201C}' | '\u{201D}' => '"',
        '\u{2013}' | '\u{2014}' | '\u{2015}' => '-',
        _ => ch,
    }
}

/// Canonicalize text for robust cue matching.
///
/// Case-insensitive, accent-insensitive, whitespace-insensitive. All match
/// offsets reported by the matchers refer to character positions in the
/// string this function returns.
pub fn normalize(text: &str) -> String {
    // NFC, case fold, punctuation look-alikes.
    let folded: String = text.nfc().case_fold_default().map(fold_punctuation).collect();

    // Accent-insensitive: decompose, drop combining marks, re-compose.
    let stripped: String = folded
        .chars()
        .nfd()
        .filter(|&c| !is_combining_mark(c))
        .nfc()
        .collect();

    // Collapse whitespace runs to a single space and trim.
    let mut out = String::with_capacity(stripped.len());
    let mut in_whitespace = true; // true at start so leading whitespace is dropped
    for ch in stripped.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(ch);
            in_whitespace = false;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_folding() {
        assert_eq!(normalize("CAN YOU REPEAT"), normalize("can you repeat"));
        assert_eq!(normalize("Straße"), normalize("STRASSE"));
    }

    #[test]
    fn test_accent_stripping() {
        assert_eq!(normalize("Café"), normalize("cafe"));
        assert_eq!(normalize("café"), "cafe");
        // Decomposed input (e + combining acute) normalizes the same way.
        assert_eq!(normalize("cafe\u{0301}"), "cafe");
        assert_eq!(normalize("¿Qué?"), "¿que?");
    }

    #[test]
    fn test_punctuation_lookalikes() {
        assert_eq!(normalize("don\u{2019}t"), "don't");
        assert_eq!(normalize("\u{201C}again\u{201D}"), "\"again\"");
        assert_eq!(normalize("well \u{2014} again"), "well - again");
        assert_eq!(normalize("well \u{2013} again"), "well - again");
        assert_eq!(normalize("well \u{2015} again"), "well - again");
    }

    #[test]
    fn test_whitespace_collapse() {
        assert_eq!(normalize("  say   that\tagain \n"), "say that again");
        assert_eq!(normalize("\t\n "), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Can You REPEAT that?",
            "  Café \u{2014} s’il vous plaît  ",
            "ß and Æ",
            "\u{201C}quoted\u{201D}\twords",
            "",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_plain_ascii_passthrough() {
        assert_eq!(normalize("say that again"), "say that again");
    }
}
