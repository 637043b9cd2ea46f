//! Cue pattern records and the cue-file loader.
//!
//! Cue files are a small sectioned format:
//!
//! ```text
//! [ASK_TO_REPEAT]
//! can you repeat
//! say that again
//!
//! [REPHRASE]
//! let me rephrase
//! ```
//!
//! Blank lines are ignored, as are lines before the first `[CATEGORY]`
//! header. Each phrase becomes a [`CuePattern`] with a dense id assigned in
//! file order and a pre-normalized phrase ready for automaton construction.

use std::path::Path;

use crate::normalize::normalize;
use crate::CueError;

/// A `(category, phrase)` pair as read from a cue file, before normalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawCue {
    pub category: String,
    pub phrase: String,
}

/// A compiled repair-cue pattern.
///
/// Immutable once built. Ids are dense `0..n` in source order; matchers hold
/// references into the pattern list they were built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CuePattern {
    pub id: usize,
    pub category: String,
    pub raw_phrase: String,
    pub normalized_phrase: String,
}

/// Load raw cues from a sectioned cue file.
///
/// Fails with [`CueError::NotFound`] if the path does not exist. Malformed
/// lines (phrases before any header) are skipped, not fatal.
pub fn load_raw_cues(path: impl AsRef<Path>) -> Result<Vec<RawCue>, CueError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CueError::NotFound(format!(
            "cue file not found: {}",
            path.display()
        )));
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(parse_raw_cues(&contents))
}

fn parse_raw_cues(contents: &str) -> Vec<RawCue> {
    let mut cues = Vec::new();
    let mut current_category: Option<&str> = None;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            current_category = Some(header.trim());
            continue;
        }
        // Phrases before the first header have no category to belong to.
        if let Some(category) = current_category {
            cues.push(RawCue {
                category: category.to_string(),
                phrase: line.to_string(),
            });
        }
    }

    cues
}

/// Compile raw cues into [`CuePattern`]s with dense ids in input order.
pub fn compile_patterns(raw_cues: &[RawCue]) -> Vec<CuePattern> {
    raw_cues
        .iter()
        .enumerate()
        .map(|(id, cue)| CuePattern {
            id,
            category: cue.category.clone(),
            raw_phrase: cue.phrase.clone(),
            normalized_phrase: normalize(&cue.phrase),
        })
        .collect()
}

/// Pad or truncate a pattern list to exactly `k` entries.
///
/// When fewer than `k` cues exist, synthetic variants are generated by
/// appending polite suffixes to existing phrases. Good enough for scaling
/// benchmarks, where runtime as a function of `k` is what matters, not the
/// semantic distinctness of each cue. Ids are reassigned to stay dense.
pub fn expand_to_k(patterns: &[CuePattern], k: usize) -> Vec<CuePattern> {
    if k == 0 || patterns.is_empty() {
        return Vec::new();
    }

    const SUFFIXES: &[&str] = &[
        " please",
        " please.",
        " again",
        " one more time",
        " por favor",
        " de nuevo",
    ];

    let mut expanded: Vec<CuePattern> = patterns.iter().take(k).cloned().collect();
    let mut round = 0;
    while expanded.len() < k {
        let original = &patterns[round % patterns.len()];
        let suffix = SUFFIXES[(round / patterns.len()) % SUFFIXES.len()];
        let raw = format!("{}{}", original.raw_phrase, suffix);
        expanded.push(CuePattern {
            id: 0, // reassigned below
            category: original.category.clone(),
            raw_phrase: raw.clone(),
            normalized_phrase: normalize(&raw),
        });
        round += 1;
    }

    for (id, p) in expanded.iter_mut().enumerate() {
        p.id = id;
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
ignored preamble line

[ASK_TO_REPEAT]
can you repeat
Say that again

[REPHRASE]
let me rephrase
";

    #[test]
    fn test_parse_sectioned_format() {
        let cues = parse_raw_cues(SAMPLE);
        assert_eq!(cues.len(), 3);
        assert_eq!(cues[0].category, "ASK_TO_REPEAT");
        assert_eq!(cues[0].phrase, "can you repeat");
        assert_eq!(cues[1].phrase, "Say that again");
        assert_eq!(cues[2].category, "REPHRASE");
    }

    #[test]
    fn test_compile_assigns_dense_ids_and_normalizes() {
        let patterns = compile_patterns(&parse_raw_cues(SAMPLE));
        assert_eq!(
            patterns.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(patterns[1].raw_phrase, "Say that again");
        assert_eq!(patterns[1].normalized_phrase, "say that again");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_raw_cues("/nonexistent/cues.txt").unwrap_err();
        assert!(matches!(err, CueError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let cues = load_raw_cues(file.path()).unwrap();
        assert_eq!(cues.len(), 3);
    }

    #[test]
    fn test_expand_to_k_truncates() {
        let patterns = compile_patterns(&parse_raw_cues(SAMPLE));
        let two = expand_to_k(&patterns, 2);
        assert_eq!(two.len(), 2);
        assert_eq!(two[1].raw_phrase, "Say that again");
    }

    #[test]
    fn test_expand_to_k_pads_with_variants() {
        let patterns = compile_patterns(&parse_raw_cues(SAMPLE));
        let ten = expand_to_k(&patterns, 10);
        assert_eq!(ten.len(), 10);
        // Ids stay dense in order.
        assert_eq!(ten.iter().map(|p| p.id).collect::<Vec<_>>(), (0..10).collect::<Vec<_>>());
        // Synthetic variants keep their base category and are normalized.
        assert_eq!(ten[3].category, "ASK_TO_REPEAT");
        assert_eq!(ten[3].normalized_phrase, "can you repeat please");
    }

    #[test]
    fn test_expand_to_k_zero() {
        let patterns = compile_patterns(&parse_raw_cues(SAMPLE));
        assert!(expand_to_k(&patterns, 0).is_empty());
    }
}
