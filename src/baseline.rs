//! Naive per-pattern baseline matcher.
//!
//! Scans the normalized text once per pattern with a direct substring
//! search, restarting one character past each match start so that
//! self-overlapping occurrences are reported too. Runtime is O(k·L) per
//! call, which is exactly why it exists: it is the correctness oracle and
//! scaling foil for [`CueAutomaton`](crate::CueAutomaton), whose O(L + M)
//! bound is independent of k. Not part of the detection path.

use rustc_hash::FxHashMap;

use crate::automaton::Match;
use crate::normalize::normalize;
use crate::pattern::CuePattern;
use crate::CueError;

/// One-substring-search-per-pattern matcher, O(k·L) per call.
#[derive(Debug)]
pub struct BaselineMatcher {
    patterns: Vec<CuePattern>,
}

impl BaselineMatcher {
    /// Wrap a finalized pattern list.
    ///
    /// Rejects empty normalized phrases with the same
    /// [`CueError::InvalidPattern`] the automaton builder raises, so the two
    /// matchers accept identical inputs.
    pub fn new(patterns: Vec<CuePattern>) -> Result<Self, CueError> {
        for pattern in &patterns {
            if pattern.normalized_phrase.is_empty() {
                return Err(CueError::InvalidPattern(format!(
                    "pattern {} ({:?}) normalizes to the empty string",
                    pattern.id, pattern.raw_phrase
                )));
            }
        }
        Ok(Self { patterns })
    }

    /// The pattern list this matcher scans for, in input order.
    pub fn patterns(&self) -> &[CuePattern] {
        &self.patterns
    }

    /// Find every occurrence of every pattern, overlaps included.
    ///
    /// Offsets are character positions in the normalized text, matching the
    /// automaton's convention. Results are grouped per pattern rather than
    /// ordered by `end`; compare as unordered `(id, start, end)` sets.
    pub fn find_all(&self, text: &str) -> Vec<Match<'_>> {
        let normalized = normalize(text);

        // str::find reports byte offsets; matches are in chars.
        let mut char_at_byte: FxHashMap<usize, usize> = FxHashMap::default();
        let mut total_chars = 0;
        for (char_idx, (byte_idx, _)) in normalized.char_indices().enumerate() {
            char_at_byte.insert(byte_idx, char_idx);
            total_chars = char_idx + 1;
        }
        char_at_byte.insert(normalized.len(), total_chars);

        let mut results = Vec::new();
        for pattern in &self.patterns {
            let phrase = pattern.normalized_phrase.as_str();
            let phrase_chars = phrase.chars().count();

            let mut from = 0;
            while let Some(offset) = normalized[from..].find(phrase) {
                let byte_start = from + offset;
                let start = char_at_byte[&byte_start];
                results.push(Match {
                    pattern,
                    start,
                    end: start + phrase_chars,
                });

                // Advance one character, not one phrase, so "aa" in "aaa"
                // yields both occurrences.
                let step = normalized[byte_start..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
                from = byte_start + step;
            }
        }
        results
    }
}
