//! cuescan: multi-pattern repair-cue detection for conversational transcripts
//!
//! Detects occurrences of a catalog of short "repair-cue" phrases (requests
//! to repeat, rephrase, and the like) inside transcript turns. The engine is
//! an Aho–Corasick automaton built once over the normalized cue catalog and
//! then queried per turn in time proportional to turn length plus match
//! count, regardless of how many cues are loaded.
//!
//! ```
//! use cuescan::{compile_patterns, CueAutomaton, RawCue};
//!
//! let cues = vec![
//!     RawCue { category: "ASK_TO_REPEAT".into(), phrase: "say that again".into() },
//!     RawCue { category: "ASK_TO_REPEAT".into(), phrase: "can you repeat".into() },
//! ];
//! let automaton = CueAutomaton::build(compile_patterns(&cues)).unwrap();
//!
//! let matches = automaton.find_all("Sorry — could you say that AGAIN?");
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].pattern.category, "ASK_TO_REPEAT");
//! ```
//!
//! Module map:
//!
//! - [`normalize`]: the canonicalization pipeline both cues and turns pass
//!   through (case folding, accent stripping, whitespace collapsing)
//! - [`pattern`]: cue records and the sectioned cue-file loader
//! - [`automaton`]: the Aho–Corasick builder and matcher
//! - [`baseline`]: the O(k·L) per-pattern oracle used by tests and benches
//! - [`transcript`]: transcript parsing and the agent-after-patient
//!   eligibility rule

use std::fmt;

pub mod automaton;
pub mod baseline;
pub mod normalize;
pub mod pattern;
pub mod transcript;

pub use automaton::{CueAutomaton, Match};
pub use baseline::BaselineMatcher;
pub use normalize::normalize;
pub use pattern::{compile_patterns, expand_to_k, load_raw_cues, CuePattern, RawCue};
pub use transcript::{eligible_turns, parse_transcripts, Conversation, Speaker, Turn};

/// Errors that can occur while loading cues or building matchers
#[derive(Debug)]
pub enum CueError {
    /// A required source file (cues or transcripts) does not exist.
    NotFound(String),
    /// A pattern's normalized phrase is empty at build time.
    InvalidPattern(String),
    /// An underlying read failed after the file was found.
    Io(std::io::Error),
}

impl fmt::Display for CueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CueError::NotFound(msg) => write!(f, "not found: {}", msg),
            CueError::InvalidPattern(msg) => write!(f, "invalid pattern: {}", msg),
            CueError::Io(err) => write!(f, "i/o error: {}", err),
        }
    }
}

impl std::error::Error for CueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CueError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CueError {
    fn from(err: std::io::Error) -> Self {
        CueError::Io(err)
    }
}
