//! Transcript parsing and the turn-eligibility rule.
//!
//! Transcripts are plain UTF-8 text: conversations delimited by
//! `===== Transcript <id> =====` headers, each followed by `SPEAKER: text`
//! lines where SPEAKER is `AGENT` or `PATIENT` (case-insensitive). Lines
//! that fit neither shape, and turns with an unrecognized speaker, are
//! skipped silently; real transcripts carry plenty of non-turn lines.
//!
//! Cue detection fires only on *eligible* turns: agent turns immediately
//! preceded by a patient turn. That policy lives here, in the callers'
//! layer, not in the matcher.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::CueError;

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^={3,}\s*Transcript\s+(.+?)\s*={3,}$").unwrap());
static TURN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Za-z]+):\s*(.*)$").unwrap());

/// Who spoke a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Speaker {
    Agent,
    Patient,
}

impl Speaker {
    /// Case-insensitive parse; anything but AGENT/PATIENT is unrecognized.
    fn parse(s: &str) -> Option<Speaker> {
        if s.eq_ignore_ascii_case("AGENT") {
            Some(Speaker::Agent)
        } else if s.eq_ignore_ascii_case("PATIENT") {
            Some(Speaker::Patient)
        } else {
            None
        }
    }
}

/// One conversational turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

/// An ordered sequence of turns under one transcript header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversation {
    pub id: String,
    pub turns: Vec<Turn>,
}

/// Parse a transcripts file.
///
/// Fails with [`CueError::NotFound`] if the path does not exist; malformed
/// content never fails, it just yields fewer turns.
pub fn parse_transcripts(path: impl AsRef<Path>) -> Result<Vec<Conversation>, CueError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CueError::NotFound(format!(
            "transcripts file not found: {}",
            path.display()
        )));
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(parse_transcript_text(&contents))
}

/// Parse transcript text that is already in memory.
pub fn parse_transcript_text(contents: &str) -> Vec<Conversation> {
    let mut conversations = Vec::new();
    let mut current: Option<Conversation> = None;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = HEADER_RE.captures(line) {
            if let Some(done) = current.take() {
                conversations.push(done);
            }
            current = Some(Conversation {
                id: caps[1].to_string(),
                turns: Vec::new(),
            });
            continue;
        }

        // Turn lines belong to the most recent header; anything before the
        // first header has no conversation to live in and is dropped.
        if let Some(conv) = current.as_mut() {
            if let Some(caps) = TURN_RE.captures(line) {
                if let Some(speaker) = Speaker::parse(&caps[1]) {
                    conv.turns.push(Turn {
                        speaker,
                        text: caps[2].trim().to_string(),
                    });
                }
            }
        }
    }

    if let Some(done) = current {
        conversations.push(done);
    }
    conversations
}

/// Turns eligible for cue detection, as (conversation, turn index) pairs.
///
/// A turn qualifies iff it is agent-spoken and the immediately preceding
/// turn in the same conversation is patient-spoken. Agent openers and
/// back-to-back agent turns never qualify.
pub fn eligible_turns(conversations: &[Conversation]) -> Vec<(&Conversation, usize)> {
    let mut result = Vec::new();
    for conv in conversations {
        for idx in 1..conv.turns.len() {
            if conv.turns[idx].speaker == Speaker::Agent
                && conv.turns[idx - 1].speaker == Speaker::Patient
            {
                result.push((conv, idx));
            }
        }
    }
    result
}
