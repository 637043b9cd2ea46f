//! Aho–Corasick automaton over normalized cue patterns.
//!
//! The automaton is a trie of normalized phrases augmented with failure
//! links, letting a single left-to-right pass over a turn report every
//! occurrence of every pattern in O(L + M) time (L the normalized text
//! length, M the number of matches), independent of the number of patterns.
//!
//! All nodes live in a contiguous arena and reference each other by index,
//! which sidesteps the ownership cycle a pointer-based trie with
//! back-pointing failure links would create, and makes the finished
//! automaton trivially shareable read-only across threads. [`build`] is the
//! only mutating step; after it returns the structure is frozen.
//!
//! [`build`]: CueAutomaton::build

use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::normalize::normalize;
use crate::pattern::CuePattern;
use crate::CueError;

/// Index into the node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
struct NodeId(u32);

impl NodeId {
    const ROOT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the automaton, stored in an arena.
///
/// Children are kept as (char, index) pairs sorted by char, probed by binary
/// search; most nodes have very few children.
#[derive(Debug, Default)]
struct Node {
    children: SmallVec<[(char, NodeId); 4]>,
    /// Longest proper suffix of this node's path that is also a pattern
    /// prefix. Root for depth-1 nodes; root's own link is itself.
    fail: NodeId,
    /// Positions (in build input order) of every pattern whose phrase ends
    /// here, own terminals first, then those inherited via the failure chain.
    outputs: SmallVec<[u32; 2]>,
}

/// A single occurrence of a cue pattern inside a searched turn.
///
/// Offsets are character positions in the *normalized* text, with
/// `end - start` equal to the normalized phrase length in characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match<'a> {
    pub pattern: &'a CuePattern,
    pub start: usize,
    pub end: usize,
}

/// Immutable Aho–Corasick automaton over a fixed cue-pattern list.
///
/// Built once from a finalized pattern list, then read-only: [`find_all`]
/// never mutates, so one instance can serve any number of concurrent
/// searches without synchronization.
///
/// [`find_all`]: CueAutomaton::find_all
#[derive(Debug)]
pub struct CueAutomaton {
    patterns: Vec<CuePattern>,
    /// Normalized phrase length in chars, indexed like `patterns`.
    phrase_lens: Vec<u32>,
    nodes: Vec<Node>,
}

/// Mutable state for trie construction and failure-link computation.
struct Builder {
    nodes: Vec<Node>,
}

impl Builder {
    fn new() -> Self {
        let mut nodes = Vec::with_capacity(64);
        nodes.push(Node::default()); // root at index 0
        Self { nodes }
    }

    fn alloc(&mut self) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::default());
        id
    }

    fn child(&self, parent: NodeId, ch: char) -> Option<NodeId> {
        let children = &self.nodes[parent.index()].children;
        children
            .binary_search_by_key(&ch, |&(c, _)| c)
            .ok()
            .map(|pos| children[pos].1)
    }

    fn get_or_create_child(&mut self, parent: NodeId, ch: char) -> NodeId {
        let children = &self.nodes[parent.index()].children;
        match children.binary_search_by_key(&ch, |&(c, _)| c) {
            Ok(pos) => children[pos].1,
            Err(pos) => {
                let child = self.alloc();
                self.nodes[parent.index()].children.insert(pos, (ch, child));
                child
            }
        }
    }

    /// Walk/create the path for a phrase and record the pattern at its end.
    fn insert(&mut self, phrase: &str, pattern_pos: u32) {
        let mut node = NodeId::ROOT;
        for ch in phrase.chars() {
            node = self.get_or_create_child(node, ch);
        }
        self.nodes[node.index()].outputs.push(pattern_pos);
    }

    /// Assign failure links breadth-first and merge output lists.
    ///
    /// A node's failure target always sits at a strictly smaller depth, so by
    /// the time a node is linked its target's outputs are already complete
    /// and can be appended wholesale. That one-time merge is what keeps the
    /// search loop free of failure-chain walks per character.
    fn link_failures(&mut self) {
        let mut queue: VecDeque<NodeId> = VecDeque::new();

        // Depth-1 nodes fail to root.
        for &(_, child) in &self.nodes[NodeId::ROOT.index()].children {
            queue.push_back(child);
        }

        while let Some(state) = queue.pop_front() {
            let transitions: SmallVec<[(char, NodeId); 4]> =
                self.nodes[state.index()].children.clone();

            for (ch, child) in transitions {
                queue.push_back(child);

                // Follow the parent's failure chain until some node can
                // transition on ch, or we hit root.
                let mut fail_state = self.nodes[state.index()].fail;
                while fail_state != NodeId::ROOT && self.child(fail_state, ch).is_none() {
                    fail_state = self.nodes[fail_state.index()].fail;
                }
                let target = self.child(fail_state, ch).unwrap_or(NodeId::ROOT);
                self.nodes[child.index()].fail = target;

                let inherited = self.nodes[target.index()].outputs.clone();
                self.nodes[child.index()].outputs.extend(inherited);
            }
        }
    }
}

impl CueAutomaton {
    /// Build the automaton from a finalized pattern list.
    ///
    /// Patterns must already carry normalized phrases (the compiler in
    /// [`crate::pattern`] produces them). A pattern whose normalized phrase
    /// is empty is rejected with [`CueError::InvalidPattern`]: the empty
    /// string would match at every offset of every text. An empty pattern
    /// list is legal and yields an automaton that never matches.
    pub fn build(patterns: Vec<CuePattern>) -> Result<Self, CueError> {
        let mut builder = Builder::new();
        let mut phrase_lens = Vec::with_capacity(patterns.len());

        for (pos, pattern) in patterns.iter().enumerate() {
            if pattern.normalized_phrase.is_empty() {
                return Err(CueError::InvalidPattern(format!(
                    "pattern {} ({:?}) normalizes to the empty string",
                    pattern.id, pattern.raw_phrase
                )));
            }
            builder.insert(&pattern.normalized_phrase, pos as u32);
            phrase_lens.push(pattern.normalized_phrase.chars().count() as u32);
        }
        builder.link_failures();

        Ok(Self {
            patterns,
            phrase_lens,
            nodes: builder.nodes,
        })
    }

    /// The pattern list this automaton was built from, in input order.
    pub fn patterns(&self) -> &[CuePattern] {
        &self.patterns
    }

    /// Number of trie nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn child(&self, parent: NodeId, ch: char) -> Option<NodeId> {
        let children = &self.nodes[parent.index()].children;
        children
            .binary_search_by_key(&ch, |&(c, _)| c)
            .ok()
            .map(|pos| children[pos].1)
    }

    /// Find every cue occurrence in `text`, overlaps included.
    ///
    /// The text is normalized internally, so callers pass raw turns. Matches
    /// come out in non-decreasing `end` order; at equal `end`, a node's own
    /// terminal patterns precede those inherited via the failure chain.
    pub fn find_all(&self, text: &str) -> Vec<Match<'_>> {
        let normalized = normalize(text);
        let mut results = Vec::new();

        let mut state = NodeId::ROOT;
        for (idx, ch) in normalized.chars().enumerate() {
            loop {
                if let Some(next) = self.child(state, ch) {
                    state = next;
                    break;
                }
                if state == NodeId::ROOT {
                    break;
                }
                state = self.nodes[state.index()].fail;
            }

            for &pos in &self.nodes[state.index()].outputs {
                let end = idx + 1;
                let start = end - self.phrase_lens[pos as usize] as usize;
                results.push(Match {
                    pattern: &self.patterns[pos as usize],
                    start,
                    end,
                });
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{compile_patterns, RawCue};

    fn patterns_from(phrases: &[&str]) -> Vec<CuePattern> {
        let raw: Vec<RawCue> = phrases
            .iter()
            .map(|p| RawCue {
                category: "TEST".to_string(),
                phrase: p.to_string(),
            })
            .collect();
        compile_patterns(&raw)
    }

    fn triples(matches: &[Match<'_>]) -> Vec<(usize, usize, usize)> {
        matches
            .iter()
            .map(|m| (m.pattern.id, m.start, m.end))
            .collect()
    }

    #[test]
    fn test_single_pattern_boundary_match() {
        let automaton = CueAutomaton::build(patterns_from(&["repeat"])).unwrap();
        let matches = automaton.find_all("please repeat");
        let end = "please repeat".chars().count();
        assert_eq!(triples(&matches), vec![(0, end - 6, end)]);
    }

    #[test]
    fn test_suffix_overlap() {
        // "again" is a suffix of "say again": both end at the same position,
        // the longer (own-terminal) pattern reported first.
        let automaton = CueAutomaton::build(patterns_from(&["say again", "again"])).unwrap();
        let matches = automaton.find_all("say again");
        assert_eq!(triples(&matches), vec![(0, 0, 9), (1, 4, 9)]);
    }

    #[test]
    fn test_self_overlapping_occurrences() {
        let automaton = CueAutomaton::build(patterns_from(&["aa"])).unwrap();
        let matches = automaton.find_all("aaa");
        assert_eq!(triples(&matches), vec![(0, 0, 2), (0, 1, 3)]);
    }

    #[test]
    fn test_multiple_occurrences_ordered_by_end() {
        let automaton = CueAutomaton::build(patterns_from(&["repeat", "say that again"])).unwrap();
        let matches = automaton.find_all("Repeat? I said REPEAT. Say that again.");
        let ends: Vec<usize> = matches.iter().map(|m| m.end).collect();
        let mut sorted = ends.clone();
        sorted.sort_unstable();
        assert_eq!(ends, sorted);
        assert_eq!(matches.len(), 3);
    }

    #[test]
    fn test_query_is_normalized_internally() {
        let automaton = CueAutomaton::build(patterns_from(&["cafe"])).unwrap();
        // Raw turn with case, accents, and ragged whitespace still matches.
        let matches = automaton.find_all("  Un   CAFÉ?  ");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].pattern.id, 0);
    }

    #[test]
    fn test_empty_pattern_set() {
        let automaton = CueAutomaton::build(Vec::new()).unwrap();
        assert_eq!(automaton.node_count(), 1);
        assert!(automaton.find_all("anything at all").is_empty());
    }

    #[test]
    fn test_empty_text() {
        let automaton = CueAutomaton::build(patterns_from(&["repeat"])).unwrap();
        assert!(automaton.find_all("").is_empty());
    }

    #[test]
    fn test_rejects_empty_normalized_phrase() {
        // Whitespace-only phrases normalize to "".
        let err = CueAutomaton::build(patterns_from(&["   "])).unwrap_err();
        assert!(matches!(err, CueError::InvalidPattern(_)));
    }

    #[test]
    fn test_duplicate_phrases_both_reported() {
        let automaton = CueAutomaton::build(patterns_from(&["again", "again"])).unwrap();
        let matches = automaton.find_all("again");
        assert_eq!(triples(&matches), vec![(0, 0, 5), (1, 0, 5)]);
    }

    #[test]
    fn test_shared_prefixes_share_nodes() {
        let automaton =
            CueAutomaton::build(patterns_from(&["repeat", "repeat that", "rephrase"])).unwrap();
        // Root, the 11 chars of "repeat that" ("repeat" is a prefix of it),
        // and the 5-char "hrase" tail of "rephrase" after the shared "rep".
        assert_eq!(automaton.node_count(), 17);
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CueAutomaton>();
    }
}
