//! Multi-pattern Trie Matcher
//!
//! A byte-oriented trie with failure links. One left-to-right scan of the
//! haystack reports whether any pattern occurs, independent of how many
//! patterns were indexed.
//!
//! Text patterns are indexed as their UTF-8 bytes. UTF-8 is self-synchronizing,
//! so a byte match of a valid UTF-8 pattern inside valid UTF-8 text always lands
//! on character boundaries, and the same index serves both byte and text search.
//!
//! The index is immutable once built. Callers that need a different pattern set
//! build a new index and swap it in.

use std::collections::VecDeque;
use std::mem::size_of;

/// Sentinel for "no pattern ends here".
const NO_PATTERN: u32 = u32::MAX;

/// Node id of the root.
const ROOT: u32 = 0;

// =============================================================================
// Nodes
// =============================================================================

#[derive(Debug, Clone)]
struct Node {
    /// Outgoing goto edges, sorted by byte.
    edges: Vec<(u8, u32)>,
    /// Failure link: longest proper suffix of this node that is also a trie prefix.
    fail: u32,
    /// Lowest pattern id ending exactly at this node.
    terminal: u32,
    /// Lowest pattern id ending at this node or anywhere on its failure chain.
    output: u32,
}

impl Node {
    fn new() -> Self {
        Self {
            edges: Vec::new(),
            fail: ROOT,
            terminal: NO_PATTERN,
            output: NO_PATTERN,
        }
    }

    #[inline]
    fn child(&self, byte: u8) -> Option<u32> {
        // Most nodes have one or two edges, a linear scan beats binary search there.
        if self.edges.len() <= 4 {
            return self
                .edges
                .iter()
                .find(|(b, _)| *b == byte)
                .map(|(_, next)| *next);
        }
        self.edges
            .binary_search_by_key(&byte, |(b, _)| *b)
            .ok()
            .map(|idx| self.edges[idx].1)
    }
}

// =============================================================================
// Match
// =============================================================================

/// A pattern hit reported by [`PatternIndex::find`] and [`PatternIndex::find_anchored`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch {
    /// Index of the pattern in the order it was given to [`PatternIndex::build`].
    pub pattern: usize,
    /// Byte offset where the first occurrence of the pattern starts.
    pub offset: usize,
}

// =============================================================================
// PatternIndex
// =============================================================================

/// Immutable multi-pattern search index.
#[derive(Debug, Clone)]
pub struct PatternIndex {
    nodes: Vec<Node>,
    /// Dense transition table for the root, `ROOT` where there is no edge.
    root_table: Box<[u32; 256]>,
    /// Byte length of each pattern, by pattern id.
    pattern_lens: Vec<u32>,
    /// Number of non-empty patterns that made it into the trie.
    indexed: usize,
}

impl Default for PatternIndex {
    fn default() -> Self {
        Self::empty()
    }
}

impl PatternIndex {
    /// An index with no patterns. It never matches anything.
    pub fn empty() -> Self {
        Self {
            nodes: vec![Node::new()],
            root_table: Box::new([ROOT; 256]),
            pattern_lens: Vec::new(),
            indexed: 0,
        }
    }

    /// Build an index from a finalized pattern set.
    ///
    /// Pattern ids follow iteration order. Empty patterns keep their id but are
    /// never indexed, since they would match every haystack. Duplicate patterns
    /// resolve to the lowest id.
    pub fn build<I, P>(patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let mut index = Self::empty();

        for (id, pattern) in patterns.into_iter().enumerate() {
            let bytes = pattern.as_ref();
            index.pattern_lens.push(bytes.len() as u32);
            if bytes.is_empty() {
                log::debug!("Skipping empty pattern #{id}");
                continue;
            }
            index.insert(bytes, id as u32);
        }

        index.link();
        index
    }

    fn insert(&mut self, pattern: &[u8], id: u32) {
        let mut node = ROOT;
        for &byte in pattern {
            node = match self.nodes[node as usize].child(byte) {
                Some(next) => next,
                None => {
                    let next = self.nodes.len() as u32;
                    self.nodes.push(Node::new());
                    let edges = &mut self.nodes[node as usize].edges;
                    let pos = edges.partition_point(|(b, _)| *b < byte);
                    edges.insert(pos, (byte, next));
                    next
                }
            };
        }

        let terminal = &mut self.nodes[node as usize].terminal;
        if *terminal == NO_PATTERN {
            self.indexed += 1;
        }
        *terminal = (*terminal).min(id);
    }

    /// Compute failure links and outputs breadth-first.
    fn link(&mut self) {
        let mut queue = VecDeque::new();

        let root_edges = self.nodes[ROOT as usize].edges.clone();
        for (byte, child) in root_edges {
            self.root_table[byte as usize] = child;
            let node = &mut self.nodes[child as usize];
            node.fail = ROOT;
            node.output = node.terminal;
            queue.push_back(child);
        }

        while let Some(current) = queue.pop_front() {
            let edges = self.nodes[current as usize].edges.clone();
            for (byte, child) in edges {
                let mut fallback = self.nodes[current as usize].fail;
                let fail = loop {
                    if let Some(next) = self.step_goto(fallback, byte) {
                        break next;
                    }
                    if fallback == ROOT {
                        break ROOT;
                    }
                    fallback = self.nodes[fallback as usize].fail;
                };

                let inherited = self.nodes[fail as usize].output;
                let node = &mut self.nodes[child as usize];
                node.fail = fail;
                node.output = node.terminal.min(inherited);
                queue.push_back(child);
            }
        }
    }

    #[inline]
    fn step_goto(&self, node: u32, byte: u8) -> Option<u32> {
        if node == ROOT {
            let next = self.root_table[byte as usize];
            return (next != ROOT).then_some(next);
        }
        self.nodes[node as usize].child(byte)
    }

    /// Advance the automaton by one byte, following failure links as needed.
    #[inline]
    fn step(&self, mut state: u32, byte: u8) -> u32 {
        loop {
            if let Some(next) = self.step_goto(state, byte) {
                return next;
            }
            if state == ROOT {
                return ROOT;
            }
            state = self.nodes[state as usize].fail;
        }
    }

    /// Does the haystack contain any pattern?
    pub fn matches(&self, haystack: impl AsRef<[u8]>) -> bool {
        if self.indexed == 0 {
            return false;
        }
        let mut state = ROOT;
        for &byte in haystack.as_ref() {
            state = self.step(state, byte);
            if self.nodes[state as usize].output != NO_PATTERN {
                return true;
            }
        }
        false
    }

    /// Does the haystack start with any pattern?
    pub fn matches_anchored(&self, haystack: impl AsRef<[u8]>) -> bool {
        self.find_anchored(haystack).is_some()
    }

    /// Find the lowest-id pattern occurring anywhere in the haystack.
    ///
    /// The reported offset is the start of that pattern's first occurrence.
    /// Scanning stops early once pattern 0 is seen.
    pub fn find(&self, haystack: impl AsRef<[u8]>) -> Option<PatternMatch> {
        if self.indexed == 0 {
            return None;
        }
        let mut best: Option<PatternMatch> = None;
        let mut state = ROOT;

        for (pos, &byte) in haystack.as_ref().iter().enumerate() {
            state = self.step(state, byte);
            let output = self.nodes[state as usize].output;
            if output == NO_PATTERN {
                continue;
            }
            // `output` is the lowest id ending here, so the first time the global
            // minimum shows up is also its earliest occurrence.
            if best.map_or(true, |b| (output as usize) < b.pattern) {
                let len = self.pattern_lens[output as usize] as usize;
                best = Some(PatternMatch {
                    pattern: output as usize,
                    offset: pos + 1 - len,
                });
                if output == 0 {
                    break;
                }
            }
        }

        best
    }

    /// Find the lowest-id pattern that is a prefix of the haystack.
    pub fn find_anchored(&self, haystack: impl AsRef<[u8]>) -> Option<PatternMatch> {
        let mut best = NO_PATTERN;
        let mut state = ROOT;

        for &byte in haystack.as_ref() {
            state = match self.step_goto(state, byte) {
                Some(next) => next,
                None => break,
            };
            best = best.min(self.nodes[state as usize].terminal);
            if best == 0 {
                break;
            }
        }

        (best != NO_PATTERN).then_some(PatternMatch {
            pattern: best as usize,
            offset: 0,
        })
    }

    /// Number of patterns given to [`PatternIndex::build`], including skipped empty ones.
    pub fn pattern_count(&self) -> usize {
        self.pattern_lens.len()
    }

    /// True if no pattern can ever match.
    pub fn is_empty(&self) -> bool {
        self.indexed == 0
    }

    /// Rough heap footprint of the index in bytes.
    pub fn estimated_memory_size(&self) -> usize {
        let edges: usize = self
            .nodes
            .iter()
            .map(|n| n.edges.capacity() * size_of::<(u8, u32)>())
            .sum();
        self.nodes.capacity() * size_of::<Node>()
            + edges
            + size_of::<[u32; 256]>()
            + self.pattern_lens.capacity() * size_of::<u32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_contains(patterns: &[&str], haystack: &str) -> bool {
        patterns
            .iter()
            .any(|p| !p.is_empty() && haystack.contains(p))
    }

    #[test]
    fn test_empty_index_matches_nothing() {
        let index = PatternIndex::build(Vec::<&str>::new());
        assert!(index.is_empty());
        assert!(!index.matches("anything"));
        assert!(!index.matches_anchored("anything"));
        assert_eq!(index.find("anything"), None);
    }

    #[test]
    fn test_empty_haystack_never_matches() {
        let index = PatternIndex::build(["abc", "x"]);
        assert!(!index.matches(""));
        assert!(!index.matches_anchored(""));
        assert_eq!(index.find(b""), None);
    }

    #[test]
    fn test_empty_pattern_is_skipped() {
        let index = PatternIndex::build(["", "abc"]);
        assert_eq!(index.pattern_count(), 2);
        assert!(!index.matches("xyz"));
        assert_eq!(index.find("xxabc"), Some(PatternMatch { pattern: 1, offset: 2 }));
    }

    #[test]
    fn test_substring_match() {
        let index = PatternIndex::build(["shorts_shelf", "inline_shorts"]);
        assert!(index.matches("feed|inline_shorts.eml|"));
        assert!(index.matches("shorts_shelf"));
        assert!(!index.matches("shorts_shel"));
        assert!(!index.matches("inline_short"));
    }

    #[test]
    fn test_failure_links_recover_overlaps() {
        // "abcd" fails at 'x', the suffix "bc" must still lead into "bcx".
        let index = PatternIndex::build(["abcd", "bcx"]);
        assert!(index.matches("zabcx"));
        assert_eq!(index.find("zabcx"), Some(PatternMatch { pattern: 1, offset: 2 }));
    }

    #[test]
    fn test_suffix_output_reported() {
        // "he" is a suffix of "she" and only reachable through the output chain.
        let index = PatternIndex::build(["she", "he"]);
        assert_eq!(index.find("ushe"), Some(PatternMatch { pattern: 0, offset: 1 }));
        let index = PatternIndex::build(["hers", "he"]);
        assert_eq!(index.find("she"), Some(PatternMatch { pattern: 1, offset: 1 }));
    }

    #[test]
    fn test_find_prefers_lowest_pattern_id() {
        let index = PatternIndex::build(["late", "early"]);
        // "early" occurs first in the haystack, but "late" was declared first.
        assert_eq!(
            index.find("early then late"),
            Some(PatternMatch { pattern: 0, offset: 11 })
        );
        assert_eq!(index.find("only early"), Some(PatternMatch { pattern: 1, offset: 5 }));
    }

    #[test]
    fn test_find_reports_first_occurrence() {
        let index = PatternIndex::build(["ab"]);
        assert_eq!(index.find("xxabab"), Some(PatternMatch { pattern: 0, offset: 2 }));
    }

    #[test]
    fn test_duplicate_patterns_resolve_to_lowest_id() {
        let index = PatternIndex::build(["dup", "other", "dup"]);
        assert_eq!(index.find("a dup"), Some(PatternMatch { pattern: 0, offset: 2 }));
    }

    #[test]
    fn test_anchored_is_prefix_only() {
        let index = PatternIndex::build(["home_video", "compact_video.eml"]);
        assert!(index.matches_anchored("home_video_with_context.eml|x"));
        assert!(index.matches_anchored("compact_video.eml"));
        assert!(!index.matches_anchored("x|home_video_with_context.eml"));
        assert!(index.matches("x|home_video_with_context.eml"));
    }

    #[test]
    fn test_anchored_prefers_lowest_id_among_prefixes() {
        let index = PatternIndex::build(["abcdef", "abc"]);
        assert_eq!(
            index.find_anchored("abcdefgh"),
            Some(PatternMatch { pattern: 0, offset: 0 })
        );
        assert_eq!(
            index.find_anchored("abcxyz"),
            Some(PatternMatch { pattern: 1, offset: 0 })
        );
    }

    #[test]
    fn test_case_exact() {
        let index = PatternIndex::build(["Beast"]);
        assert!(index.matches("Mr Beast"));
        assert!(!index.matches("mr beast"));
    }

    #[test]
    fn test_binary_payload() {
        let index = PatternIndex::build([&b"reel_like_button"[..], &[0x00, 0xff, 0x10][..]]);
        let mut payload = vec![0x0a, 0x12, 0x00];
        payload.extend_from_slice(b"reel_like_button");
        payload.push(0x80);
        assert!(index.matches(&payload));
        assert!(index.matches([0x01u8, 0x00, 0xff, 0x10]));
        assert!(!index.matches([0x00u8, 0xff, 0x11]));
    }

    #[test]
    fn test_utf8_text_patterns() {
        let index = PatternIndex::build(["ünïcödé", "日本"]);
        assert!(index.matches("some ünïcödé text"));
        assert!(index.matches("東京は日本の首都"));
        assert!(!index.matches("unicode"));
    }

    #[test]
    fn test_wide_fan_out_nodes() {
        // More than four edges on one node exercises the binary-search path.
        let patterns = ["ka", "kb", "kc", "kd", "ke", "kf", "kz"];
        let index = PatternIndex::build(patterns);
        for p in patterns {
            assert!(index.matches(format!("--{p}--")));
        }
        assert!(!index.matches("kg ky kk"));
    }

    #[test]
    fn test_matches_agrees_with_naive_search() {
        let patterns = ["aab", "ab", "bba", "abab", "baa", "b"];
        let haystacks = [
            "", "a", "aa", "aaa", "ab", "ba", "bab", "aabab", "xyz", "cccab", "abba",
        ];
        for set_len in 1..=patterns.len() {
            let set = &patterns[..set_len];
            let index = PatternIndex::build(set);
            for hay in haystacks {
                assert_eq!(
                    index.matches(hay),
                    naive_contains(set, hay),
                    "patterns {set:?}, haystack {hay:?}"
                );
                assert_eq!(
                    index.matches_anchored(hay),
                    set.iter().any(|p| hay.starts_with(p)),
                    "anchored: patterns {set:?}, haystack {hay:?}"
                );
            }
        }
    }

    #[test]
    fn test_memory_estimate_grows_with_patterns() {
        let small = PatternIndex::build(["abc"]);
        let large = PatternIndex::build(["abc", "defghijkl", "mnopqrstuv", "wxyz0123"]);
        assert!(small.estimated_memory_size() > 0);
        assert!(large.estimated_memory_size() > small.estimated_memory_size());
    }

    #[test]
    fn test_index_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PatternIndex>();
    }
}
