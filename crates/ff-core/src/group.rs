//! Filter groups
//!
//! A [`FilterGroup`] is a toggleable bundle of literal patterns with a fixed
//! match mode. A [`FilterGroupList`] evaluates groups in declaration order and
//! reports the first hit.

use crate::settings::Settings;
use crate::trie::PatternIndex;
use crate::types::Toggles;

/// Where a group's patterns must occur in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// Pattern must start at offset 0.
    Anchored,
    /// Pattern may occur anywhere.
    Anywhere,
}

/// A hit within a single group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupMatch<K> {
    /// Key of the matched group
    pub key: K,
    /// Toggle gating the group, `None` if always active
    pub toggle: Option<Toggles>,
    /// Index of the matched pattern within the group
    pub pattern_index: usize,
    /// Byte offset of the match, always 0 for anchored groups
    pub offset: usize,
}

// =============================================================================
// FilterGroup
// =============================================================================

/// Named, toggleable set of literal patterns.
///
/// `K` is a policy-specific key used to identify the group in decision hooks.
#[derive(Debug, Clone)]
pub struct FilterGroup<K> {
    key: K,
    toggle: Option<Toggles>,
    mode: MatchMode,
    index: PatternIndex,
}

impl<K: Copy> FilterGroup<K> {
    pub fn new<P: AsRef<[u8]>>(
        key: K,
        toggle: Option<Toggles>,
        mode: MatchMode,
        patterns: &[P],
    ) -> Self {
        Self {
            key,
            toggle,
            mode,
            index: PatternIndex::build(patterns),
        }
    }

    /// Group whose patterns must start the input.
    pub fn anchored<P: AsRef<[u8]>>(key: K, toggle: Option<Toggles>, patterns: &[P]) -> Self {
        Self::new(key, toggle, MatchMode::Anchored, patterns)
    }

    /// Group whose patterns may occur anywhere in the input.
    pub fn anywhere<P: AsRef<[u8]>>(key: K, toggle: Option<Toggles>, patterns: &[P]) -> Self {
        Self::new(key, toggle, MatchMode::Anywhere, patterns)
    }

    #[inline]
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Is the group's toggle enabled (or absent)?
    #[inline]
    pub fn is_active(&self, settings: &dyn Settings) -> bool {
        self.toggle.map_or(true, |t| settings.is_enabled(t))
    }

    /// Match the input against this group.
    ///
    /// Disabled groups return `None` without running the matcher.
    pub fn check(&self, input: &[u8], settings: &dyn Settings) -> Option<GroupMatch<K>> {
        if !self.is_active(settings) {
            return None;
        }

        let hit = match self.mode {
            MatchMode::Anchored => self.index.find_anchored(input),
            MatchMode::Anywhere => self.index.find(input),
        }?;

        Some(GroupMatch {
            key: self.key,
            toggle: self.toggle,
            pattern_index: hit.pattern,
            offset: hit.offset,
        })
    }
}

// =============================================================================
// FilterGroupList
// =============================================================================

/// Ordered list of groups. Declaration order is match priority.
#[derive(Debug, Clone)]
pub struct FilterGroupList<K> {
    groups: Vec<FilterGroup<K>>,
}

impl<K> Default for FilterGroupList<K> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<K: Copy> FilterGroupList<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, group: FilterGroup<K>) {
        self.groups.push(group);
    }

    /// First matching group in declaration order, with its position in the list.
    pub fn check(&self, input: &[u8], settings: &dyn Settings) -> Option<(GroupMatch<K>, usize)> {
        self.groups
            .iter()
            .enumerate()
            .find_map(|(idx, group)| group.check(input, settings).map(|m| (m, idx)))
    }
}

impl<K: Copy> FromIterator<FilterGroup<K>> for FilterGroupList<K> {
    fn from_iter<I: IntoIterator<Item = FilterGroup<K>>>(iter: I) -> Self {
        Self {
            groups: iter.into_iter().collect(),
        }
    }
}
