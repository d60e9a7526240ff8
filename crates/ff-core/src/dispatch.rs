//! Filter Dispatch
//!
//! This is the hot path: every rendered element goes through here, on many
//! threads at once. Policies are built once and only read afterwards.
//!
//! # Stage order
//!
//! 1. Identifier groups against the identifier (skipped when absent or empty)
//! 2. Path groups against the path: anchored groups first, then anywhere groups
//! 3. Policy-declared custom lists, each against its own field
//!
//! The first hit is handed to the policy's [`FilterPolicy::confirm`] hook with
//! full match metadata. Later stages never run once an earlier stage matched.

use std::fmt::Debug;
use std::sync::Arc;

use crate::group::{FilterGroup, FilterGroupList, GroupMatch, MatchMode};
use crate::policy::{KeywordPolicy, ShortsPolicy};
use crate::settings::Settings;
use crate::types::{ElementDescriptor, Field, Toggles};

// =============================================================================
// Match Metadata
// =============================================================================

/// Which list of a policy produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchedList {
    Identifier,
    PathAnchored,
    PathAnywhere,
    /// Custom list, by registration order
    Custom(usize),
}

impl MatchedList {
    /// Did the match come from one of the path lists?
    #[inline]
    pub fn is_path(&self) -> bool {
        matches!(self, MatchedList::PathAnchored | MatchedList::PathAnywhere)
    }
}

/// Everything a decision hook needs to know about a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterMatch<K> {
    pub list: MatchedList,
    /// Key of the matched group
    pub group: K,
    /// Position of the group within its list
    pub group_index: usize,
    /// Toggle gating the group
    pub toggle: Option<Toggles>,
    /// Index of the matched pattern within the group
    pub pattern_index: usize,
    /// Byte offset of the match within the matched field
    pub offset: usize,
}

impl<K> FilterMatch<K> {
    fn from_group(list: MatchedList, (m, group_index): (GroupMatch<K>, usize)) -> Self {
        Self {
            list,
            group: m.key,
            group_index,
            toggle: m.toggle,
            pattern_index: m.pattern_index,
            offset: m.offset,
        }
    }
}

/// Base decision: filter if the matched group's toggle is active.
#[inline]
pub fn default_decision<K>(m: &FilterMatch<K>, settings: &dyn Settings) -> bool {
    m.toggle.map_or(true, |t| settings.is_enabled(t))
}

// =============================================================================
// FilterStages
// =============================================================================

/// The group lists of one policy, in dispatch order.
#[derive(Debug, Clone)]
pub struct FilterStages<K> {
    identifier: FilterGroupList<K>,
    path_anchored: FilterGroupList<K>,
    path_anywhere: FilterGroupList<K>,
    custom: Vec<(Field, FilterGroupList<K>)>,
}

impl<K> Default for FilterStages<K> {
    fn default() -> Self {
        Self {
            identifier: FilterGroupList::default(),
            path_anchored: FilterGroupList::default(),
            path_anywhere: FilterGroupList::default(),
            custom: Vec::new(),
        }
    }
}

impl<K: Copy> FilterStages<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_identifier_group(&mut self, group: FilterGroup<K>) {
        self.identifier.push(group);
    }

    /// Add a path group, routed to the anchored or anywhere sub-list by its mode.
    pub fn add_path_group(&mut self, group: FilterGroup<K>) {
        match group.mode() {
            MatchMode::Anchored => self.path_anchored.push(group),
            MatchMode::Anywhere => self.path_anywhere.push(group),
        }
    }

    /// Add a custom list matched against `field`. Returns its [`MatchedList::Custom`] index.
    pub fn add_custom_list(&mut self, field: Field, list: FilterGroupList<K>) -> usize {
        self.custom.push((field, list));
        self.custom.len() - 1
    }

    /// Run every stage in order and return the first hit.
    pub fn evaluate(
        &self,
        element: &ElementDescriptor<'_>,
        settings: &dyn Settings,
    ) -> Option<FilterMatch<K>> {
        if let Some(identifier) = element.identifier() {
            if let Some(hit) = self.identifier.check(identifier.as_bytes(), settings) {
                return Some(FilterMatch::from_group(MatchedList::Identifier, hit));
            }
        }

        let path = element.path.as_bytes();
        if let Some(hit) = self.path_anchored.check(path, settings) {
            return Some(FilterMatch::from_group(MatchedList::PathAnchored, hit));
        }
        if let Some(hit) = self.path_anywhere.check(path, settings) {
            return Some(FilterMatch::from_group(MatchedList::PathAnywhere, hit));
        }

        self.custom.iter().enumerate().find_map(|(idx, (field, list))| {
            let input = field.select(element)?;
            list.check(input, settings)
                .map(|hit| FilterMatch::from_group(MatchedList::Custom(idx), hit))
        })
    }
}

// =============================================================================
// Policies
// =============================================================================

/// A filtering policy: its group lists plus a decision hook.
pub trait FilterPolicy: Send + Sync {
    /// Group key type, compared in [`FilterPolicy::confirm`].
    type Key: Copy + Debug;

    fn name(&self) -> &'static str;

    fn stages(&self) -> &FilterStages<Self::Key>;

    /// Confirm, refine or veto a match.
    fn confirm(
        &self,
        m: &FilterMatch<Self::Key>,
        _element: &ElementDescriptor<'_>,
        settings: &dyn Settings,
    ) -> bool {
        default_decision(m, settings)
    }

    /// Checked before any stage runs. Returning true forces "do not filter".
    fn is_exception(&self, _element: &ElementDescriptor<'_>) -> bool {
        false
    }

    /// Should this element be suppressed?
    fn decide(&self, element: &ElementDescriptor<'_>, settings: &dyn Settings) -> bool {
        if self.is_exception(element) {
            return false;
        }

        let Some(m) = self.stages().evaluate(element, settings) else {
            return false;
        };

        let filtered = self.confirm(&m, element, settings);
        if filtered {
            log::debug!(
                "{} filtered {:?} group {:?} (pattern #{}) path: {}",
                self.name(),
                m.list,
                m.group,
                m.pattern_index,
                element.path
            );
        }
        filtered
    }
}

/// Closed set of policies the dispatcher knows about.
pub enum Policy {
    Keyword(KeywordPolicy),
    Shorts(ShortsPolicy),
}

impl Policy {
    #[inline]
    pub fn decide(&self, element: &ElementDescriptor<'_>, settings: &dyn Settings) -> bool {
        match self {
            Policy::Keyword(p) => p.decide(element, settings),
            Policy::Shorts(p) => p.decide(element, settings),
        }
    }
}

impl From<KeywordPolicy> for Policy {
    fn from(policy: KeywordPolicy) -> Self {
        Policy::Keyword(policy)
    }
}

impl From<ShortsPolicy> for Policy {
    fn from(policy: ShortsPolicy) -> Self {
        Policy::Shorts(policy)
    }
}

// =============================================================================
// FilterDispatcher
// =============================================================================

/// Runs every registered policy against an element.
pub struct FilterDispatcher {
    settings: Arc<dyn Settings>,
    policies: Vec<Policy>,
}

impl FilterDispatcher {
    /// Dispatcher with no policies.
    pub fn new(settings: Arc<dyn Settings>) -> Self {
        Self {
            settings,
            policies: Vec::new(),
        }
    }

    /// Dispatcher with the keyword and Shorts policies registered.
    pub fn with_default_policies(settings: Arc<dyn Settings>) -> Self {
        let mut dispatcher = Self::new(settings);
        dispatcher.register(KeywordPolicy::new());
        dispatcher.register(ShortsPolicy::new());
        dispatcher
    }

    pub fn register(&mut self, policy: impl Into<Policy>) {
        self.policies.push(policy.into());
    }

    /// Should the element be suppressed by any policy?
    pub fn is_filtered(&self, element: &ElementDescriptor<'_>) -> bool {
        let settings = self.settings.as_ref();
        self.policies.iter().any(|p| p.decide(element, settings))
    }

    /// Convenience form of [`FilterDispatcher::is_filtered`].
    pub fn decide(&self, path: &str, identifier: Option<&str>, context: &str, payload: &[u8]) -> bool {
        self.is_filtered(&ElementDescriptor {
            path,
            identifier,
            context,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsStore;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Key {
        Id,
        Start,
        Anywhere,
        Comment,
    }

    fn stages() -> FilterStages<Key> {
        let mut stages = FilterStages::new();
        stages.add_identifier_group(FilterGroup::anywhere(Key::Id, None, &["shelf_header.eml"]));
        // Declared before the anchored group, still evaluated after it.
        stages.add_path_group(FilterGroup::anywhere(Key::Anywhere, None, &["video"]));
        stages.add_path_group(FilterGroup::anchored(Key::Start, None, &["home_video"]));
        let comments: FilterGroupList<Key> =
            std::iter::once(FilterGroup::anywhere(Key::Comment, None, &["comment.eml"])).collect();
        stages.add_custom_list(Field::Context, comments);
        stages
    }

    #[test]
    fn test_identifier_stage_runs_first() {
        let settings = SettingsStore::default();
        let element = ElementDescriptor {
            path: "home_video.eml",
            identifier: Some("shelf_header.eml"),
            context: "",
            payload: &[],
        };
        let m = stages().evaluate(&element, &settings).unwrap();
        assert_eq!(m.list, MatchedList::Identifier);
        assert_eq!(m.group, Key::Id);
    }

    #[test]
    fn test_anchored_path_before_anywhere() {
        let settings = SettingsStore::default();
        let m = stages()
            .evaluate(&ElementDescriptor::with_path("home_video.eml"), &settings)
            .unwrap();
        assert_eq!(m.list, MatchedList::PathAnchored);
        assert_eq!(m.group, Key::Start);
        assert_eq!(m.offset, 0);

        let m = stages()
            .evaluate(&ElementDescriptor::with_path("x|home_video.eml"), &settings)
            .unwrap();
        assert_eq!(m.list, MatchedList::PathAnywhere);
        assert_eq!(m.group, Key::Anywhere);
        assert_eq!(m.offset, 7);
    }

    #[test]
    fn test_custom_list_uses_its_field() {
        let settings = SettingsStore::default();
        let mut element = ElementDescriptor::with_path("comment.eml");
        // Path contains the pattern, but the custom list reads the context.
        assert!(stages().evaluate(&element, &settings).is_none());

        element.context = "a|comment.eml";
        let m = stages().evaluate(&element, &settings).unwrap();
        assert_eq!(m.list, MatchedList::Custom(0));
        assert_eq!(m.group, Key::Comment);
    }

    #[test]
    fn test_empty_identifier_skips_identifier_stage() {
        let settings = SettingsStore::default();
        let element = ElementDescriptor {
            path: "nothing",
            identifier: Some(""),
            context: "",
            payload: &[],
        };
        assert!(stages().evaluate(&element, &settings).is_none());
    }

    #[test]
    fn test_default_decision_follows_toggle() {
        let settings = SettingsStore::default();
        let mut m = FilterMatch {
            list: MatchedList::PathAnywhere,
            group: Key::Anywhere,
            group_index: 0,
            toggle: None,
            pattern_index: 0,
            offset: 0,
        };
        assert!(default_decision(&m, &settings));
        m.toggle = Some(Toggles::HIDE_SHORTS_SHELF);
        assert!(!default_decision(&m, &settings));
        settings.set_enabled(Toggles::HIDE_SHORTS_SHELF, true);
        assert!(default_decision(&m, &settings));
    }

    fn default_dispatcher(toggles: Toggles, phrases: &str) -> (FilterDispatcher, Arc<SettingsStore>) {
        let store = Arc::new(SettingsStore::new(toggles));
        store.set_keyword_phrases(phrases);
        (FilterDispatcher::with_default_policies(store.clone()), store)
    }

    #[test]
    fn test_home_video_with_keyword_is_filtered() {
        let (dispatcher, _store) = default_dispatcher(
            Toggles::HIDE_KEYWORD_CONTENT | Toggles::HIDE_KEYWORD_CONTENT_HOME,
            "mr beast",
        );
        let path = "home_video_with_context.eml|c4|thumbnail.eml";
        assert!(dispatcher.decide(path, None, "", b"\x12\x08MR BEAST\x00"));
        assert!(!dispatcher.decide(path, None, "", b"\x12\x08weekly vlog\x00"));
    }

    #[test]
    fn test_shorts_like_button_follows_toggle() {
        const PATH: &str = "reel_channel_bar.eml|c1|shorts_video_action_button.eml|button.eml";
        let payload = b"\x08\x01\x12\x10reel_like_button\x1a\x00";

        let (dispatcher, store) = default_dispatcher(Toggles::HIDE_SHORTS_PLAYER_LIKE_BUTTON, "");
        assert!(dispatcher.decide(PATH, None, "", payload));

        store.set_enabled(Toggles::HIDE_SHORTS_PLAYER_LIKE_BUTTON, false);
        assert!(!dispatcher.decide(PATH, None, "", payload));

        let (dispatcher, _store) =
            default_dispatcher(Toggles::all() - Toggles::SHORTS_ACTION_BUTTONS, "");
        assert!(!dispatcher.decide(PATH, None, "", payload));
    }

    #[test]
    fn test_shorts_exception_does_not_shield_keyword_policy() {
        let (dispatcher, store) = default_dispatcher(Toggles::all(), "cats");
        let path = "home_video_with_context.eml|lock_mode_suggested_action.eml";
        let element = ElementDescriptor {
            path,
            identifier: Some("suggested_action"),
            context: "",
            payload: b"cats",
        };

        assert!(!ShortsPolicy::new().decide(&element, store.as_ref()));
        assert!(dispatcher.is_filtered(&element));

        store.set_keyword_phrases("dogs");
        assert!(!dispatcher.is_filtered(&element));
    }

    #[test]
    fn test_dispatcher_without_policies_never_filters() {
        let dispatcher = FilterDispatcher::new(Arc::new(SettingsStore::default()));
        assert!(!dispatcher.decide("home_video_with_context.eml", None, "", b"anything"));
    }
}
