//! Keyword content policy
//!
//! Hides feed and search results whose payload contains a user-configured
//! keyword phrase. The phrase index is rebuilt whenever the configured phrase
//! list changes identity, without blocking concurrent matches.
//!
//! Known limitations:
//! - Searching for a keyword gives no results, since every result buffer
//!   contains the search text.
//! - Shorts from a filtered channel can still show, the common Shorts layouts
//!   do not carry the channel name.
//! - Keywords are case-sensitive. Only the common casings from
//!   [`case_variants`](crate::keywords::case_variants) are covered.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;

use crate::dispatch::{default_decision, FilterMatch, FilterPolicy, FilterStages};
use crate::group::{FilterGroup, FilterGroupList};
use crate::keywords::parse_keyword_phrases;
use crate::settings::{keyword_filtering_active, Settings};
use crate::trie::PatternIndex;
use crate::types::{ElementDescriptor, Field, Toggles};

/// Paths that always start with one of these components.
const STARTS_WITH_PATHS: &[&str] = &[
    "home_video_with_context.eml",
    "search_video_with_context.eml",
    // Subscription tab videos.
    "video_with_context.eml",
    "related_video_with_context.eml",
    "compact_video.eml",
    "inline_shorts",
    "shorts_video_cell",
    "shorts_pivot_item.eml",
];

/// Components that never start the path.
const CONTAINS_PATHS: &[&str] = &[
    // Tablet layout shelf header.
    "modern_type_shelf_header_content.eml",
    // Part of 'shorts_shelf_carousel.eml'.
    "shorts_lockup_cell.eml",
    // Shorts in a horizontal shelf.
    "video_card.eml",
];

const COMMENT_PATHS: &[&str] = &["comment.eml"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordGroup {
    StartsWith,
    Contains,
    Comment,
}

/// A published keyword index and the exact phrase list it was built from.
#[derive(Debug)]
pub struct KeywordSearch {
    source: Arc<str>,
    index: PatternIndex,
    keywords: Vec<String>,
}

impl KeywordSearch {
    /// Phrase list this index was built from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn index(&self) -> &PatternIndex {
        &self.index
    }

    /// Keyword variants in the index.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

pub struct KeywordPolicy {
    stages: FilterStages<KeywordGroup>,
    search: ArcSwapOption<KeywordSearch>,
    rebuild_lock: Mutex<()>,
    rebuilds: AtomicUsize,
}

impl Default for KeywordPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordPolicy {
    pub fn new() -> Self {
        let mut stages = FilterStages::new();
        stages.add_path_group(FilterGroup::anchored(
            KeywordGroup::StartsWith,
            Some(Toggles::HIDE_KEYWORD_CONTENT),
            STARTS_WITH_PATHS,
        ));
        stages.add_path_group(FilterGroup::anywhere(
            KeywordGroup::Contains,
            Some(Toggles::HIDE_KEYWORD_CONTENT),
            CONTAINS_PATHS,
        ));
        let comments: FilterGroupList<KeywordGroup> = std::iter::once(FilterGroup::anywhere(
            KeywordGroup::Comment,
            Some(Toggles::HIDE_KEYWORD_CONTENT_COMMENT),
            COMMENT_PATHS,
        ))
        .collect();
        stages.add_custom_list(Field::Path, comments);

        Self {
            stages,
            search: ArcSwapOption::empty(),
            rebuild_lock: Mutex::new(()),
            rebuilds: AtomicUsize::new(0),
        }
    }

    /// How many times the keyword index has been built.
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds.load(Ordering::Acquire)
    }

    /// Last published index, if any.
    pub fn published(&self) -> Option<Arc<KeywordSearch>> {
        self.search.load_full()
    }

    /// Index for the current phrase list, rebuilding it if the list changed.
    pub fn current_search(&self, settings: &dyn Settings) -> Arc<KeywordSearch> {
        let phrases = settings.keyword_phrases();
        if let Some(search) = self.search.load_full() {
            if Arc::ptr_eq(&search.source, &phrases) {
                return search;
            }
        }
        self.rebuild(settings)
    }

    fn rebuild(&self, settings: &dyn Settings) -> Arc<KeywordSearch> {
        let _guard = self.rebuild_lock.lock();

        // The list may have changed again while we waited, and another thread
        // may already have built it.
        let phrases = settings.keyword_phrases();
        if let Some(search) = self.search.load_full() {
            if Arc::ptr_eq(&search.source, &phrases) {
                log::debug!("Using previously initialized search");
                return search;
            }
        }

        let parsed = parse_keyword_phrases(&phrases);
        for rejected in &parsed.rejected {
            settings.notify_user(&rejected.to_string());
        }

        let index = PatternIndex::build(&parsed.keywords);
        log::debug!(
            "Search using: ({} KB) keywords: {:?}",
            index.estimated_memory_size() / 1024,
            parsed.keywords
        );

        let search = Arc::new(KeywordSearch {
            source: phrases,
            index,
            keywords: parsed.keywords,
        });
        self.search.store(Some(Arc::clone(&search)));
        self.rebuilds.fetch_add(1, Ordering::AcqRel);
        search
    }
}

impl FilterPolicy for KeywordPolicy {
    type Key = KeywordGroup;

    fn name(&self) -> &'static str {
        "KeywordPolicy"
    }

    fn stages(&self) -> &FilterStages<KeywordGroup> {
        &self.stages
    }

    fn confirm(
        &self,
        m: &FilterMatch<KeywordGroup>,
        element: &ElementDescriptor<'_>,
        settings: &dyn Settings,
    ) -> bool {
        if m.group == KeywordGroup::StartsWith && m.offset != 0 {
            return false;
        }

        if !keyword_filtering_active(settings) {
            return false;
        }

        if !self.current_search(settings).index.matches(element.payload) {
            return false;
        }

        default_decision(m, settings)
    }
}
