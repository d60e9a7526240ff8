//! feedfilter Core Library
//!
//! This crate decides, for each UI element a media-feed client is about to
//! render, whether the element should be suppressed.
//!
//! # Architecture
//!
//! Every decision is a pure function of an [`ElementDescriptor`] and the
//! current [`Settings`]. Fixed pattern groups are built once when a policy is
//! constructed and only read afterwards, so policies can be shared across
//! rendering threads without locks. The one mutable piece, the keyword index,
//! is published atomically and read lock-free.
//!
//! # Modules
//!
//! - `trie`: Multi-pattern substring / prefix matcher
//! - `group`: Toggleable pattern groups and ordered group lists
//! - `dispatch`: Stage ordering, policy trait and the dispatcher
//! - `policy`: Keyword and Shorts policies
//! - `keywords`: Keyword phrase parsing and case variants
//! - `settings`: Settings collaborator trait and in-memory store
//! - `types`: Shared type definitions

pub mod dispatch;
pub mod group;
pub mod keywords;
pub mod policy;
pub mod settings;
pub mod trie;
pub mod types;

// Re-export commonly used types
pub use dispatch::{FilterDispatcher, FilterMatch, FilterPolicy, FilterStages, MatchedList, Policy};
pub use group::{FilterGroup, FilterGroupList, GroupMatch, MatchMode};
pub use keywords::{parse_keyword_phrases, KeywordSet, PhraseError};
pub use policy::{KeywordPolicy, ShortsPolicy};
pub use settings::{Settings, SettingsStore};
pub use trie::{PatternIndex, PatternMatch};
pub use types::{ElementDescriptor, Field, NavigationState, NavigationTab, Toggles};
