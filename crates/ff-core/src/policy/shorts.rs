//! Shorts policy
//!
//! Hides the Shorts shelf and individual Shorts player components. Several
//! components share a path and are told apart only by payload or context
//! contents, see [`ShortsPolicy::confirm`](FilterPolicy::confirm).

use crate::dispatch::{default_decision, FilterMatch, FilterPolicy, FilterStages, MatchedList};
use crate::group::{FilterGroup, FilterGroupList};
use crate::settings::Settings;
use crate::trie::PatternIndex;
use crate::types::{ElementDescriptor, Toggles};

/// Player components outside the channel bar are only filtered under this path.
const REEL_CHANNEL_BAR_PATH: &str = "reel_channel_bar.eml";

/// Present in the feed shelf header context, absent from the channel profile header.
const SHORTS_SHELF_HEADER_CONVERSION_CONTEXT: &str = "horizontalCollectionSwipeProtector=null";

/// Paths that are never filtered by this policy.
const EXCEPTIONS: &[&str] = &["lock_mode_suggested_action"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortsGroup {
    // Identifier groups
    ShelfHeader,
    Shelf,
    ThanksButton,
    // Path groups
    CompactFeedVideo,
    JoinButton,
    SoundMetadata,
    SubscribeButton,
    InfoPanel,
    VideoActionButton,
    VideoLinkLabel,
    VideoTitle,
    // Internal checks
    ReelChannelBar,
}

/// Action buttons that share the `shorts_video_action_button` path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionButton {
    Comment,
    Dislike,
    Like,
    Remix,
    Share,
}

pub struct ShortsPolicy {
    stages: FilterStages<ShortsGroup>,
    exceptions: PatternIndex,
    reel_channel_bar: FilterGroup<ShortsGroup>,
    /// `frame0` thumbnails are only used by Shorts.
    compact_feed_video_buffer: FilterGroup<ShortsGroup>,
    action_buttons: FilterGroupList<ActionButton>,
}

impl Default for ShortsPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortsPolicy {
    pub fn new() -> Self {
        let mut stages = FilterStages::new();

        // Feed shelf header. Separate group since it needs a context check.
        stages.add_identifier_group(FilterGroup::anywhere(
            ShortsGroup::ShelfHeader,
            Some(Toggles::HIDE_SHORTS_SHELF),
            &["shelf_header.eml"],
        ));
        stages.add_identifier_group(FilterGroup::anywhere(
            ShortsGroup::Shelf,
            Some(Toggles::HIDE_SHORTS_SHELF),
            &["shorts_shelf", "inline_shorts", "shorts_grid", "shorts_video_cell"],
        ));
        stages.add_identifier_group(FilterGroup::anywhere(
            ShortsGroup::ThanksButton,
            Some(Toggles::HIDE_SHORTS_PLAYER_THANKS_BUTTON),
            &["suggested_action"],
        ));

        let path_groups = [
            // Shorts in the feed and search on tablet layouts.
            FilterGroup::anywhere(
                ShortsGroup::CompactFeedVideo,
                Some(Toggles::HIDE_SHORTS_SHELF),
                &["compact_video.eml"],
            ),
            FilterGroup::anywhere(
                ShortsGroup::JoinButton,
                Some(Toggles::HIDE_SHORTS_PLAYER_JOIN_BUTTON),
                &["sponsor_button"],
            ),
            FilterGroup::anywhere(
                ShortsGroup::SoundMetadata,
                Some(Toggles::HIDE_SHORTS_PLAYER_SOUND_METADATA_LABEL),
                &["reel_sound_metadata"],
            ),
            FilterGroup::anywhere(
                ShortsGroup::SubscribeButton,
                Some(Toggles::HIDE_SHORTS_PLAYER_SUBSCRIPTIONS_BUTTON),
                &["shorts_paused_state", "subscribe_button"],
            ),
            FilterGroup::anywhere(
                ShortsGroup::InfoPanel,
                Some(Toggles::HIDE_SHORTS_PLAYER_INFO_PANEL),
                &[
                    "reel_multi_format_link",
                    "reel_sound_metadata",
                    "shorts_info_panel_overview",
                ],
            ),
            FilterGroup::anywhere(ShortsGroup::VideoActionButton, None, &["shorts_video_action_button"]),
            FilterGroup::anywhere(
                ShortsGroup::VideoLinkLabel,
                Some(Toggles::HIDE_SHORTS_PLAYER_VIDEO_LINK_LABEL),
                &["reel_multi_format_link"],
            ),
            FilterGroup::anywhere(
                ShortsGroup::VideoTitle,
                Some(Toggles::HIDE_SHORTS_PLAYER_VIDEO_TITLE),
                &["shorts_video_title_item"],
            ),
        ];
        for group in path_groups {
            stages.add_path_group(group);
        }

        let action_buttons = [
            FilterGroup::anywhere(
                ActionButton::Comment,
                Some(Toggles::HIDE_SHORTS_PLAYER_COMMENTS_BUTTON),
                &["reel_comment_button"],
            ),
            FilterGroup::anywhere(
                ActionButton::Dislike,
                Some(Toggles::HIDE_SHORTS_PLAYER_DISLIKE_BUTTON),
                &["reel_dislike_button", "reel_dislike_toggled_button"],
            ),
            FilterGroup::anywhere(
                ActionButton::Like,
                Some(Toggles::HIDE_SHORTS_PLAYER_LIKE_BUTTON),
                &["reel_like_button", "reel_like_toggled_button"],
            ),
            FilterGroup::anywhere(
                ActionButton::Remix,
                Some(Toggles::HIDE_SHORTS_PLAYER_REMIX_BUTTON),
                &["reel_remix_button"],
            ),
            FilterGroup::anywhere(
                ActionButton::Share,
                Some(Toggles::HIDE_SHORTS_PLAYER_SHARE_BUTTON),
                &["reel_share_button"],
            ),
        ]
        .into_iter()
        .collect();

        Self {
            stages,
            exceptions: PatternIndex::build(EXCEPTIONS),
            reel_channel_bar: FilterGroup::anchored(
                ShortsGroup::ReelChannelBar,
                None,
                &[REEL_CHANNEL_BAR_PATH],
            ),
            compact_feed_video_buffer: FilterGroup::anywhere(
                ShortsGroup::CompactFeedVideo,
                Some(Toggles::HIDE_SHORTS_SHELF),
                &["/frame0.jpg"],
            ),
            action_buttons,
        }
    }

    /// Which action button the payload belongs to, if its toggle is enabled.
    pub fn action_button(&self, payload: &[u8], settings: &dyn Settings) -> Option<ActionButton> {
        self.action_buttons
            .check(payload, settings)
            .map(|(m, _)| m.key)
    }
}

impl FilterPolicy for ShortsPolicy {
    type Key = ShortsGroup;

    fn name(&self) -> &'static str {
        "ShortsPolicy"
    }

    fn stages(&self) -> &FilterStages<ShortsGroup> {
        &self.stages
    }

    fn is_exception(&self, element: &ElementDescriptor<'_>) -> bool {
        self.exceptions.matches(element.path)
    }

    fn confirm(
        &self,
        m: &FilterMatch<ShortsGroup>,
        element: &ElementDescriptor<'_>,
        settings: &dyn Settings,
    ) -> bool {
        if m.list.is_path() {
            return match m.group {
                ShortsGroup::InfoPanel => default_decision(m, settings),
                ShortsGroup::CompactFeedVideo => {
                    m.offset == 0
                        && self
                            .compact_feed_video_buffer
                            .check(element.payload, settings)
                            .is_some()
                        && default_decision(m, settings)
                }
                // Every action button has the same path.
                ShortsGroup::VideoActionButton => {
                    self.action_button(element.payload, settings).is_some()
                }
                // Avoid false positives outside the player's channel bar.
                _ => self
                    .reel_channel_bar
                    .check(element.path.as_bytes(), settings)
                    .is_some(),
            };
        }

        if m.list == MatchedList::Identifier && m.group == ShortsGroup::ShelfHeader {
            // The channel profile shelf header looks the same but lacks this context.
            return element.context.contains(SHORTS_SHELF_HEADER_CONVERSION_CONTEXT);
        }

        default_decision(m, settings)
    }
}
