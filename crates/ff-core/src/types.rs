//! Core type definitions for feedfilter
//!
//! Toggle flags, the per-element descriptor handed in by the caller, and the
//! navigation state used to scope keyword filtering.

// =============================================================================
// Toggles (user-facing boolean settings)
// =============================================================================

bitflags::bitflags! {
    /// Boolean settings that gate filter groups.
    ///
    /// Each group is tied to at most one flag. Config files refer to flags by
    /// their constant name, see [`Toggles::from_name`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Toggles: u32 {
        /// Keyword filtering of feed videos
        const HIDE_KEYWORD_CONTENT = 1 << 0;
        /// Keyword filtering of comments
        const HIDE_KEYWORD_CONTENT_COMMENT = 1 << 1;
        /// Keyword filtering while on the home feed (and under the player)
        const HIDE_KEYWORD_CONTENT_HOME = 1 << 2;
        /// Keyword filtering of search results
        const HIDE_KEYWORD_CONTENT_SEARCH = 1 << 3;
        /// Keyword filtering of the subscriptions feed
        const HIDE_KEYWORD_CONTENT_SUBSCRIPTIONS = 1 << 4;

        const HIDE_SHORTS_SHELF = 1 << 8;
        const HIDE_SHORTS_PLAYER_THANKS_BUTTON = 1 << 9;
        const HIDE_SHORTS_PLAYER_JOIN_BUTTON = 1 << 10;
        const HIDE_SHORTS_PLAYER_SOUND_METADATA_LABEL = 1 << 11;
        const HIDE_SHORTS_PLAYER_SUBSCRIPTIONS_BUTTON = 1 << 12;
        const HIDE_SHORTS_PLAYER_INFO_PANEL = 1 << 13;
        const HIDE_SHORTS_PLAYER_VIDEO_LINK_LABEL = 1 << 14;
        const HIDE_SHORTS_PLAYER_VIDEO_TITLE = 1 << 15;
        const HIDE_SHORTS_PLAYER_COMMENTS_BUTTON = 1 << 16;
        const HIDE_SHORTS_PLAYER_DISLIKE_BUTTON = 1 << 17;
        const HIDE_SHORTS_PLAYER_LIKE_BUTTON = 1 << 18;
        const HIDE_SHORTS_PLAYER_REMIX_BUTTON = 1 << 19;
        const HIDE_SHORTS_PLAYER_SHARE_BUTTON = 1 << 20;

        /// All Shorts player action buttons
        const SHORTS_ACTION_BUTTONS = Self::HIDE_SHORTS_PLAYER_COMMENTS_BUTTON.bits()
            | Self::HIDE_SHORTS_PLAYER_DISLIKE_BUTTON.bits()
            | Self::HIDE_SHORTS_PLAYER_LIKE_BUTTON.bits()
            | Self::HIDE_SHORTS_PLAYER_REMIX_BUTTON.bits()
            | Self::HIDE_SHORTS_PLAYER_SHARE_BUTTON.bits();
    }
}

impl Toggles {
    /// Parse a single toggle name, case-insensitively.
    pub fn parse_name(name: &str) -> Option<Self> {
        Self::from_name(&name.trim().to_ascii_uppercase())
    }
}

// =============================================================================
// Element Descriptor
// =============================================================================

/// One renderable element, as seen by the filters.
///
/// Borrowed for the duration of a single decision, never retained.
#[derive(Debug, Clone, Copy)]
pub struct ElementDescriptor<'a> {
    /// Structural component path, e.g. `home_video_with_context.eml|...`
    pub path: &'a str,
    /// Component identifier, if the element has one
    pub identifier: Option<&'a str>,
    /// Concatenated conversion-context string
    pub context: &'a str,
    /// Raw serialized element buffer
    pub payload: &'a [u8],
}

impl<'a> ElementDescriptor<'a> {
    /// Descriptor with only a path, for tests and tooling.
    pub fn with_path(path: &'a str) -> Self {
        Self {
            path,
            identifier: None,
            context: "",
            payload: &[],
        }
    }

    /// The identifier, treating an empty string as absent.
    #[inline]
    pub fn identifier(&self) -> Option<&'a str> {
        self.identifier.filter(|id| !id.is_empty())
    }
}

/// Which descriptor field a custom group list is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Path,
    Identifier,
    Context,
    Payload,
}

impl Field {
    /// Bytes of this field for the given element, `None` if absent.
    #[inline]
    pub fn select<'a>(&self, element: &ElementDescriptor<'a>) -> Option<&'a [u8]> {
        match self {
            Field::Path => Some(element.path.as_bytes()),
            Field::Identifier => element.identifier().map(str::as_bytes),
            Field::Context => Some(element.context.as_bytes()),
            Field::Payload => Some(element.payload),
        }
    }
}

// =============================================================================
// Navigation State
// =============================================================================

/// Bottom navigation bar tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationTab {
    Home,
    Shorts,
    Subscriptions,
    Notifications,
    Library,
}

/// Snapshot of the client's screen state, supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationState {
    /// Player is maximized or fullscreen
    pub player_maximized: bool,
    /// Search bar is open (can be active behind any tab)
    pub search_bar_active: bool,
    /// Selected tab, `None` if unknown
    pub selected_tab: Option<NavigationTab>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_parse_name() {
        assert_eq!(
            Toggles::parse_name("hide_shorts_shelf"),
            Some(Toggles::HIDE_SHORTS_SHELF)
        );
        assert_eq!(
            Toggles::parse_name(" HIDE_KEYWORD_CONTENT "),
            Some(Toggles::HIDE_KEYWORD_CONTENT)
        );
        assert_eq!(Toggles::parse_name("not_a_toggle"), None);
    }

    #[test]
    fn test_action_buttons_mask() {
        assert!(Toggles::SHORTS_ACTION_BUTTONS.contains(Toggles::HIDE_SHORTS_PLAYER_LIKE_BUTTON));
        assert!(!Toggles::SHORTS_ACTION_BUTTONS.contains(Toggles::HIDE_SHORTS_SHELF));
    }

    #[test]
    fn test_empty_identifier_is_absent() {
        let mut element = ElementDescriptor::with_path("a.eml");
        assert_eq!(element.identifier(), None);
        element.identifier = Some("");
        assert_eq!(element.identifier(), None);
        assert_eq!(Field::Identifier.select(&element), None);
        element.identifier = Some("shorts_shelf");
        assert_eq!(Field::Identifier.select(&element), Some(&b"shorts_shelf"[..]));
    }

    #[test]
    fn test_field_select() {
        let element = ElementDescriptor {
            path: "p",
            identifier: None,
            context: "ctx",
            payload: b"\x01\x02",
        };
        assert_eq!(Field::Path.select(&element), Some(&b"p"[..]));
        assert_eq!(Field::Context.select(&element), Some(&b"ctx"[..]));
        assert_eq!(Field::Payload.select(&element), Some(&b"\x01\x02"[..]));
    }
}
