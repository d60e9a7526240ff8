//! Settings collaborator
//!
//! The core only reads settings. Hosts implement [`Settings`] over whatever
//! storage they use; [`SettingsStore`] is an in-memory implementation for the
//! CLI and tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::types::{NavigationState, NavigationTab, Toggles};

/// Read-only view of user settings and client state.
pub trait Settings: Send + Sync {
    /// Is every flag in `toggle` enabled?
    fn is_enabled(&self, toggle: Toggles) -> bool;

    /// Raw newline-separated keyword phrase list.
    ///
    /// The returned `Arc` is compared by identity to detect changes, so
    /// implementations must hand out the same allocation until the value changes.
    fn keyword_phrases(&self) -> Arc<str>;

    /// Current screen state.
    fn navigation(&self) -> NavigationState;

    /// Surface a message to the user.
    fn notify_user(&self, message: &str) {
        log::warn!("{message}");
    }
}

/// Is keyword filtering enabled for the screen the user is looking at?
pub fn keyword_filtering_active(settings: &dyn Settings) -> bool {
    let nav = settings.navigation();

    // The search bar can be open behind the player, so check the player first.
    if nav.player_maximized {
        return settings.is_enabled(Toggles::HIDE_KEYWORD_CONTENT_HOME);
    }

    if nav.search_bar_active {
        return settings.is_enabled(Toggles::HIDE_KEYWORD_CONTENT_SEARCH);
    }

    let hide_home = settings.is_enabled(Toggles::HIDE_KEYWORD_CONTENT_HOME);
    let hide_subscriptions = settings.is_enabled(Toggles::HIDE_KEYWORD_CONTENT_SUBSCRIPTIONS);
    if !hide_home && !hide_subscriptions {
        return false;
    }

    match nav.selected_tab {
        // Unknown tab is treated as home.
        None | Some(NavigationTab::Home) => hide_home,
        Some(NavigationTab::Subscriptions) => hide_subscriptions,
        Some(_) => false,
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// Thread-safe in-memory [`Settings`].
pub struct SettingsStore {
    toggles: AtomicU32,
    phrases: RwLock<Arc<str>>,
    navigation: RwLock<NavigationState>,
    notices: Mutex<Vec<String>>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(Toggles::empty())
    }
}

impl SettingsStore {
    pub fn new(toggles: Toggles) -> Self {
        Self {
            toggles: AtomicU32::new(toggles.bits()),
            phrases: RwLock::new(Arc::from("")),
            navigation: RwLock::new(NavigationState::default()),
            notices: Mutex::new(Vec::new()),
        }
    }

    /// Enable or disable the given flags.
    pub fn set_enabled(&self, toggle: Toggles, enabled: bool) {
        if enabled {
            self.toggles.fetch_or(toggle.bits(), Ordering::Relaxed);
        } else {
            self.toggles.fetch_and(!toggle.bits(), Ordering::Relaxed);
        }
    }

    /// All currently enabled flags.
    pub fn toggles(&self) -> Toggles {
        Toggles::from_bits_truncate(self.toggles.load(Ordering::Relaxed))
    }

    /// Replace the keyword phrase list. Always publishes a new allocation.
    pub fn set_keyword_phrases(&self, phrases: &str) {
        *self.phrases.write() = Arc::from(phrases);
    }

    pub fn set_navigation(&self, navigation: NavigationState) {
        *self.navigation.write() = navigation;
    }

    /// Drain the messages passed to [`Settings::notify_user`].
    pub fn take_notices(&self) -> Vec<String> {
        std::mem::take(&mut *self.notices.lock())
    }
}

impl Settings for SettingsStore {
    fn is_enabled(&self, toggle: Toggles) -> bool {
        self.toggles().contains(toggle)
    }

    fn keyword_phrases(&self) -> Arc<str> {
        Arc::clone(&self.phrases.read())
    }

    fn navigation(&self) -> NavigationState {
        *self.navigation.read()
    }

    fn notify_user(&self, message: &str) {
        log::warn!("{message}");
        self.notices.lock().push(message.to_string());
    }
}
