//! JSON settings file
//!
//! ```json
//! {
//!   "toggles": ["hide_keyword_content", "hide_keyword_content_home"],
//!   "keyword_phrases": "mr beast\nunboxing",
//!   "navigation": { "player_maximized": false, "search_bar_active": false, "selected_tab": "home" }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use ff_core::{NavigationState, NavigationTab, SettingsStore, Toggles};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid settings file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("Unknown toggle: {0}")]
    UnknownToggle(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabConfig {
    Home,
    Shorts,
    Subscriptions,
    Notifications,
    Library,
}

impl From<TabConfig> for NavigationTab {
    fn from(tab: TabConfig) -> Self {
        match tab {
            TabConfig::Home => NavigationTab::Home,
            TabConfig::Shorts => NavigationTab::Shorts,
            TabConfig::Subscriptions => NavigationTab::Subscriptions,
            TabConfig::Notifications => NavigationTab::Notifications,
            TabConfig::Library => NavigationTab::Library,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub player_maximized: bool,
    pub search_bar_active: bool,
    pub selected_tab: Option<TabConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Enabled toggle names. `"all"` enables everything.
    pub toggles: Vec<String>,
    pub keyword_phrases: String,
    pub navigation: NavigationConfig,
}

impl SettingsConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn toggles(&self) -> Result<Toggles, ConfigError> {
        self.toggles.iter().try_fold(Toggles::empty(), |acc, name| {
            if name.eq_ignore_ascii_case("all") {
                return Ok(acc | Toggles::all());
            }
            Toggles::parse_name(name)
                .map(|t| acc | t)
                .ok_or_else(|| ConfigError::UnknownToggle(name.clone()))
        })
    }

    /// Build an in-memory settings store from this config.
    pub fn into_store(self) -> Result<SettingsStore, ConfigError> {
        let store = SettingsStore::new(self.toggles()?);
        store.set_keyword_phrases(&self.keyword_phrases);
        store.set_navigation(NavigationState {
            player_maximized: self.navigation.player_maximized,
            search_bar_active: self.navigation.search_bar_active,
            selected_tab: self.navigation.selected_tab.map(Into::into),
        });
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_core::Settings;

    #[test]
    fn test_parse_full_config() {
        let config = SettingsConfig::from_json(
            r#"{
                "toggles": ["hide_shorts_shelf", "HIDE_KEYWORD_CONTENT"],
                "keyword_phrases": "mr beast\nunboxing",
                "navigation": { "search_bar_active": true, "selected_tab": "subscriptions" }
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.toggles().unwrap(),
            Toggles::HIDE_SHORTS_SHELF | Toggles::HIDE_KEYWORD_CONTENT
        );

        let store = config.into_store().unwrap();
        assert!(store.is_enabled(Toggles::HIDE_SHORTS_SHELF));
        assert_eq!(&*store.keyword_phrases(), "mr beast\nunboxing");
        let nav = store.navigation();
        assert!(nav.search_bar_active);
        assert!(!nav.player_maximized);
        assert_eq!(nav.selected_tab, Some(NavigationTab::Subscriptions));
    }

    #[test]
    fn test_defaults_when_fields_missing() {
        let config = SettingsConfig::from_json("{}").unwrap();
        assert_eq!(config, SettingsConfig::default());
        assert_eq!(config.toggles().unwrap(), Toggles::empty());
    }

    #[test]
    fn test_all_toggles() {
        let config = SettingsConfig::from_json(r#"{ "toggles": ["all"] }"#).unwrap();
        assert_eq!(config.toggles().unwrap(), Toggles::all());
    }

    #[test]
    fn test_unknown_toggle_is_error() {
        let config = SettingsConfig::from_json(r#"{ "toggles": ["hide_everything"] }"#).unwrap();
        let err = config.toggles().unwrap_err();
        assert_eq!(err.to_string(), "Unknown toggle: hide_everything");
    }

    #[test]
    fn test_bad_tab_is_parse_error() {
        assert!(SettingsConfig::from_json(r#"{ "navigation": { "selected_tab": "nowhere" } }"#).is_err());
    }
}
