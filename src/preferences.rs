//! Theme and language preferences persisted across sessions.
//!
//! Browser `localStorage` is hidden behind [`PreferenceStore`] so the same
//! load/save logic runs against an in-memory fake in tests. Absent or
//! unrecognised stored values fall back to the defaults (light theme,
//! English) instead of failing.

use crate::config::{LANGUAGE_KEY, THEME_KEY};
use crate::error::StoreError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text direction implied by a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ar")]
    Arabic,
}

impl Language {
    /// BCP 47 code, also the persisted value.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Arabic => "ar",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Language::English => Direction::Ltr,
            Language::Arabic => Direction::Rtl,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Language::English => Language::Arabic,
            Language::Arabic => Language::English,
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "en" => Ok(Language::English),
            "ar" => Ok(Language::Arabic),
            other => Err(format!("unknown language '{other}'")),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Key/value storage for scalar preferences.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// `window.localStorage`-backed store.
///
/// Reads return `None` and writes fail with [`StoreError::Unavailable`] when
/// the browser denies storage access.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    pub fn new() -> Self {
        Self
    }

    fn storage(&self) -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

impl PreferenceStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let storage = self.storage().ok_or(StoreError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|e| StoreError::WriteFailed {
                key: key.to_string(),
                reason: format!("{e:?}"),
            })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let storage = self.storage().ok_or(StoreError::Unavailable)?;
        storage
            .remove_item(key)
            .map_err(|e| StoreError::WriteFailed {
                key: key.to_string(),
                reason: format!("{e:?}"),
            })
    }
}

/// In-memory store for tests and non-browser hosts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

/// Read `key` and parse it, falling back to `T::default()` when absent or invalid.
pub fn load_or_default<T>(store: &dyn PreferenceStore, key: &str) -> T
where
    T: FromStr<Err = String> + Default + fmt::Display,
{
    match store.get(key) {
        None => {
            let fallback = T::default();
            debug!("No stored value for '{}', using default '{}'", key, fallback);
            fallback
        }
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            let fallback = T::default();
            warn!("Ignoring stored '{}': {}; using '{}'", key, e, fallback);
            fallback
        }),
    }
}

/// The persisted UI preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preferences {
    pub theme: Theme,
    pub language: Language,
}

impl Preferences {
    pub fn load(store: &dyn PreferenceStore) -> Self {
        Self {
            theme: load_or_default(store, THEME_KEY),
            language: load_or_default(store, LANGUAGE_KEY),
        }
    }

    pub fn save(&self, store: &dyn PreferenceStore) -> Result<(), StoreError> {
        store.set(THEME_KEY, self.theme.as_str())?;
        store.set(LANGUAGE_KEY, self.language.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_nothing_stored() {
        let store = MemoryStore::new();
        let prefs = Preferences::load(&store);
        assert_eq!(prefs.theme, Theme::Light);
        assert_eq!(prefs.language, Language::English);
    }

    #[test]
    fn theme_round_trip() {
        let store = MemoryStore::new();
        let prefs = Preferences {
            theme: Theme::Dark,
            ..Preferences::default()
        };
        prefs.save(&store).unwrap();

        // A fresh load stands in for a page reload.
        let reloaded = Preferences::load(&store);
        assert_eq!(reloaded.theme, Theme::Dark);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("dark"));
    }

    #[test]
    fn language_round_trip() {
        let store = MemoryStore::new();
        let prefs = Preferences {
            language: Language::Arabic,
            ..Preferences::default()
        };
        prefs.save(&store).unwrap();
        assert_eq!(Preferences::load(&store).language, Language::Arabic);
        assert_eq!(store.get(LANGUAGE_KEY).as_deref(), Some("ar"));
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let store = MemoryStore::new();
        store.set(THEME_KEY, "sepia").unwrap();
        store.set(LANGUAGE_KEY, "fr").unwrap();
        assert_eq!(Preferences::load(&store), Preferences::default());
    }

    #[test]
    fn removed_value_reverts_to_default() {
        let store = MemoryStore::new();
        store.set(THEME_KEY, "dark").unwrap();
        store.remove(THEME_KEY).unwrap();
        assert_eq!(Preferences::load(&store).theme, Theme::Light);
    }

    #[test]
    fn toggles_and_direction() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Language::English.toggled(), Language::Arabic);
        assert_eq!(Language::Arabic.direction(), Direction::Rtl);
        assert_eq!(Language::English.direction(), Direction::Ltr);
    }

    #[test]
    fn parse_accepts_surrounding_whitespace() {
        assert_eq!(" dark ".parse::<Theme>(), Ok(Theme::Dark));
        assert!("Dark".parse::<Theme>().is_err());
    }
}
