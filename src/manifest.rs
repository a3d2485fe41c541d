//! Web app manifest model and installability checks.

use crate::config::{BRAND_COLOR, PRECACHE_ASSETS};
use crate::error::ManifestError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HEX_COLOR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap());

/// Icon sizes a browser needs before it offers installation.
pub const REQUIRED_ICON_SIZES: [&str; 2] = ["192x192", "512x512"];
pub const ICON_MIME_TYPE: &str = "image/png";
const DISPLAY_MODES: [&str; 4] = ["fullscreen", "standalone", "minimal-ui", "browser"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebManifest {
    pub name: String,
    pub short_name: String,
    pub start_url: String,
    pub display: String,
    pub background_color: String,
    pub theme_color: String,
    pub icons: Vec<ManifestIcon>,
}

impl WebManifest {
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(json).map_err(|e| ManifestError::Parse(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(self).map_err(|e| ManifestError::Parse(e.to_string()))
    }

    /// The manifest shipped in `public/manifest.json`.
    pub fn bundled() -> Result<Self, ManifestError> {
        Self::from_json(include_str!("../public/manifest.json"))
    }

    /// Check installability against the paths the build is known to emit.
    pub fn validate(&self, built_paths: &[&str]) -> Result<(), ManifestError> {
        if self.name.trim().is_empty() {
            return Err(ManifestError::EmptyField("name"));
        }
        if self.short_name.trim().is_empty() {
            return Err(ManifestError::EmptyField("short_name"));
        }
        if !DISPLAY_MODES.contains(&self.display.as_str()) {
            return Err(ManifestError::DisplayMode(self.display.clone()));
        }
        for (field, value) in [
            ("background_color", &self.background_color),
            ("theme_color", &self.theme_color),
        ] {
            if !HEX_COLOR_REGEX.is_match(value) {
                return Err(ManifestError::Color {
                    field,
                    value: value.clone(),
                });
            }
        }

        let mut sizes: Vec<String> = self.icons.iter().map(|i| i.sizes.clone()).collect();
        sizes.sort();
        let expected: Vec<String> = REQUIRED_ICON_SIZES.iter().map(|s| s.to_string()).collect();
        if sizes != expected {
            return Err(ManifestError::IconSizes {
                expected,
                found: sizes,
            });
        }
        for icon in &self.icons {
            if icon.src.trim().is_empty() {
                return Err(ManifestError::EmptyField("icons.src"));
            }
            if icon.mime_type != ICON_MIME_TYPE {
                return Err(ManifestError::IconType {
                    src: icon.src.clone(),
                    found: icon.mime_type.clone(),
                });
            }
        }

        if !built_paths.contains(&self.start_url.as_str()) {
            return Err(ManifestError::UnreachableStartUrl(self.start_url.clone()));
        }
        Ok(())
    }

    /// Validate against the precached shell, which is always part of the build.
    pub fn validate_bundled_paths(&self) -> Result<(), ManifestError> {
        self.validate(PRECACHE_ASSETS)
    }

    pub fn uses_brand_color(&self) -> bool {
        self.theme_color.eq_ignore_ascii_case(BRAND_COLOR)
    }
}
