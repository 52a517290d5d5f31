//! Site configuration module.
//!
//! Handles loading, validating, and merging `folio.toml`. Stock defaults are
//! the base layer; the user file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "Portfolio"
//! tagline = "Full Stack Developer"
//! intro = ""
//! default_profile_image = "profile.jpg"      # Shown when no picture was uploaded
//! default_contact_link = "https://t.me/yourusername"
//!
//! [storage]
//! records = "folio-data.json"   # Projects, settings and user roles
//! media_dir = "media"           # Uploaded files, one subdirectory per bucket
//! public_base_url = "/media"    # URL prefix uploaded files are served under
//! project_bucket = "project-images"
//! profile_bucket = "profile-images"
//!
//! [output]
//! dir = "dist"                  # Where `folio render` writes HTML
//!
//! [colors]
//! background = "#0b0d12"
//! text = "#f2f4f8"
//! text_muted = "#9aa3b2"
//! accent = "#f97316"
//! card = "#141821"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::catalog::Buckets;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "folio.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Everything `folio.toml` can set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FolioConfig {
    /// Public page text and fallbacks.
    pub site: SiteConfig,
    /// Record store file and uploaded media location.
    pub storage: StorageConfig,
    /// Render output.
    pub output: OutputConfig,
    /// Page color scheme.
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub title: String,
    pub tagline: String,
    pub intro: String,
    /// Profile picture used until one is uploaded.
    pub default_profile_image: String,
    /// Contact target used until one is set.
    pub default_contact_link: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            tagline: "Full Stack Developer".to_string(),
            intro: String::new(),
            default_profile_image: "profile.jpg".to_string(),
            default_contact_link: "https://t.me/yourusername".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub records: PathBuf,
    pub media_dir: PathBuf,
    pub public_base_url: String,
    pub project_bucket: String,
    pub profile_bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let buckets = Buckets::default();
        Self {
            records: PathBuf::from("folio-data.json"),
            media_dir: PathBuf::from("media"),
            public_base_url: "/media".to_string(),
            project_bucket: buckets.projects,
            profile_bucket: buckets.profile,
        }
    }
}

impl StorageConfig {
    pub fn buckets(&self) -> Buckets {
        Buckets {
            projects: self.project_bucket.clone(),
            profile: self.profile_bucket.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("dist"),
        }
    }
}

/// CSS colors injected as custom properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub background: String,
    pub text: String,
    pub text_muted: String,
    pub accent: String,
    pub card: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            background: "#0b0d12".to_string(),
            text: "#f2f4f8".to_string(),
            text_muted: "#9aa3b2".to_string(),
            accent: "#f97316".to_string(),
            card: "#141821".to_string(),
        }
    }
}

impl FolioConfig {
    /// Validate values that deserialize fine but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, bucket) in [
            ("storage.project_bucket", &self.storage.project_bucket),
            ("storage.profile_bucket", &self.storage.profile_bucket),
        ] {
            if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket == "." || bucket == ".." {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a plain directory name"
                )));
            }
        }
        if self.storage.project_bucket == self.storage.profile_bucket {
            return Err(ConfigError::Validation(
                "storage.project_bucket and storage.profile_bucket must differ".into(),
            ));
        }
        if self.storage.records.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "storage.records must not be empty".into(),
            ));
        }
        if self.site.default_contact_link.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.default_contact_link must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Resolve relative storage and output paths against `base`.
    pub fn rooted_at(mut self, base: &Path) -> Self {
        for path in [
            &mut self.storage.records,
            &mut self.storage.media_dir,
            &mut self.output.dir,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(FolioConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` if it does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<FolioConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: FolioConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `folio.toml` from `path`, falling back to stock defaults when the
/// file is absent. Relative paths inside are resolved against the file's
/// directory.
pub fn load_config(path: &Path) -> Result<FolioConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    if overlay.is_some() {
        tracing::debug!(path = %path.display(), "loaded config file");
    }
    let config = resolve_config(stock_defaults_value(), overlay)?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(config.rooted_at(base))
}

/// Returns a fully-commented stock `folio.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.
# Relative paths are resolved against the directory holding this file.

# ---------------------------------------------------------------------------
# Public landing page
# ---------------------------------------------------------------------------
[site]
title = "Portfolio"
tagline = "Full Stack Developer"
# Short paragraph under the title. Empty hides it.
intro = ""
# Shown until a profile picture is uploaded.
default_profile_image = "profile.jpg"
# Target of the contact buttons until one is set with `folio settings contact`.
default_contact_link = "https://t.me/yourusername"

# ---------------------------------------------------------------------------
# Storage
# ---------------------------------------------------------------------------
[storage]
# JSON file holding projects, the settings row and user roles.
records = "folio-data.json"
# Uploaded files land in <media_dir>/<bucket>/.
media_dir = "media"
# URL prefix under which media_dir is served.
public_base_url = "/media"
project_bucket = "project-images"
profile_bucket = "profile-images"

# ---------------------------------------------------------------------------
# Render output
# ---------------------------------------------------------------------------
[output]
dir = "dist"

# ---------------------------------------------------------------------------
# Colors
# ---------------------------------------------------------------------------
[colors]
background = "#0b0d12"
text = "#f2f4f8"
text_muted = "#9aa3b2"    # Descriptions, footer
accent = "#f97316"        # Buttons, tech tags
card = "#141821"
"##
}

/// Generate CSS custom properties from the color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {bg};
    --color-text: {text};
    --color-text-muted: {muted};
    --color-accent: {accent};
    --color-card: {card};
}}"#,
        bg = colors.background,
        text = colors.text,
        muted = colors.text_muted,
        accent = colors.accent,
        card = colors.card,
    )
}
