//! Local profile and preference store.
//!
//! Holds the signup profile the recommendation filter reads, plus the UI
//! preferences (theme, language) that used to live in ambient browser
//! storage. One JSON file, written only by the `profile set` command.

use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::internships::UserProfile;

/// Color theme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
  #[default]
  Light,
  Dark,
}

impl std::fmt::Display for Theme {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let label = match self {
      Theme::Light => "light",
      Theme::Dark => "dark",
    };
    write!(f, "{}", label)
  }
}

/// UI preferences persisted alongside the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
  #[serde(default)]
  pub theme: Theme,
  /// BCP 47-ish language code, e.g. "en" or "hi"
  #[serde(default = "default_language")]
  pub language: String,
}

fn default_language() -> String {
  "en".to_string()
}

impl Default for Preferences {
  fn default() -> Self {
    Self {
      theme: Theme::default(),
      language: default_language(),
    }
  }
}

/// Everything the store persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProfile {
  #[serde(default)]
  pub profile: UserProfile,
  #[serde(default)]
  pub preferences: Preferences,
}

/// File-backed profile store.
pub struct ProfileStore {
  path: PathBuf,
}

impl ProfileStore {
  /// Open the store at the default location.
  pub fn open() -> Result<Self> {
    Ok(Self {
      path: Self::default_path()?,
    })
  }

  /// Open the store at an explicit path.
  pub fn at(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// Get the default profile path.
  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("internconnect").join("profile.json"))
  }

  /// Load the saved profile, or `None` if nothing was saved yet.
  pub fn load(&self) -> Result<Option<StoredProfile>> {
    if !self.path.exists() {
      return Ok(None);
    }

    let contents = std::fs::read_to_string(&self.path)
      .map_err(|e| eyre!("Failed to read profile {}: {}", self.path.display(), e))?;

    let stored: StoredProfile = serde_json::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse profile {}: {}", self.path.display(), e))?;

    Ok(Some(stored))
  }

  /// Persist the profile, creating the parent directory if needed.
  pub fn save(&self, stored: &StoredProfile) -> Result<()> {
    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create profile directory: {}", e))?;
    }

    let contents = serde_json::to_string_pretty(stored)
      .map_err(|e| eyre!("Failed to serialize profile: {}", e))?;

    std::fs::write(&self.path, contents)
      .map_err(|e| eyre!("Failed to write profile {}: {}", self.path.display(), e))?;

    Ok(())
  }
}
