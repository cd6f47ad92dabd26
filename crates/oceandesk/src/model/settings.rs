//! Persisted UI settings.

use std::path::PathBuf;

use anyhow::Context;

use crate::style::widgets::palette::ThemeMode;

/// Application settings that persist across sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AppSettings {
    /// Light or dark palette.
    #[serde(with = "theme_mode_serde", default)]
    pub theme_mode: ThemeMode,
}

/// Settings held by the running app.
///
/// The file is read in the background at startup; a change the user makes
/// before that read lands is kept over the stored value.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveSettings {
    current: AppSettings,
    changed: bool,
}

impl LiveSettings {
    /// Settings in effect.
    pub const fn current(&self) -> AppSettings {
        self.current
    }

    /// Flips the theme and returns the settings to persist.
    pub fn toggle_theme(&mut self) -> AppSettings {
        self.current.theme_mode = self.current.theme_mode.toggled();
        self.changed = true;
        self.current
    }

    /// Takes the stored settings unless the user already changed them.
    ///
    /// Returns whether they were applied.
    pub fn apply_loaded(&mut self, loaded: AppSettings) -> bool {
        if self.changed {
            return false;
        }
        self.current = loaded;
        true
    }
}

/// Location of `settings.json` in the platform config directory.
pub fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("oceandesk")
        .join("settings.json")
}

/// Reads settings, falling back to defaults when the file does not exist.
pub async fn load(path: PathBuf) -> anyhow::Result<AppSettings> {
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Ok(AppSettings::default());
    }

    let contents = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;

    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

/// Writes settings, creating the config directory when needed.
pub async fn save(path: PathBuf, settings: AppSettings) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating {}", dir.display()))?;
    }

    let contents = serde_json::to_string_pretty(&settings)?;
    tokio::fs::write(&path, contents)
        .await
        .with_context(|| format!("writing {}", path.display()))
}

mod theme_mode_serde {
    use super::ThemeMode;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)] // serde `with` signature
    pub fn serialize<S>(mode: &ThemeMode, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(match mode {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        })
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<ThemeMode, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(if s == "light" {
            ThemeMode::Light
        } else {
            ThemeMode::Dark
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("oceandesk-settings-{}-{name}", std::process::id()))
            .join("settings.json")
    }

    #[test]
    fn theme_mode_is_a_lowercase_string() {
        let json = serde_json::to_string(&AppSettings {
            theme_mode: ThemeMode::Light,
        })
        .unwrap();
        assert_eq!(json, r#"{"theme_mode":"light"}"#);

        let parsed: AppSettings = serde_json::from_str(r#"{"theme_mode":"neon"}"#).unwrap();
        assert_eq!(parsed.theme_mode, ThemeMode::Dark);

        let parsed: AppSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, AppSettings::default());
    }

    #[test]
    fn toggle_before_load_wins() {
        let stored = AppSettings {
            theme_mode: ThemeMode::Light,
        };

        let mut live = LiveSettings::default();
        let saved = live.toggle_theme();
        assert!(!live.apply_loaded(stored));
        assert_eq!(live.current(), saved);
        assert_ne!(live.current().theme_mode, ThemeMode::default());

        let mut fresh = LiveSettings::default();
        assert!(fresh.apply_loaded(stored));
        assert_eq!(fresh.current(), stored);
    }

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let settings = load(scratch("missing")).await.unwrap();
        assert_eq!(settings, AppSettings::default());
    }

    #[tokio::test]
    async fn save_then_load() {
        let path = scratch("roundtrip");
        let settings = AppSettings {
            theme_mode: ThemeMode::Light,
        };

        save(path.clone(), settings).await.unwrap();
        assert_eq!(load(path.clone()).await.unwrap(), settings);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}
