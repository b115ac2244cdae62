//! User settings stored as settings.json in the app data directory

use crate::constants::{API_URL_ENV, DEFAULT_API_BASE_URL, DEFAULT_LOTTERY};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Window geometry
    pub window_x: Option<f32>,
    pub window_y: Option<f32>,
    pub window_w: Option<f32>,
    pub window_h: Option<f32>,

    // Backend
    pub api_base_url: String,
    pub default_lottery: String,

    // Navigation
    pub last_view: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_x: None,
            window_y: None,
            window_w: None,
            window_h: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            default_lottery: DEFAULT_LOTTERY.to_string(),
            last_view: "home".to_string(),
        }
    }
}

impl Settings {
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("settings.json");
        match std::fs::read_to_string(&path) {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(settings) => {
                    debug!(path = %path.display(), "Settings loaded");
                    settings
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse settings, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No settings file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) {
        let path = data_dir.join("settings.json");
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!(error = %e, "Failed to save settings");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize settings"),
        }
    }

    /// Base URL for this session: `LOTTERY_API_URL` wins over the saved value
    pub fn effective_api_url(&self) -> String {
        Self::resolve_api_url(std::env::var(API_URL_ENV).ok(), &self.api_base_url)
    }

    fn resolve_api_url(env: Option<String>, saved: &str) -> String {
        match env.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            Some(url) => {
                info!(url = %url, "Using API base URL from environment");
                url
            }
            None if saved.trim().is_empty() => DEFAULT_API_BASE_URL.to_string(),
            None => saved.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Temp directory removed when the test ends
    struct ScratchDir(PathBuf);

    impl std::ops::Deref for ScratchDir {
        type Target = Path;

        fn deref(&self) -> &Path {
            &self.0
        }
    }

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn scratch_dir(name: &str) -> ScratchDir {
        let dir = std::env::temp_dir().join(format!(
            "lottery-ml-analyzer-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        ScratchDir(dir)
    }

    #[test]
    fn scratch_dir_is_removed() {
        let path = {
            let dir = scratch_dir("cleanup");
            std::fs::write(dir.join("settings.json"), "{}").unwrap();
            dir.0.clone()
        };
        assert!(!path.exists());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = scratch_dir("missing");
        let _ = std::fs::remove_file(dir.join("settings.json"));
        assert_eq!(Settings::load(&dir), Settings::default());
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = scratch_dir("malformed");
        std::fs::write(dir.join("settings.json"), "{ nope").unwrap();
        assert_eq!(Settings::load(&dir), Settings::default());
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = scratch_dir("roundtrip");
        let settings = Settings {
            api_base_url: "http://10.0.0.5:9000".to_string(),
            last_view: "explain".to_string(),
            window_w: Some(1280.0),
            ..Settings::default()
        };
        settings.save(&dir);
        assert_eq!(Settings::load(&dir), settings);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = scratch_dir("partial");
        std::fs::write(dir.join("settings.json"), r#"{"last_view": "predict"}"#).unwrap();
        let loaded = Settings::load(&dir);
        assert_eq!(loaded.last_view, "predict");
        assert_eq!(loaded.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn env_url_overrides_saved() {
        assert_eq!(
            Settings::resolve_api_url(Some(" http://api:8000 ".to_string()), "http://saved"),
            "http://api:8000"
        );
        assert_eq!(Settings::resolve_api_url(Some(String::new()), "http://saved"), "http://saved");
        assert_eq!(Settings::resolve_api_url(None, "  "), DEFAULT_API_BASE_URL);
    }
}
